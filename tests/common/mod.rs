#![allow(dead_code)]

use sectormap::domain::error::SectormapError;
use sectormap::domain::instrument::{Instrument, RawInstrument};
use sectormap::domain::node::HierarchyNode;
use sectormap::ports::catalogue_port::{Catalogue, CataloguePort};

pub const LIQUID: f64 = 5_000_000.0;

pub struct MockCataloguePort {
    pub records: Vec<RawInstrument>,
    pub error: Option<String>,
}

impl MockCataloguePort {
    pub fn new(records: Vec<RawInstrument>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            records: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl CataloguePort for MockCataloguePort {
    fn fetch_catalogue(&self) -> Result<Catalogue, SectormapError> {
        if let Some(reason) = &self.error {
            return Err(SectormapError::Catalogue {
                reason: reason.clone(),
            });
        }
        Ok(Catalogue {
            generated_at: None,
            records: self.records.clone(),
        })
    }
}

/// A liquid raw record with neutral ratios.
pub fn raw(ticker: &str, sector: &str, subsector: &str, market_cap: f64) -> RawInstrument {
    RawInstrument {
        ticker: ticker.to_string(),
        sector: Some(sector.to_string()),
        subsector: Some(subsector.to_string()),
        market_cap: Some(market_cap),
        liq_2m: Some(LIQUID),
        p_l: Some(10.0),
        p_vp: Some(1.5),
        net_margin: Some(0.15),
        roe: Some(0.12),
        roic: Some(0.10),
        dy: Some(0.05),
    }
}

pub fn raw_with_ratios(
    ticker: &str,
    sector: &str,
    subsector: &str,
    market_cap: f64,
    p_l: f64,
    net_margin: f64,
    roe: f64,
) -> RawInstrument {
    RawInstrument {
        p_l: Some(p_l),
        net_margin: Some(net_margin),
        roe: Some(roe),
        ..raw(ticker, sector, subsector, market_cap)
    }
}

pub fn instrument(ticker: &str, sector: &str, subsector: &str, market_cap: f64) -> Instrument {
    Instrument {
        ticker: ticker.to_string(),
        sector: sector.to_string(),
        subsector: subsector.to_string(),
        market_cap,
        liquidity: LIQUID,
        p_l: 10.0,
        net_margin: 0.15,
        roe: 0.12,
        roic: 0.10,
        dy: 0.05,
    }
}

/// `count` instruments in one subsector with distinct, descending market caps.
/// Use a two-letter `prefix` so each ticker keeps its own company key.
pub fn many(prefix: &str, sector: &str, subsector: &str, count: usize) -> Vec<RawInstrument> {
    (0..count)
        .map(|i| {
            raw(
                &format!("{}{:02}3", prefix, i),
                sector,
                subsector,
                1_000_000_000.0 * (count - i) as f64,
            )
        })
        .collect()
}

pub fn find<'a>(nodes: &'a [HierarchyNode], name: &str) -> Option<&'a HierarchyNode> {
    nodes.iter().find(|n| n.name == name)
}

/// Visits every node of a forest, pre-order.
pub fn walk<'a>(nodes: &'a [HierarchyNode], visit: &mut dyn FnMut(&'a HierarchyNode)) {
    for node in nodes {
        visit(node);
        walk(node.children(), visit);
    }
}
