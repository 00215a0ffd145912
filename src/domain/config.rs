//! Pipeline configuration values.
//!
//! These are plain values passed into the pure pipeline functions. Loading them
//! from an INI file lives in [`crate::cli`]; validation in
//! [`crate::domain::config_validation`].

use crate::domain::instrument::{Instrument, RatioField};
use crate::domain::taxonomy::PREFERRED_TICKERS;

pub const DEFAULT_LIQUIDITY_MIN: f64 = 1_000_000.0;
pub const DEFAULT_COMPANY_KEY_LEN: usize = 4;
pub const DEFAULT_MIN_ITEMS: usize = 3;
pub const DEFAULT_MAX_BOXES: usize = 15;
pub const DEFAULT_TOP_N: usize = 15;
/// Longest ranked list the screening output may hold.
pub const MAX_TOP_N: usize = 15;

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    pub liquidity_min: f64,
    pub company_key_len: usize,
    pub preferred_tickers: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            liquidity_min: DEFAULT_LIQUIDITY_MIN,
            company_key_len: DEFAULT_COMPANY_KEY_LEN,
            preferred_tickers: PREFERRED_TICKERS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HierarchyConfig {
    pub min_items: usize,
    pub max_boxes: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            min_items: DEFAULT_MIN_ITEMS,
            max_boxes: DEFAULT_MAX_BOXES,
        }
    }
}

/// Inclusive numeric range. Bounds of percent fields are in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    pub field: RatioField,
    pub range: Range,
}

impl RangeFilter {
    pub fn new(field: RatioField, min: f64, max: f64) -> Self {
        Self {
            field,
            range: Range::new(min, max),
        }
    }

    pub fn matches(&self, inst: &Instrument) -> bool {
        let raw = self.field.of(inst);
        let scaled = if self.field.is_percent() { raw * 100.0 } else { raw };
        self.range.contains(scaled)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    pub top_n: usize,
    pub priority: RatioField,
    pub ranges: Vec<RangeFilter>,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            priority: RatioField::NetMargin,
            ranges: vec![
                RangeFilter::new(RatioField::PL, 0.0, 20.0),
                RangeFilter::new(RatioField::NetMargin, 10.0, 100.0),
                RangeFilter::new(RatioField::Roe, 0.0, 100.0),
                RangeFilter::new(RatioField::Roic, 0.0, 100.0),
                RangeFilter::new(RatioField::Dy, 0.0, 100.0),
            ],
        }
    }
}

/// Which output the pipeline produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Hierarchy,
    Screening,
}

/// Everything a recomputation depends on besides the instrument list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewConfig {
    pub mode: Mode,
    /// Sector allow-list on canonical names; empty means every sector.
    pub sectors: Vec<String>,
    pub hierarchy: HierarchyConfig,
    pub screen: ScreenConfig,
}

impl ViewConfig {
    pub fn allows_sector(&self, sector: &str) -> bool {
        self.sectors.is_empty() || self.sectors.iter().any(|s| s == sector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inst(p_l: f64, net_margin: f64) -> Instrument {
        Instrument {
            ticker: "TEST3".into(),
            sector: "S".into(),
            subsector: "SS".into(),
            market_cap: 1.0,
            liquidity: 1.0,
            p_l,
            net_margin,
            roe: 0.0,
            roic: 0.0,
            dy: 0.0,
        }
    }

    #[test]
    fn range_is_inclusive() {
        let r = Range::new(0.0, 20.0);
        assert!(r.contains(0.0));
        assert!(r.contains(20.0));
        assert!(!r.contains(20.01));
    }

    #[test]
    fn percent_fields_are_scaled_before_comparison() {
        let f = RangeFilter::new(RatioField::NetMargin, 10.0, 100.0);
        assert!(f.matches(&inst(5.0, 0.12)));
        assert!(!f.matches(&inst(5.0, 0.05)));
    }

    #[test]
    fn pl_is_compared_raw() {
        let f = RangeFilter::new(RatioField::PL, 0.0, 20.0);
        assert!(f.matches(&inst(12.0, 0.0)));
        assert!(!f.matches(&inst(-3.0, 0.0)));
    }

    #[test]
    fn empty_allow_list_accepts_everything() {
        let mut cfg = ViewConfig::default();
        assert!(cfg.allows_sector("Varejo"));
        cfg.sectors = vec!["Saúde".into()];
        assert!(!cfg.allows_sector("Varejo"));
        assert!(cfg.allows_sector("Saúde"));
    }
}
