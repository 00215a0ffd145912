//! Instrument normalization: liquidity gate, taxonomy canonicalization and
//! one-representative-per-company deduplication.

use crate::domain::config::NormalizeConfig;
use crate::domain::instrument::{Instrument, RawInstrument};
use crate::domain::taxonomy::{
    canonical_name, HOLDINGS_SECTOR, HOLDING_SECTOR_LABELS, HOLDING_SECTOR_MARKERS,
    HOLDING_TICKERS,
};
use std::collections::HashMap;

/// Company key: the leading `len` characters of the ticker, so every share
/// class of an issuer collapses onto one key.
pub fn company_key(ticker: &str, len: usize) -> String {
    ticker.trim().chars().take(len).collect::<String>().to_uppercase()
}

/// True when the record clears the money-volume floor. Missing liquidity fails.
pub fn passes_liquidity(raw: &RawInstrument, floor: f64) -> bool {
    matches!(raw.liq_2m, Some(liq) if liq >= floor)
}

/// Canonical sector for a record, after the holdings reassignment.
pub fn resolve_sector(ticker: &str, raw_sector: &str) -> String {
    let canonical = canonical_name(raw_sector);
    let raw_lower = raw_sector.to_lowercase();
    let canonical_lower = canonical.to_lowercase();

    let forced = HOLDING_TICKERS.contains(&ticker)
        || HOLDING_SECTOR_LABELS.contains(&canonical.as_str())
        || HOLDING_SECTOR_MARKERS
            .iter()
            .any(|m| raw_lower.contains(m) || canonical_lower.contains(m));

    if forced {
        HOLDINGS_SECTOR.to_string()
    } else {
        canonical
    }
}

fn to_instrument(raw: &RawInstrument) -> Instrument {
    let ticker = raw.ticker.trim().to_uppercase();
    let sector = resolve_sector(&ticker, raw.sector.as_deref().unwrap_or_default());
    Instrument {
        sector,
        subsector: canonical_name(raw.subsector.as_deref().unwrap_or_default()),
        market_cap: raw.market_cap.unwrap_or(0.0).max(0.0),
        liquidity: raw.liq_2m.unwrap_or(0.0),
        p_l: raw.p_l.unwrap_or(0.0),
        net_margin: raw.net_margin.unwrap_or(0.0),
        roe: raw.roe.unwrap_or(0.0),
        roic: raw.roic.unwrap_or(0.0),
        dy: raw.dy.unwrap_or(0.0),
        ticker,
    }
}

/// Whether `candidate` should replace `current` as the company representative.
fn outranks(candidate: &Instrument, current: &Instrument, preferred: &[String]) -> bool {
    let rank = |t: &str| preferred.iter().position(|p| p == t);
    match (rank(&candidate.ticker), rank(&current.ticker)) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        (None, Some(_)) => false,
        (None, None) => candidate.market_cap > current.market_cap,
    }
}

/// Normalize a raw catalogue into deduplicated, liquidity-gated instruments.
///
/// Output follows the first-seen order of company keys.
pub fn normalize(raw: &[RawInstrument], config: &NormalizeConfig) -> Vec<Instrument> {
    let mut order: Vec<Instrument> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut excluded = 0usize;

    for record in raw {
        if record.ticker.trim().is_empty() {
            excluded += 1;
            continue;
        }
        if !passes_liquidity(record, config.liquidity_min) {
            tracing::debug!(ticker = %record.ticker, liq_2m = ?record.liq_2m, "below liquidity floor");
            excluded += 1;
            continue;
        }

        let inst = to_instrument(record);
        let key = company_key(&inst.ticker, config.company_key_len);

        match index.get(&key) {
            Some(&i) => {
                if outranks(&inst, &order[i], &config.preferred_tickers) {
                    tracing::debug!(replaced = %order[i].ticker, by = %inst.ticker, "company representative");
                    order[i] = inst;
                }
            }
            None => {
                index.insert(key, order.len());
                order.push(inst);
            }
        }
    }

    tracing::info!(
        input = raw.len(),
        kept = order.len(),
        excluded,
        "normalized catalogue"
    );
    order
}
