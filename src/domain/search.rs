//! Lookup helpers feeding the sector filter and the ticker search.

use crate::domain::instrument::Instrument;
use crate::domain::taxonomy::canonical_name;
use std::collections::BTreeSet;

pub const MIN_QUERY_LEN: usize = 2;
pub const MAX_SUGGESTIONS: usize = 8;

/// Sorted, distinct, non-empty sectors present in the catalogue.
pub fn available_sectors(instruments: &[Instrument]) -> Vec<String> {
    instruments
        .iter()
        .filter(|i| !i.sector.is_empty())
        .map(|i| i.sector.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Sectors whose raw or canonical name contains `term`, case-insensitively.
pub fn filter_sectors(sectors: &[String], term: &str) -> Vec<String> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return sectors.to_vec();
    }
    sectors
        .iter()
        .filter(|s| {
            s.to_lowercase().contains(&needle) || canonical_name(s).to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

/// Up to [`MAX_SUGGESTIONS`] tickers containing `query`; nothing for short queries.
pub fn suggest_tickers(instruments: &[Instrument], query: &str) -> Vec<String> {
    let needle = query.trim().to_lowercase();
    if needle.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }
    instruments
        .iter()
        .filter(|i| i.ticker.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .map(|i| i.ticker.clone())
        .collect()
}
