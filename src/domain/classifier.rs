//! Financial/holding classifier.

use crate::domain::taxonomy::FINANCIAL_MARKERS;

/// True when `text` contains any financial or holding marker (case-insensitive).
pub fn is_holding(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    FINANCIAL_MARKERS.iter().any(|m| lower.contains(m))
}

/// Leaf classification: the ticker, its subsector or its sector marks it.
pub fn is_holding_instrument(ticker: &str, subsector: &str, sector: &str) -> bool {
    is_holding(ticker) || is_holding(subsector) || is_holding(sector)
}
