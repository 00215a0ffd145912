//! Flat top-N screening, independent of the hierarchy.

use crate::domain::config::{ScreenConfig, ViewConfig, MAX_TOP_N};
use crate::domain::instrument::{Instrument, RatioField};
use crate::domain::node::HierarchyNode;
use std::cmp::Ordering;

/// Rank given to non-positive P/L so loss-makers sort after every real multiple.
pub const PL_SENTINEL: f64 = 999.0;

fn pl_rank(p_l: f64) -> f64 {
    if p_l <= 0.0 { PL_SENTINEL } else { p_l }
}

/// Ordering of two instruments under `priority`: ascending P/L, descending otherwise.
pub fn compare_by_priority(a: &Instrument, b: &Instrument, priority: RatioField) -> Ordering {
    match priority {
        RatioField::PL => pl_rank(a.p_l).total_cmp(&pl_rank(b.p_l)),
        field => field.of(b).total_cmp(&field.of(a)),
    }
}

pub fn passes_ranges(inst: &Instrument, config: &ScreenConfig) -> bool {
    config.ranges.iter().all(|r| r.matches(inst))
}

fn screened_leaf(inst: &Instrument) -> HierarchyNode {
    let weight = if inst.market_cap > 0.0 { inst.market_cap } else { 1.0 };
    HierarchyNode::leaf_with_value(inst, weight.sqrt())
}

/// Filter by sector allow-list and every range, sort by priority, keep the top N
/// (never more than [`MAX_TOP_N`]).
pub fn screen(instruments: &[Instrument], config: &ViewConfig) -> Vec<HierarchyNode> {
    let screen = &config.screen;
    let mut matches: Vec<&Instrument> = instruments
        .iter()
        .filter(|i| config.allows_sector(&i.sector))
        .filter(|i| passes_ranges(i, screen))
        .collect();

    matches.sort_by(|a, b| compare_by_priority(a, b, screen.priority));
    matches.truncate(screen.top_n.min(MAX_TOP_N));

    tracing::info!(
        matched = matches.len(),
        priority = %screen.priority,
        "screened instruments"
    );
    matches.into_iter().map(screened_leaf).collect()
}
