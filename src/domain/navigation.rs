//! Drill-down navigation over a built hierarchy.
//!
//! The state machine never owns the tree: every transition reads the current
//! market-level sector list and returns a new [`ViewState`]. Events that name
//! a node absent from the tree leave the state unchanged.

use crate::domain::node::HierarchyNode;
use serde::{Deserialize, Serialize};

pub const ROOT_LABEL: &str = "B3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Market,
    Sector,
    Subsector,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub level: Level,
    pub parent: Option<String>,
    pub sub_parent: Option<String>,
}

impl ViewState {
    pub fn market() -> Self {
        Self::default()
    }

    pub fn sector(parent: impl Into<String>) -> Self {
        Self {
            level: Level::Sector,
            parent: Some(parent.into()),
            sub_parent: None,
        }
    }

    pub fn subsector(parent: impl Into<String>, sub_parent: impl Into<String>) -> Self {
        Self {
            level: Level::Subsector,
            parent: Some(parent.into()),
            sub_parent: Some(sub_parent.into()),
        }
    }
}

/// Breadcrumb targets. Jumps are direct, not stepwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breadcrumb {
    Market,
    Sector,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// A node was selected by name among the currently visible siblings.
    Select(String),
    Breadcrumb(Breadcrumb),
    /// Ticker search: jump to whichever level contains the ticker.
    SelectTicker(String),
}

fn find<'a>(nodes: &'a [HierarchyNode], name: &str) -> Option<&'a HierarchyNode> {
    nodes.iter().find(|n| n.name == name)
}

fn sector_of<'a>(tree: &'a [HierarchyNode], state: &ViewState) -> Option<&'a HierarchyNode> {
    state.parent.as_deref().and_then(|p| find(tree, p))
}

/// Apply one navigation event.
pub fn apply(tree: &[HierarchyNode], state: &ViewState, event: &NavEvent) -> ViewState {
    match event {
        NavEvent::Select(name) => select(tree, state, name),
        NavEvent::Breadcrumb(Breadcrumb::Market) => ViewState::market(),
        NavEvent::Breadcrumb(Breadcrumb::Sector) => match (&state.level, &state.parent) {
            (Level::Market, _) | (_, None) => state.clone(),
            (_, Some(parent)) => ViewState::sector(parent.clone()),
        },
        NavEvent::SelectTicker(ticker) => select_ticker(tree, ticker).unwrap_or_else(|| state.clone()),
    }
}

fn select(tree: &[HierarchyNode], state: &ViewState, name: &str) -> ViewState {
    match state.level {
        Level::Market => match find(tree, name) {
            Some(sector) if sector.has_children() => ViewState::sector(name),
            _ => state.clone(),
        },
        Level::Sector => {
            let sub = sector_of(tree, state).and_then(|s| s.find_child(name));
            match (sub, &state.parent) {
                (Some(sub), Some(parent)) if sub.has_children() => {
                    ViewState::subsector(parent.clone(), name)
                }
                _ => state.clone(),
            }
        }
        Level::Subsector => state.clone(),
    }
}

/// Reverse lookup: the state whose visible siblings include `ticker`.
///
/// A ticker sitting directly under a sector (a promoted sector, or a
/// consolidated bucket's leaves) resolves to that sector; one inside a
/// subsector resolves to the subsector.
pub fn select_ticker(tree: &[HierarchyNode], ticker: &str) -> Option<ViewState> {
    for sector in tree {
        for child in sector.children() {
            if !child.contains_ticker(ticker) {
                continue;
            }
            // Buckets nested below this child (capped companies, a capped
            // sector under the catch-all) are reached through the child.
            return Some(if child.is_ticker {
                ViewState::sector(sector.name.clone())
            } else {
                ViewState::subsector(sector.name.clone(), child.name.clone())
            });
        }
    }
    None
}

/// Self-correct `state` against a freshly built tree, falling back one level
/// at a time until the anchor exists.
pub fn resolve(tree: &[HierarchyNode], state: &ViewState) -> ViewState {
    if state.level == Level::Market {
        return ViewState::market();
    }
    let Some(sector) = sector_of(tree, state) else {
        tracing::debug!(parent = ?state.parent, "view anchor vanished, back to market");
        return ViewState::market();
    };
    if state.level == Level::Subsector {
        let sub_exists = state
            .sub_parent
            .as_deref()
            .and_then(|name| sector.find_child(name))
            .is_some();
        if !sub_exists {
            tracing::debug!(sub_parent = ?state.sub_parent, "subsector vanished, back to sector");
            return ViewState::sector(sector.name.clone());
        }
    }
    state.clone()
}

/// Siblings at the current level, children stripped, for the renderer.
pub fn visible_nodes(tree: &[HierarchyNode], state: &ViewState) -> Vec<HierarchyNode> {
    let list: &[HierarchyNode] = match state.level {
        Level::Market => tree,
        Level::Sector => sector_of(tree, state).map(HierarchyNode::children).unwrap_or(&[]),
        Level::Subsector => sector_of(tree, state)
            .and_then(|s| state.sub_parent.as_deref().and_then(|n| s.find_child(n)))
            .map(HierarchyNode::children)
            .unwrap_or(&[]),
    };
    list.iter().map(HierarchyNode::flattened).collect()
}

/// Breadcrumb labels from the root down to the current level.
pub fn breadcrumbs(state: &ViewState) -> Vec<String> {
    let mut trail = vec![ROOT_LABEL.to_string()];
    if state.level != Level::Market {
        trail.extend(state.parent.clone());
    }
    if state.level == Level::Subsector {
        trail.extend(state.sub_parent.clone());
    }
    trail
}
