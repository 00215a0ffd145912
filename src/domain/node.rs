//! Hierarchy node: the shape handed to the rendering and ranked-list collaborators.

use crate::domain::classifier::is_holding_instrument;
use crate::domain::instrument::Instrument;
use serde::{Deserialize, Serialize};

fn is_false(b: &bool) -> bool {
    !*b
}

/// A leaf (one instrument) or a group of nodes.
///
/// Group statistics are derived by [`crate::domain::aggregate::finalize`]; a group
/// built with [`HierarchyNode::group`] carries zeroed statistics until then.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub name: String,
    pub value: f64,
    pub market_cap: f64,
    pub p_l: f64,
    pub net_margin: f64,
    pub roe: f64,
    pub roic: f64,
    pub dy: f64,
    pub is_holding: bool,
    pub is_ticker: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_consolidated: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_promoted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyNode>>,
}

impl HierarchyNode {
    /// Leaf for one instrument, weighted by the square root of its market cap.
    pub fn leaf(inst: &Instrument) -> Self {
        Self::leaf_with_value(inst, inst.market_cap.sqrt())
    }

    pub(crate) fn leaf_with_value(inst: &Instrument, value: f64) -> Self {
        Self {
            name: inst.ticker.clone(),
            value,
            market_cap: inst.market_cap,
            p_l: inst.p_l,
            net_margin: inst.net_margin,
            roe: inst.roe,
            roic: inst.roic,
            dy: inst.dy,
            is_holding: is_holding_instrument(&inst.ticker, &inst.subsector, &inst.sector),
            is_ticker: true,
            is_consolidated: false,
            is_promoted: false,
            children: None,
        }
    }

    /// Unaggregated group.
    pub fn group(name: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            name: name.into(),
            value: 0.0,
            market_cap: 0.0,
            p_l: 0.0,
            net_margin: 0.0,
            roe: 0.0,
            roic: 0.0,
            dy: 0.0,
            is_holding: false,
            is_ticker: false,
            is_consolidated: false,
            is_promoted: false,
            children: Some(children),
        }
    }

    pub fn consolidated(name: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            is_consolidated: true,
            ..Self::group(name, children)
        }
    }

    pub fn promoted(name: impl Into<String>, children: Vec<HierarchyNode>) -> Self {
        Self {
            is_promoted: true,
            ..Self::group(name, children)
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn children(&self) -> &[HierarchyNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    pub fn find_child(&self, name: &str) -> Option<&HierarchyNode> {
        self.children().iter().find(|c| c.name == name)
    }

    /// Roll-up weight: market cap, or the visual value when market cap is unknown.
    pub fn weight(&self) -> f64 {
        if self.market_cap > 0.0 {
            self.market_cap
        } else {
            self.value
        }
    }

    /// Number of instrument leaves below this node (1 for a leaf).
    pub fn leaf_count(&self) -> usize {
        if self.is_ticker {
            return 1;
        }
        self.children().iter().map(HierarchyNode::leaf_count).sum()
    }

    /// Margin to display: net margin, or ROE for profitable entities reporting none.
    pub fn display_margin(&self) -> f64 {
        if self.net_margin != 0.0 {
            self.net_margin
        } else if self.roe != 0.0 && self.p_l > 0.0 {
            self.roe
        } else {
            0.0
        }
    }

    /// The node without its children, as a sibling entry for the renderer.
    pub fn flattened(&self) -> HierarchyNode {
        HierarchyNode {
            children: None,
            ..self.clone()
        }
    }

    /// Depth-first search for the leaf named `ticker`.
    pub fn contains_ticker(&self, ticker: &str) -> bool {
        if self.is_ticker {
            return self.name == ticker;
        }
        self.children().iter().any(|c| c.contains_ticker(ticker))
    }
}
