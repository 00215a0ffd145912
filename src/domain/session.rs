//! Pipeline entry points and the recompute-then-heal session.

use crate::domain::config::{Mode, NormalizeConfig, ViewConfig};
use crate::domain::hierarchy::build_hierarchy;
use crate::domain::instrument::{Instrument, RawInstrument};
use crate::domain::navigation::{self, NavEvent, ViewState};
use crate::domain::node::HierarchyNode;
use crate::domain::normalizer::normalize;
use crate::domain::screening::screen;

/// Hierarchy or ranked list for normalized instruments, selected by `config.mode`.
pub fn compute(instruments: &[Instrument], config: &ViewConfig) -> Vec<HierarchyNode> {
    match config.mode {
        Mode::Hierarchy => build_hierarchy(instruments, config),
        Mode::Screening => screen(instruments, config),
    }
}

/// Full pipeline from raw records.
pub fn run_pipeline(
    raw: &[RawInstrument],
    normalize_config: &NormalizeConfig,
    config: &ViewConfig,
) -> Vec<HierarchyNode> {
    compute(&normalize(raw, normalize_config), config)
}

/// Owns the normalized catalogue, the current configuration, the computed
/// nodes and the view state. Every recomputation re-anchors the view before
/// the nodes become reachable through the accessors.
#[derive(Debug, Clone)]
pub struct Session {
    instruments: Vec<Instrument>,
    config: ViewConfig,
    nodes: Vec<HierarchyNode>,
    view: ViewState,
}

impl Session {
    pub fn new(raw: &[RawInstrument], normalize_config: &NormalizeConfig, config: ViewConfig) -> Self {
        Self::from_instruments(normalize(raw, normalize_config), config)
    }

    pub fn from_instruments(instruments: Vec<Instrument>, config: ViewConfig) -> Self {
        let nodes = compute(&instruments, &config);
        Self {
            instruments,
            config,
            nodes,
            view: ViewState::market(),
        }
    }

    /// Swap the configuration. Returns `false` when it was unchanged and the
    /// previous result was kept.
    pub fn set_config(&mut self, config: ViewConfig) -> bool {
        if config == self.config {
            return false;
        }
        self.config = config;
        self.nodes = compute(&self.instruments, &self.config);
        self.view = navigation::resolve(&self.nodes, &self.view);
        true
    }

    /// Apply a navigation event, then re-anchor.
    pub fn navigate(&mut self, event: &NavEvent) -> &ViewState {
        let next = navigation::apply(&self.nodes, &self.view, event);
        self.view = navigation::resolve(&self.nodes, &next);
        &self.view
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[HierarchyNode] {
        &self.nodes
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Sibling list at the current view level.
    pub fn visible(&self) -> Vec<HierarchyNode> {
        navigation::visible_nodes(&self.nodes, &self.view)
    }
}
