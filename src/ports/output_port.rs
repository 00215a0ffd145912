//! Output port trait for the rendering and ranked-list collaborators.

use crate::domain::error::SectormapError;
use crate::domain::navigation::ViewState;
use crate::domain::node::HierarchyNode;

/// What gets handed to a collaborator after one pipeline run.
#[derive(Debug, Clone)]
pub struct Snapshot<'a> {
    pub view: &'a ViewState,
    pub breadcrumbs: Vec<String>,
    pub nodes: &'a [HierarchyNode],
}

pub trait OutputPort {
    fn write(&self, snapshot: &Snapshot<'_>) -> Result<(), SectormapError>;
}
