//! JSON output for the rendering and ranked-list collaborators.

use crate::domain::error::SectormapError;
use crate::domain::navigation::ViewState;
use crate::domain::node::HierarchyNode;
use crate::domain::taxonomy::TAXONOMY_VERSION;
use crate::ports::output_port::{OutputPort, Snapshot};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Serialize)]
struct Document<'a> {
    taxonomy_version: u32,
    view: &'a ViewState,
    breadcrumbs: &'a [String],
    data: Vec<Value>,
}

/// Node JSON with `display_margin` added at every depth.
fn node_value(node: &HierarchyNode) -> Result<Value, serde_json::Error> {
    let mut value = serde_json::to_value(node)?;
    annotate(node, &mut value);
    Ok(value)
}

fn annotate(node: &HierarchyNode, value: &mut Value) {
    let Value::Object(map) = value else { return };
    map.insert("display_margin".into(), node.display_margin().into());
    if let Some(Value::Array(kids)) = map.get_mut("children") {
        for (child, kid) in node.children().iter().zip(kids.iter_mut()) {
            annotate(child, kid);
        }
    }
}

fn json_error(e: serde_json::Error) -> SectormapError {
    SectormapError::Output {
        reason: format!("JSON serialization failed: {}", e),
    }
}

/// Writes pretty-printed JSON to a file, or to stdout when no path is set.
pub struct JsonOutputAdapter {
    path: Option<PathBuf>,
}

impl JsonOutputAdapter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn render(snapshot: &Snapshot<'_>) -> Result<String, SectormapError> {
        let data = snapshot
            .nodes
            .iter()
            .map(node_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(json_error)?;
        let doc = Document {
            taxonomy_version: TAXONOMY_VERSION,
            view: snapshot.view,
            breadcrumbs: &snapshot.breadcrumbs,
            data,
        };
        serde_json::to_string_pretty(&doc).map_err(json_error)
    }
}

impl OutputPort for JsonOutputAdapter {
    fn write(&self, snapshot: &Snapshot<'_>) -> Result<(), SectormapError> {
        let body = Self::render(snapshot)?;
        match &self.path {
            Some(path) => fs::write(path, body).map_err(|e| SectormapError::Output {
                reason: format!("failed to write {}: {}", path.display(), e),
            }),
            None => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", body)?;
                Ok(())
            }
        }
    }
}
