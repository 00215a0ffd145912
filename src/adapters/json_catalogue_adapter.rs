//! JSON catalogue adapter.
//!
//! Accepts the exporter envelope `{"generated_at", "schema_version", "data": [...]}`
//! or a bare array of records.

use crate::domain::error::SectormapError;
use crate::domain::instrument::RawInstrument;
use crate::ports::catalogue_port::{Catalogue, CataloguePort};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Envelope {
        #[serde(default)]
        generated_at: Option<String>,
        data: Vec<RawInstrument>,
    },
    Bare(Vec<RawInstrument>),
}

pub struct JsonCatalogueAdapter {
    path: PathBuf,
}

impl JsonCatalogueAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn parse(content: &str) -> Result<Catalogue, SectormapError> {
        let payload: Payload = serde_json::from_str(content).map_err(|e| SectormapError::Catalogue {
            reason: format!("JSON parse error: {}", e),
        })?;
        Ok(match payload {
            Payload::Envelope { generated_at, data } => Catalogue {
                generated_at: generated_at.as_deref().and_then(parse_timestamp),
                records: data,
            },
            Payload::Bare(records) => Catalogue {
                generated_at: None,
                records,
            },
        })
    }
}

/// RFC 3339 timestamps; unparseable values are dropped with a warning.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(generated_at = raw, error = %e, "ignoring catalogue timestamp");
            None
        }
    }
}

impl CataloguePort for JsonCatalogueAdapter {
    fn fetch_catalogue(&self) -> Result<Catalogue, SectormapError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SectormapError::Catalogue {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let catalogue = Self::parse(&content)?;
        tracing::debug!(path = %self.path.display(), records = catalogue.records.len(), "loaded JSON catalogue");
        Ok(catalogue)
    }
}
