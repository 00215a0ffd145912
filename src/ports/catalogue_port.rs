//! Catalogue access port trait.

use crate::domain::error::SectormapError;
use crate::domain::instrument::RawInstrument;
use chrono::{DateTime, Utc};

/// A catalogue snapshot as handed over by the retrieval side.
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    pub generated_at: Option<DateTime<Utc>>,
    pub records: Vec<RawInstrument>,
}

pub trait CataloguePort {
    fn fetch_catalogue(&self) -> Result<Catalogue, SectormapError>;
}
