//! CSV catalogue adapter.
//!
//! Columns are matched by header name; order does not matter and unknown
//! columns are ignored.

use crate::domain::error::SectormapError;
use crate::domain::instrument::RawInstrument;
use crate::ports::catalogue_port::{Catalogue, CataloguePort};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn parse(content: &str) -> Result<Vec<RawInstrument>, SectormapError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (line, result) in rdr.deserialize::<RawInstrument>().enumerate() {
            let record = result.map_err(|e| SectormapError::Catalogue {
                reason: format!("CSV parse error at record {}: {}", line + 1, e),
            })?;
            records.push(record);
        }
        Ok(records)
    }
}

impl CataloguePort for CsvAdapter {
    fn fetch_catalogue(&self) -> Result<Catalogue, SectormapError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SectormapError::Catalogue {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let records = Self::parse(&content)?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "loaded CSV catalogue");
        Ok(Catalogue {
            generated_at: None,
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = "ticker,sector,subsector,market_cap,liq_2m,p_l,p_vp,net_margin,roe,roic,dy\n\
        PETR4,\"Petróleo, Gás e Biocombustíveis\",Exploração,510000000000,1200000000,4.1,1.1,0.2,0.3,0.18,0.12\n\
        ITUB4,Financeiro,Bancos,300000000000,800000000,8.0,1.8,,0.2,,0.06\n";

    #[test]
    fn parses_records_by_header() {
        let records = CsvAdapter::parse(SAMPLE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ticker, "PETR4");
        assert_eq!(records[0].sector.as_deref(), Some("Petróleo, Gás e Biocombustíveis"));
        assert_eq!(records[0].market_cap, Some(510_000_000_000.0));
        assert_eq!(records[1].net_margin, None);
        assert_eq!(records[1].roe, Some(0.2));
    }

    #[test]
    fn column_order_does_not_matter() {
        let records = CsvAdapter::parse("liq_2m,ticker,extra\n5000000,VALE3,x\n").unwrap();
        assert_eq!(records[0].ticker, "VALE3");
        assert_eq!(records[0].liq_2m, Some(5_000_000.0));
        assert_eq!(records[0].sector, None);
    }

    #[test]
    fn fetch_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalogue.csv");
        fs::write(&path, SAMPLE).unwrap();
        let catalogue = CsvAdapter::new(path).fetch_catalogue().unwrap();
        assert_eq!(catalogue.records.len(), 2);
    }

    #[test]
    fn missing_ticker_column_is_an_error() {
        let err = CsvAdapter::parse("sector\nVarejo\n").unwrap_err();
        assert!(matches!(err, SectormapError::Catalogue { .. }));
    }
}
