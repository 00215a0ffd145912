//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_catalogue_adapter;
pub mod json_output_adapter;
