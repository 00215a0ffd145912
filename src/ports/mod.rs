//! Port traits decoupling the domain from I/O.

pub mod catalogue_port;
pub mod config_port;
pub mod output_port;
