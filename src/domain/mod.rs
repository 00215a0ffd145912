//! Core domain types and logic.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod config_validation;
pub mod error;
pub mod hierarchy;
pub mod instrument;
pub mod navigation;
pub mod node;
pub mod normalizer;
pub mod screening;
pub mod search;
pub mod session;
pub mod taxonomy;
