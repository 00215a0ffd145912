//! Configuration validation.
//!
//! Checks every configurable value before a pipeline run so that the pure
//! domain functions never see a nonsensical configuration.

use crate::domain::config::{
    DEFAULT_COMPANY_KEY_LEN, DEFAULT_LIQUIDITY_MIN, DEFAULT_MAX_BOXES, DEFAULT_MIN_ITEMS,
    DEFAULT_TOP_N, MAX_TOP_N,
};
use crate::domain::error::SectormapError;
use crate::domain::instrument::RatioField;
use crate::ports::config_port::ConfigPort;

/// Config keys for each screening range, with the widget defaults.
pub const RANGE_KEYS: &[(RatioField, &str, f64, f64)] = &[
    (RatioField::PL, "pl", 0.0, 20.0),
    (RatioField::NetMargin, "margin", 10.0, 100.0),
    (RatioField::Roe, "roe", 0.0, 100.0),
    (RatioField::Roic, "roic", 0.0, 100.0),
    (RatioField::Dy, "dy", 0.0, 100.0),
];

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SectormapError> {
    validate_normalize_config(config)?;
    validate_hierarchy_config(config)?;
    validate_screen_config(config)?;
    Ok(())
}

pub fn validate_normalize_config(config: &dyn ConfigPort) -> Result<(), SectormapError> {
    let floor = config.get_double("normalize", "liquidity_min", DEFAULT_LIQUIDITY_MIN);
    if !floor.is_finite() || floor < 0.0 {
        return Err(SectormapError::invalid(
            "normalize",
            "liquidity_min",
            "liquidity_min must be non-negative",
        ));
    }
    let key_len = config.get_int("normalize", "company_key_len", DEFAULT_COMPANY_KEY_LEN as i64);
    if key_len < 1 {
        return Err(SectormapError::invalid(
            "normalize",
            "company_key_len",
            "company_key_len must be at least 1",
        ));
    }
    Ok(())
}

pub fn validate_hierarchy_config(config: &dyn ConfigPort) -> Result<(), SectormapError> {
    let min_items = config.get_int("hierarchy", "min_items", DEFAULT_MIN_ITEMS as i64);
    if min_items < 1 {
        return Err(SectormapError::invalid(
            "hierarchy",
            "min_items",
            "min_items must be at least 1",
        ));
    }
    let max_boxes = config.get_int("hierarchy", "max_boxes", DEFAULT_MAX_BOXES as i64);
    if max_boxes < 2 {
        return Err(SectormapError::invalid(
            "hierarchy",
            "max_boxes",
            "max_boxes must be at least 2",
        ));
    }
    Ok(())
}

pub fn validate_screen_config(config: &dyn ConfigPort) -> Result<(), SectormapError> {
    let top_n = config.get_int("screen", "top_n", DEFAULT_TOP_N as i64);
    if top_n < 1 || top_n > MAX_TOP_N as i64 {
        return Err(SectormapError::invalid(
            "screen",
            "top_n",
            format!("top_n must be between 1 and {}", MAX_TOP_N),
        ));
    }

    if let Some(priority) = config.get_string("screen", "priority") {
        priority
            .parse::<RatioField>()
            .map_err(|reason| SectormapError::invalid("screen", "priority", reason))?;
    }

    for (_, key, default_min, default_max) in RANGE_KEYS {
        let min_key = format!("{}_min", key);
        let max_key = format!("{}_max", key);
        let min = config.get_double("screen", &min_key, *default_min);
        let max = config.get_double("screen", &max_key, *default_max);
        if min > max {
            return Err(SectormapError::invalid(
                "screen",
                &min_key,
                format!("{} must not exceed {} ({} > {})", min_key, max_key, min, max),
            ));
        }
    }
    Ok(())
}
