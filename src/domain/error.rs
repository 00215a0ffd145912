//! Domain error types.

/// Top-level error type for sectormap.
#[derive(Debug, thiserror::Error)]
pub enum SectormapError {
    #[error("catalogue error: {reason}")]
    Catalogue { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("output error: {reason}")]
    Output { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SectormapError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        SectormapError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&SectormapError> for std::process::ExitCode {
    fn from(err: &SectormapError) -> Self {
        let code: u8 = match err {
            SectormapError::Io(_) | SectormapError::Output { .. } => 1,
            SectormapError::ConfigParse { .. } | SectormapError::ConfigInvalid { .. } => 2,
            SectormapError::Catalogue { .. } => 3,
        };
        std::process::ExitCode::from(code)
    }
}
