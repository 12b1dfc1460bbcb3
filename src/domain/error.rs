//! Domain error types.

/// Top-level error type for pricedash.
///
/// Every variant aborts the current render cycle; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum PricedashError {
    #[error("no data file available for period \"{period}\"")]
    CatalogEmpty { period: String },

    #[error("object not found in store: {key}")]
    NotFound { key: String },

    #[error("failed to decode {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("{key} is missing required column(s): {}", missing.join(", "))]
    Schema { key: String, missing: Vec<String> },

    #[error("store error: {reason}")]
    Store { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown period \"{0}\"")]
    UnknownPeriod(String),

    #[error("unknown strategy \"{0}\" (expected one of: Buy & Hold, SMA Crossover, Momentum)")]
    UnknownStrategy(String),

    #[error("render error: {reason}")]
    Render { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PricedashError> for std::process::ExitCode {
    fn from(err: &PricedashError) -> Self {
        let code: u8 = match err {
            PricedashError::Io(_) | PricedashError::Render { .. } => 1,
            PricedashError::ConfigParse { .. }
            | PricedashError::ConfigMissing { .. }
            | PricedashError::ConfigInvalid { .. }
            | PricedashError::UnknownPeriod(_)
            | PricedashError::UnknownStrategy(_) => 2,
            PricedashError::NotFound { .. } | PricedashError::Store { .. } => 3,
            PricedashError::Decode { .. } | PricedashError::Schema { .. } => 4,
            PricedashError::CatalogEmpty { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
