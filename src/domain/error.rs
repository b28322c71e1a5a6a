//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for the market engine.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("unknown symbol: {symbol}")]
    NotFound { symbol: String },

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid indicator window {window}: must be at least 1")]
    InvalidWindow { window: usize },

    #[error("invalid band multiplier {value}: must be finite and non-negative")]
    InvalidMultiplier { value: f64 },

    #[error("invalid alert threshold {value}: must be a finite, non-negative percent")]
    InvalidThreshold { value: f64 },

    #[error("period of {days} days before {as_of} leaves the supported date range")]
    PeriodOutOfRange { as_of: NaiveDate, days: i64 },

    #[error("duplicate symbol in catalog: {symbol}")]
    DuplicateSymbol { symbol: String },

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

    #[error("export failed: {reason}")]
    Export { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MarketError {
    pub fn not_found(symbol: impl Into<String>) -> Self {
        MarketError::NotFound {
            symbol: symbol.into(),
        }
    }

    pub(crate) fn invalid_config(section: &str, key: &str, reason: impl Into<String>) -> Self {
        MarketError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&MarketError> for std::process::ExitCode {
    fn from(err: &MarketError) -> Self {
        let code: u8 = match err {
            MarketError::Io(_) => 1,
            MarketError::ConfigParse { .. }
            | MarketError::ConfigMissing { .. }
            | MarketError::ConfigInvalid { .. } => 2,
            MarketError::NotFound { .. } | MarketError::DuplicateSymbol { .. } => 3,
            MarketError::InvalidRange { .. }
            | MarketError::PeriodOutOfRange { .. }
            | MarketError::InvalidWindow { .. }
            | MarketError::InvalidMultiplier { .. }
            | MarketError::InvalidThreshold { .. } => 4,
            MarketError::Export { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
