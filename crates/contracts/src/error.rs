//! Layered error definitions
//!
//! Categorized by source: parse / alignment / config / ingestion / sink

use thiserror::Error;

/// Row-level timestamp parse failure.
///
/// Always recoverable: batch parsers count these and keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Field count or numeric conversion failed
    #[error("malformed timestamp '{raw}': {reason}")]
    MalformedTimestamp { raw: String, reason: String },
}

impl ParseError {
    /// Create malformed timestamp error
    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTimestamp {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Alignment Errors =====
    /// No diameter series was supplied (fatal)
    #[error("no diameter data: the diameter series is missing or empty")]
    NoDiameterData,

    /// No usable pressure samples (degrades to diameter-only output)
    #[error("no pressure data: {message}")]
    NoPressureData { message: String },

    /// Frame range cannot be rescaled (normalizer short-circuits)
    #[error("degenerate frame range: {message}")]
    DegenerateFrameRange { message: String },

    /// Engine method called out of order
    #[error("invalid engine state: expected {expected}, found {actual}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// Measurement values cannot be used for a derived quantity
    #[error("invalid measurement '{field}': {message}")]
    InvalidMeasurement { field: String, message: String },

    /// Timestamp parse error surfaced outside a batch
    #[error(transparent)]
    Parse(#[from] ParseError),

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Ingestion Errors =====
    /// Required table column not found under any alias
    #[error("table '{table}' has no column matching {aliases:?}")]
    MissingColumn { table: String, aliases: Vec<String> },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create invalid measurement error
    pub fn invalid_measurement(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMeasurement {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Whether the run must abort on this error
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::NoPressureData { .. } | Self::DegenerateFrameRange { .. } | Self::Parse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatality_taxonomy() {
        assert!(ContractError::NoDiameterData.is_fatal());
        assert!(!ContractError::NoPressureData {
            message: "empty log".into()
        }
        .is_fatal());
        assert!(!ContractError::from(ParseError::malformed("12-xx", "bad field")).is_fatal());
    }

    #[test]
    fn test_parse_error_message() {
        let err = ParseError::malformed("12:00", "expected 3 fields, got 2");
        assert_eq!(
            err.to_string(),
            "malformed timestamp '12:00': expected 3 fields, got 2"
        );
    }
}
