//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Requested session is not in the configuration
    #[error("Session '{id}' not found in configuration")]
    SessionNotFound { id: String },

    /// Every selected session failed
    #[error("All {count} selected sessions failed")]
    AllSessionsFailed { count: usize },

    /// Invalid command-line override
    #[error("Invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}
