//! Ledger Backend Error Types

use rl_core::LedgerError;
use thiserror::Error;

/// Backend construction and setup errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error
    #[error("I/O error at {path}: {reason}")]
    Io { path: String, reason: String },

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Backend unavailable
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging setup failed
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Backend result type
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn io(path: impl AsRef<std::path::Path>, err: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(reason) => LedgerError::LedgerUnavailable(reason),
            StoreError::Io { .. } | StoreError::Http(_) => {
                LedgerError::LedgerUnavailable(err.to_string())
            }
            StoreError::Configuration(reason) | StoreError::Logging(reason) => {
                LedgerError::Configuration(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_to_ledger_error() {
        let err: LedgerError = StoreError::Unavailable("gateway down".to_string()).into();
        assert_eq!(err.kind(), "ledger_unavailable");

        let err: LedgerError = StoreError::Configuration("bad url".to_string()).into();
        assert_eq!(err.kind(), "configuration");
    }
}
