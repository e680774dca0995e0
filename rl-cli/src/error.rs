//! CLI Error Types
//!
//! Error types for the record ledger CLI.

use rl_core::LedgerError;
use rl_store::StoreError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Ledger operation failed
    #[error("{0}")]
    Ledger(#[from] LedgerError),

    /// Backend setup failed
    #[error("Backend error: {0}")]
    Store(#[from] StoreError),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CliError::ConfigError {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_arg(message: impl Into<String>) -> Self {
        CliError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::ConfigError { .. } => 1,
            CliError::InvalidArgument { .. } => 2,
            CliError::Store(_) => 3,
            CliError::IoError(_) => 5,
            CliError::JsonError(_) => 6,
            CliError::Ledger(e) => match e {
                LedgerError::LedgerUnavailable(_) => 3,
                LedgerError::Configuration(_) => 1,
                LedgerError::NotConnected => 2,
                LedgerError::WriteFailed { .. } => 10,
                LedgerError::IndexConflict { .. } => 11,
                LedgerError::Corrupt { .. } => 12,
                LedgerError::NotFound(_) => 21,
                LedgerError::TimedOut { .. } => 22,
                LedgerError::Cancelled(_) => 22,
                LedgerError::NotAuthorized { .. } => 23,
                LedgerError::InvalidTransition { .. } => 24,
                LedgerError::StatusOverwritten { .. } => 24,
                LedgerError::Denied(_) => 25,
                LedgerError::Codec(_) | LedgerError::Serialization(_) => 30,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_core::RecordStatus;

    #[test]
    fn test_config_error() {
        let err = CliError::config("Missing contract address");
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("Missing contract address"));
    }

    #[test]
    fn test_invalid_argument() {
        let err = CliError::invalid_arg("Unknown category: Wood");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_ledger_errors_keep_their_message() {
        let err: CliError = LedgerError::InvalidTransition {
            record_id: "r1".to_string(),
            from: RecordStatus::Processed,
            to: RecordStatus::Rejected,
        }
        .into();
        assert_eq!(err.exit_code(), 24);
        assert!(err.to_string().contains("processed -> rejected"));

        let err: CliError = LedgerError::NotFound("r9".to_string()).into();
        assert_eq!(err.exit_code(), 21);
    }
}
