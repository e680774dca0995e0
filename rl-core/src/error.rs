//! Record Ledger Error Types
//!
//! Error taxonomy shared by every layer of the confidential record ledger.
//! Each variant maps to one failure class callers can react to: transport
//! failures are retryable later, workflow violations are final, and
//! disclosure failures are safe to retry from scratch.

use thiserror::Error;

use crate::types::RecordStatus;

/// Record ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger transport or contract not reachable
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// A single write was rejected by the ledger
    #[error("Write failed for key {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    /// Index append could not be confirmed within the retry budget
    #[error("Index conflict: id {id} not confirmed after {attempts} attempts")]
    IndexConflict { id: String, attempts: u32 },

    /// Stored bytes failed to decode
    #[error("Corrupt entry at {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Caller is not the record owner
    #[error("Not authorized: {caller} is not the owner of record {record_id}")]
    NotAuthorized { record_id: String, caller: String },

    /// Status transition not allowed by the workflow
    #[error("Invalid transition for record {record_id}: {from} -> {to}")]
    InvalidTransition {
        record_id: String,
        from: RecordStatus,
        to: RecordStatus,
    },

    /// Post-write confirmation observed a different status (last write won)
    #[error("Status of record {record_id} overwritten: expected {expected}, observed {observed}")]
    StatusOverwritten {
        record_id: String,
        expected: RecordStatus,
        observed: RecordStatus,
    },

    /// Disclosure refused
    #[error("Disclosure denied: {0}")]
    Denied(String),

    /// Operation exceeded its deadline; ledger state is unknown
    #[error("Operation {operation} timed out after {after_ms}ms")]
    TimedOut { operation: String, after_ms: u64 },

    /// Operation cancelled by the caller; ledger state is unknown
    #[error("Operation {0} cancelled")]
    Cancelled(String),

    /// No identity connected to the session
    #[error("No identity connected to the session")]
    NotConnected,

    /// Confidentiality codec failure
    #[error("Codec error: {0}")]
    Codec(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Record ledger result type
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Create a write failure for a key
    pub fn write_failed(key: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgerError::WriteFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a corruption error for a key
    pub fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        LedgerError::Corrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error
    pub fn timed_out(operation: impl Into<String>, after: std::time::Duration) -> Self {
        LedgerError::TimedOut {
            operation: operation.into(),
            after_ms: after.as_millis() as u64,
        }
    }

    /// Stable machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::LedgerUnavailable(_) => "ledger_unavailable",
            LedgerError::WriteFailed { .. } => "write_failed",
            LedgerError::IndexConflict { .. } => "index_conflict",
            LedgerError::Corrupt { .. } => "corrupt",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::NotAuthorized { .. } => "not_authorized",
            LedgerError::InvalidTransition { .. } => "invalid_transition",
            LedgerError::StatusOverwritten { .. } => "status_overwritten",
            LedgerError::Denied(_) => "denied",
            LedgerError::TimedOut { .. } => "timed_out",
            LedgerError::Cancelled(_) => "cancelled",
            LedgerError::NotConnected => "not_connected",
            LedgerError::Codec(_) => "codec",
            LedgerError::Serialization(_) => "serialization",
            LedgerError::Configuration(_) => "configuration",
        }
    }

    /// Whether the caller may retry the same operation later
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::LedgerUnavailable(_)
                | LedgerError::WriteFailed { .. }
                | LedgerError::IndexConflict { .. }
                | LedgerError::Denied(_)
                | LedgerError::TimedOut { .. }
                | LedgerError::Cancelled(_)
        )
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        let err = LedgerError::IndexConflict {
            id: "r1".to_string(),
            attempts: 5,
        };
        assert_eq!(err.kind(), "index_conflict");
        assert!(err.to_string().contains("r1"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_workflow_errors_are_final() {
        let err = LedgerError::InvalidTransition {
            record_id: "r1".to_string(),
            from: RecordStatus::Processed,
            to: RecordStatus::Rejected,
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("processed -> rejected"));

        let err = LedgerError::NotAuthorized {
            record_id: "r1".to_string(),
            caller: "0xB".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_timeout_reports_millis() {
        let err = LedgerError::timed_out("submit", std::time::Duration::from_secs(2));
        assert!(err.to_string().contains("2000ms"));
    }
}
