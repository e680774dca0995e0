//! Operation Lifecycle Events
//!
//! Every user-facing session operation reports `Pending` when it starts and
//! exactly one of `Success` / `Failed` when it ends. Front ends subscribe to
//! drive progress indicators; nothing in the core depends on a subscriber
//! being present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::error::LedgerError;

const EVENT_CAPACITY: usize = 64;

/// User-facing operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    List,
    Submit,
    AdvanceStatus,
    Disclose,
    Reconcile,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::List => "list",
            OperationKind::Submit => "submit",
            OperationKind::AdvanceStatus => "advance_status",
            OperationKind::Disclose => "disclose",
            OperationKind::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum OperationPhase {
    Pending,
    Success,
    Failed {
        /// Stable error kind
        kind: String,
        /// Human-readable reason
        reason: String,
    },
}

impl OperationPhase {
    pub fn failed(err: &LedgerError) -> Self {
        OperationPhase::Failed {
            kind: err.kind().to_string(),
            reason: err.to_string(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationPhase::Pending)
    }
}

/// One lifecycle notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEvent {
    pub operation: OperationKind,
    /// Record the operation targets, when known
    pub record_id: Option<String>,
    #[serde(flatten)]
    pub phase: OperationPhase,
    pub at: DateTime<Utc>,
}

/// Broadcasts lifecycle events to any number of subscribers
#[derive(Debug, Clone)]
pub struct LifecycleReporter {
    event_tx: broadcast::Sender<OperationEvent>,
}

impl LifecycleReporter {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { event_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OperationEvent> {
        self.event_tx.subscribe()
    }

    pub fn pending(&self, operation: OperationKind, record_id: Option<&str>) {
        self.emit(operation, record_id, OperationPhase::Pending);
    }

    pub fn success(&self, operation: OperationKind, record_id: Option<&str>) {
        self.emit(operation, record_id, OperationPhase::Success);
    }

    pub fn failed(&self, operation: OperationKind, record_id: Option<&str>, err: &LedgerError) {
        self.emit(operation, record_id, OperationPhase::failed(err));
    }

    fn emit(&self, operation: OperationKind, record_id: Option<&str>, phase: OperationPhase) {
        // No subscribers is fine.
        let _ = self.event_tx.send(OperationEvent {
            operation,
            record_id: record_id.map(str::to_string),
            phase,
            at: Utc::now(),
        });
    }
}

impl Default for LifecycleReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_see_ordered_phases() {
        let reporter = LifecycleReporter::new();
        let mut rx = reporter.subscribe();

        reporter.pending(OperationKind::Submit, None);
        reporter.failed(
            OperationKind::Submit,
            Some("r1"),
            &LedgerError::write_failed("record_r1", "rejected"),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.phase, OperationPhase::Pending);
        assert!(!first.phase.is_terminal());

        let second = rx.recv().await.unwrap();
        assert_eq!(second.record_id.as_deref(), Some("r1"));
        match second.phase {
            OperationPhase::Failed { kind, .. } => assert_eq!(kind, "write_failed"),
            other => panic!("unexpected phase {other:?}"),
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let reporter = LifecycleReporter::new();
        reporter.success(OperationKind::List, None);
    }

    #[test]
    fn test_event_json_shape() {
        let event = OperationEvent {
            operation: OperationKind::AdvanceStatus,
            record_id: Some("r1".to_string()),
            phase: OperationPhase::Success,
            at: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["operation"], "advance_status");
        assert_eq!(value["phase"], "success");
    }
}
