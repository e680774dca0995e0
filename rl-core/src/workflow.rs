//! Workflow Engine
//!
//! Owner-only status transitions over the record store.
//!
//! ```text
//! Pending ──Processed──▶ Processed (terminal)
//!    │
//!    └────Rejected────▶ Rejected  (terminal)
//! ```
//!
//! Checks run in a fixed order: existence, ownership, transition. A
//! non-owner therefore learns nothing about the record's status.

use std::time::Duration;
use tracing::{info, warn};

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::RecordStore;
use crate::types::{OwnerAddress, Record, RecordId, RecordStatus};

/// Status state machine
#[derive(Clone)]
pub struct WorkflowEngine {
    store: RecordStore,
    processing_latency: Duration,
}

impl WorkflowEngine {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            processing_latency: Duration::ZERO,
        }
    }

    /// Simulated processing delay before a transition is written
    pub fn with_processing_latency(mut self, latency: Duration) -> Self {
        self.processing_latency = latency;
        self
    }

    /// Move a pending record to a terminal status
    pub async fn advance(
        &self,
        id: &RecordId,
        target: RecordStatus,
        caller: &OwnerAddress,
    ) -> LedgerResult<Record> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        if !record.is_owned_by(caller) {
            warn!(record_id = %id, caller = %caller, "transition attempted by non-owner");
            return Err(LedgerError::NotAuthorized {
                record_id: id.to_string(),
                caller: caller.to_string(),
            });
        }

        if !record.status.can_transition_to(target) {
            return Err(LedgerError::InvalidTransition {
                record_id: id.to_string(),
                from: record.status,
                to: target,
            });
        }

        if !self.processing_latency.is_zero() {
            tokio::time::sleep(self.processing_latency).await;
        }

        self.store.set_status(id, target).await?;

        let observed = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        if observed.status != target {
            warn!(
                record_id = %id,
                expected = %target,
                observed = %observed.status,
                "status overwritten by concurrent transition"
            );
            return Err(LedgerError::StatusOverwritten {
                record_id: id.to_string(),
                expected: target,
                observed: observed.status,
            });
        }

        info!(record_id = %id, from = %record.status, to = %target, "record status advanced");
        Ok(observed)
    }
}
