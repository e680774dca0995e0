//! Cancellation and Deadlines
//!
//! Submissions and disclosures span several ledger round-trips and may be
//! abandoned by the caller. A `CancelToken` is a cloneable flag backed by a
//! watch channel; `run_bounded` races an operation against the token and a
//! hard deadline.
//!
//! An abandoned operation stops at its next suspension point. Writes that
//! already reached the ledger stay there, so after `Cancelled` or `TimedOut`
//! the caller must re-query before assuming either outcome.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tracing::warn;

use crate::error::{LedgerError, LedgerResult};

/// Cloneable cancellation flag
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: std::sync::Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
            rx,
        }
    }

    /// Signal cancellation to every clone
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is signalled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // The sender lives as long as any clone, so this only ends on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `fut` until it completes, `cancel` fires or `timeout` elapses
pub async fn run_bounded<T, F>(
    operation: &str,
    timeout: Duration,
    cancel: &CancelToken,
    fut: F,
) -> LedgerResult<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(LedgerError::Cancelled(operation.to_string()));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(operation, "operation cancelled, ledger state must be re-queried");
            Err(LedgerError::Cancelled(operation.to_string()))
        }
        result = tokio::time::timeout(timeout, fut) => match result {
            Ok(inner) => inner,
            Err(_) => {
                warn!(operation, timeout_ms = timeout.as_millis() as u64, "operation timed out, ledger state must be re-queried");
                Err(LedgerError::timed_out(operation, timeout))
            }
        },
    }
}
