//! Ledger Client
//!
//! Adapter boundary to the external key-value ledger contract.
//!
//! The ledger offers independent `read` / `write` per key and nothing else:
//! no compare-and-swap, no cross-key transactions, no locks. A successful
//! write is durable and visible to later reads of the same key. Adapters do
//! not retry or cache; failures are reported to the caller.

use async_trait::async_trait;

use crate::error::LedgerResult;

/// Key-value ledger adapter
///
/// Empty values are reported as absent; the contract returns empty bytes
/// for keys that were never written.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Read the value stored under `key`
    async fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Overwrite the value stored under `key`
    async fn write(&self, key: &str, value: &[u8]) -> LedgerResult<()>;

    /// Probe whether the contract is reachable and serving
    async fn is_available(&self) -> LedgerResult<bool> {
        Ok(true)
    }

    /// Backend identifier for logs
    fn backend_type(&self) -> &'static str;
}
