//! In-Memory Ledger
//!
//! Process-local `LedgerClient` with the same per-key semantics as the
//! contract. Used by tests, tooling and single-process demos. Supports
//! simulated latency, an availability switch and per-key write failures so
//! failure paths can be exercised without a live contract.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::client::LedgerClient;
use crate::error::{LedgerError, LedgerResult};

/// In-memory key-value ledger
pub struct MemoryLedger {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    failing_keys: RwLock<HashSet<String>>,
    available: AtomicBool,
    latency: Duration,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            failing_keys: RwLock::new(HashSet::new()),
            available: AtomicBool::new(true),
            latency: Duration::ZERO,
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        }
    }

    /// Delay every read and write by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Toggle availability; an unavailable ledger fails every call
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Reject all subsequent writes to `key`
    pub async fn fail_writes_to(&self, key: &str) {
        self.failing_keys.write().await.insert(key.to_string());
    }

    /// Stop rejecting writes
    pub async fn clear_failures(&self) {
        self.failing_keys.write().await.clear();
    }

    /// Store raw bytes, bypassing availability and failure injection
    pub async fn insert_raw(&self, key: &str, value: &[u8]) {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
    }

    /// Raw bytes under `key`
    pub async fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Number of keys with a value
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Reads served so far
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Writes accepted so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    async fn simulate_round_trip(&self) -> LedgerResult<()> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if !self.available.load(Ordering::SeqCst) {
            return Err(LedgerError::LedgerUnavailable(
                "memory ledger switched off".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        self.simulate_round_trip().await?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        let value = self
            .entries
            .read()
            .await
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned();
        debug!(key, found = value.is_some(), "memory ledger read");
        Ok(value)
    }

    async fn write(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        self.simulate_round_trip().await?;
        if self.failing_keys.read().await.contains(key) {
            return Err(LedgerError::write_failed(key, "write rejected by ledger"));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        self.writes.fetch_add(1, Ordering::Relaxed);
        debug!(key, bytes = value.len(), "memory ledger write");
        Ok(())
    }

    async fn is_available(&self) -> LedgerResult<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_your_write() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.read("k").await.unwrap(), None);

        ledger.write("k", b"v1").await.unwrap();
        assert_eq!(ledger.read("k").await.unwrap(), Some(b"v1".to_vec()));

        ledger.write("k", b"v2").await.unwrap();
        assert_eq!(ledger.read("k").await.unwrap(), Some(b"v2".to_vec()));
        assert_eq!(ledger.write_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_value_reads_as_absent() {
        let ledger = MemoryLedger::new();
        ledger.write("k", b"").await.unwrap();
        assert_eq!(ledger.read("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let ledger = MemoryLedger::new();
        ledger.set_available(false);
        assert!(!ledger.is_available().await.unwrap());
        let err = ledger.read("k").await.unwrap_err();
        assert_eq!(err.kind(), "ledger_unavailable");
        let err = ledger.write("k", b"v").await.unwrap_err();
        assert_eq!(err.kind(), "ledger_unavailable");
    }

    #[tokio::test]
    async fn test_injected_write_failure() {
        let ledger = MemoryLedger::new();
        ledger.fail_writes_to("k").await;
        let err = ledger.write("k", b"v").await.unwrap_err();
        assert_eq!(err.kind(), "write_failed");
        ledger.write("other", b"v").await.unwrap();

        ledger.clear_failures().await;
        ledger.write("k", b"v").await.unwrap();
    }
}
