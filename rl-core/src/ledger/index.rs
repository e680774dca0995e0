//! Record Index
//!
//! Maintains the shared set of known record ids under one well-known ledger
//! key. Every submitter writes this key and the ledger offers no
//! compare-and-swap, so a plain read-append-write loses ids appended by a
//! concurrent writer between the read and the write.
//!
//! # Append protocol
//!
//! 1. Read the stored set (`known`).
//! 2. Write `known ∪ acknowledged ∪ {id}` unless it is already stored.
//! 3. Re-read. If `id` is missing, a concurrent writer overwrote the key:
//!    merge the fresh set into `known` and go back to 2.
//! 4. Once `id` is observed, re-read `confirmations` more times spaced by
//!    `confirmation_interval`; a stale writer that lands late is detected
//!    here and merged back via 2.
//! 5. Retries are bounded; exhaustion surfaces `IndexConflict`.
//!
//! Acknowledged ids are remembered by the manager and folded into every
//! later write, listing and `reconcile`, so an id overwritten after its
//! acknowledgement is restored the next time this manager touches the index.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::client::LedgerClient;
use super::keys::INDEX_KEY;
use crate::error::{LedgerError, LedgerResult};
use crate::types::RecordId;

/// Index append tuning
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Retries after the first attempt before giving up
    pub max_retries: u32,
    /// Extra verification reads after the id is first observed
    pub confirmations: u32,
    /// Spacing of confirmation reads
    pub confirmation_interval: Duration,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            confirmations: 1,
            confirmation_interval: Duration::from_millis(250),
        }
    }
}

/// Result of a confirmed append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    /// Appended id
    pub id: RecordId,
    /// Write/verify rounds used (1 = no conflict)
    pub attempts: u32,
    /// Whether the id was already stored before this call
    pub already_present: bool,
}

/// Shared record index over a ledger key
pub struct IndexManager {
    ledger: Arc<dyn LedgerClient>,
    key: String,
    config: IndexConfig,
    acknowledged: RwLock<Vec<RecordId>>,
}

impl IndexManager {
    /// Index under the standard key
    pub fn new(ledger: Arc<dyn LedgerClient>, config: IndexConfig) -> Self {
        Self::with_key(ledger, INDEX_KEY, config)
    }

    /// Index under a custom key
    pub fn with_key(ledger: Arc<dyn LedgerClient>, key: impl Into<String>, config: IndexConfig) -> Self {
        Self {
            ledger,
            key: key.into(),
            config,
            acknowledged: RwLock::new(Vec::new()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ids acknowledged by this manager, in acknowledgement order
    pub async fn acknowledged(&self) -> Vec<RecordId> {
        self.acknowledged.read().await.clone()
    }

    /// Treat `ids` as acknowledged by this manager
    ///
    /// Used to carry acknowledgements across processes; callers must only
    /// pass ids whose record bodies exist. Takes effect on the next
    /// `list_ids`, `append_id` or `reconcile`.
    pub async fn acknowledge(&self, ids: &[RecordId]) {
        let mut acknowledged = self.acknowledged.write().await;
        for id in ids {
            if !acknowledged.contains(id) {
                acknowledged.push(id.clone());
            }
        }
    }

    /// All known record ids
    ///
    /// Absent or malformed index content reads as empty. Ids acknowledged by
    /// this manager but missing from the stored set are included and written
    /// back opportunistically.
    pub async fn list_ids(&self) -> LedgerResult<Vec<RecordId>> {
        let stored = self.read_stored().await?;
        let acknowledged = self.acknowledged.read().await.clone();
        let merged = merge_ids(&stored, &acknowledged);

        if merged.len() > stored.len() {
            let missing = merged.len() - stored.len();
            warn!(key = %self.key, missing, "acknowledged ids missing from index, restoring");
            if let Err(e) = self.write_set(&merged).await {
                warn!(key = %self.key, error = %e, "opportunistic index repair failed");
            }
        }

        Ok(merged)
    }

    /// Append `id`, resolving concurrent overwrites
    pub async fn append_id(&self, id: &RecordId) -> LedgerResult<AppendReceipt> {
        let max_attempts = self.config.max_retries + 1;
        let mut stored = self.read_stored().await?;
        let mut known = stored.clone();
        let already_present = stored.contains(id);
        let mut attempts = 0;
        let mut last_write_error: Option<LedgerError> = None;

        while attempts < max_attempts {
            attempts += 1;

            let acknowledged = self.acknowledged.read().await.clone();
            let desired = merge_ids(&known, acknowledged.iter().chain(std::iter::once(id)));

            if desired.iter().any(|d| !stored.contains(d)) {
                match self.write_set(&desired).await {
                    Ok(()) => last_write_error = None,
                    Err(e @ LedgerError::WriteFailed { .. }) => {
                        warn!(key = %self.key, record_id = %id, attempt = attempts, error = %e, "index write rejected, retrying");
                        last_write_error = Some(e);
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }

            let fresh = self.read_stored().await?;
            if !fresh.contains(id) {
                warn!(key = %self.key, record_id = %id, attempt = attempts, "index overwritten by concurrent writer, merging");
                known = merge_ids(&desired, &fresh);
                stored = fresh;
                continue;
            }

            match self.confirm(id).await? {
                None => {
                    self.remember(id).await;
                    info!(key = %self.key, record_id = %id, attempts, "index append confirmed");
                    return Ok(AppendReceipt {
                        id: id.clone(),
                        attempts,
                        already_present,
                    });
                }
                Some(late) => {
                    warn!(key = %self.key, record_id = %id, attempt = attempts, "late overwrite detected during confirmation");
                    known = merge_ids(&merge_ids(&desired, &fresh), &late);
                    stored = late;
                }
            }
        }

        match last_write_error {
            Some(e) => Err(e),
            None => Err(LedgerError::IndexConflict {
                id: id.to_string(),
                attempts,
            }),
        }
    }

    /// Write back acknowledged ids missing from the stored set
    ///
    /// Returns how many ids were restored.
    pub async fn reconcile(&self) -> LedgerResult<usize> {
        let stored = self.read_stored().await?;
        let acknowledged = self.acknowledged.read().await.clone();
        let merged = merge_ids(&stored, &acknowledged);
        let restored = merged.len() - stored.len();

        if restored == 0 {
            debug!(key = %self.key, "index reconcile: nothing to restore");
            return Ok(0);
        }

        self.write_set(&merged).await?;
        let fresh = self.read_stored().await?;
        let fresh_set: HashSet<&RecordId> = fresh.iter().collect();
        if let Some(lost) = acknowledged.iter().find(|id| !fresh_set.contains(id)) {
            return Err(LedgerError::IndexConflict {
                id: lost.to_string(),
                attempts: 1,
            });
        }

        info!(key = %self.key, restored, "index reconciled");
        Ok(restored)
    }

    /// Spaced verification reads; returns the set that dropped `id`, if any
    async fn confirm(&self, id: &RecordId) -> LedgerResult<Option<Vec<RecordId>>> {
        for _ in 0..self.config.confirmations {
            if !self.config.confirmation_interval.is_zero() {
                tokio::time::sleep(self.config.confirmation_interval).await;
            }
            let fresh = self.read_stored().await?;
            if !fresh.contains(id) {
                return Ok(Some(fresh));
            }
        }
        Ok(None)
    }

    async fn remember(&self, id: &RecordId) {
        let mut acknowledged = self.acknowledged.write().await;
        if !acknowledged.contains(id) {
            acknowledged.push(id.clone());
        }
    }

    async fn read_stored(&self) -> LedgerResult<Vec<RecordId>> {
        let bytes = match self.ledger.read(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Ok(Vec::new()),
            // Adapters report undecodable transport encodings as Corrupt
            Err(e @ LedgerError::Corrupt { .. }) => {
                warn!(key = %self.key, error = %e, "unreadable index content, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };
        Ok(decode_index(&self.key, &bytes))
    }

    async fn write_set(&self, ids: &[RecordId]) -> LedgerResult<()> {
        let bytes = serde_json::to_vec(ids)?;
        self.ledger.write(&self.key, &bytes).await?;
        debug!(key = %self.key, count = ids.len(), "index written");
        Ok(())
    }
}

/// Decode the stored id array; malformed content reads as empty
fn decode_index(key: &str, bytes: &[u8]) -> Vec<RecordId> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Vec::new();
    }
    match serde_json::from_slice::<Vec<RecordId>>(bytes) {
        Ok(ids) => merge_ids(&[], &ids),
        Err(e) => {
            warn!(key, error = %e, "malformed index content, treating as empty");
            Vec::new()
        }
    }
}

/// Order-preserving union without duplicates
fn merge_ids<'a>(base: &'a [RecordId], extra: impl IntoIterator<Item = &'a RecordId>) -> Vec<RecordId> {
    let mut seen: HashSet<RecordId> = HashSet::with_capacity(base.len());
    let mut out = Vec::with_capacity(base.len());
    for id in base.iter().chain(extra) {
        if seen.insert(id.clone()) {
            out.push(id.clone());
        }
    }
    out
}
