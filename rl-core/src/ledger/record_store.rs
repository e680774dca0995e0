//! Record Store
//!
//! CRUD over individual record bodies, one ledger key per record.
//!
//! # Status updates
//!
//! `set_status` is a read-modify-write of a single key. Two callers
//! transitioning the same record concurrently race and the last write wins;
//! callers that need certainty re-read after writing (the workflow engine
//! does). Every stored field other than `status` is carried over untouched,
//! including fields this version does not know about.

use std::sync::Arc;
use tracing::{debug, warn};

use super::client::LedgerClient;
use super::keys::{record_key, INDEX_KEY};
use crate::error::{LedgerError, LedgerResult};
use crate::types::{Record, RecordId, RecordStatus};

/// Outcome of a batch read
#[derive(Debug, Clone, Default)]
pub struct BatchRead {
    /// Records that decoded cleanly, in request order
    pub records: Vec<Record>,
    /// Ids that could not be read, with the reason
    pub skipped: Vec<(RecordId, String)>,
}

/// Record body storage on top of a ledger client
#[derive(Clone)]
pub struct RecordStore {
    ledger: Arc<dyn LedgerClient>,
}

impl RecordStore {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Write a record body (payload must already be sealed)
    pub async fn put(&self, record: &Record) -> LedgerResult<()> {
        let key = record_key(&record.id);
        if key == INDEX_KEY {
            return Err(LedgerError::write_failed(
                key,
                "record id collides with the index key",
            ));
        }

        let bytes = record.to_bytes()?;
        self.ledger.write(&key, &bytes).await?;
        debug!(record_id = %record.id, bytes = bytes.len(), "record body written");
        Ok(())
    }

    /// Read a record body
    ///
    /// Returns `Ok(None)` when absent and `Err(Corrupt)` when the stored
    /// bytes do not decode.
    pub async fn get(&self, id: &RecordId) -> LedgerResult<Option<Record>> {
        let key = record_key(id);
        let Some(bytes) = self.ledger.read(&key).await? else {
            return Ok(None);
        };

        Record::from_bytes(id.clone(), &bytes)
            .map(Some)
            .map_err(|e| LedgerError::corrupt(key, e.to_string()))
    }

    /// Read many records, isolating failures per record
    ///
    /// Absent, corrupt and unreadable entries are skipped and reported in
    /// `skipped`; they never fail the batch.
    pub async fn get_many(&self, ids: &[RecordId]) -> BatchRead {
        let mut batch = BatchRead::default();

        for id in ids {
            match self.get(id).await {
                Ok(Some(record)) => batch.records.push(record),
                Ok(None) => {
                    debug!(record_id = %id, "indexed record has no body yet");
                    batch.skipped.push((id.clone(), "absent".to_string()));
                }
                Err(e) => {
                    warn!(record_id = %id, error = %e, "skipping unreadable record");
                    batch.skipped.push((id.clone(), e.to_string()));
                }
            }
        }

        batch
    }

    /// Replace the stored `status` field, preserving every other field
    pub async fn set_status(&self, id: &RecordId, status: RecordStatus) -> LedgerResult<Record> {
        let key = record_key(id);
        let bytes = self
            .ledger
            .read(&key)
            .await?
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;

        // Validate the whole envelope first so a corrupt body is never rewritten.
        Record::from_bytes(id.clone(), &bytes)
            .map_err(|e| LedgerError::corrupt(key.clone(), e.to_string()))?;

        let mut fields: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&bytes)
            .map_err(|e| LedgerError::corrupt(key.clone(), e.to_string()))?;
        fields.insert(
            "status".to_string(),
            serde_json::Value::String(status.as_str().to_string()),
        );

        let updated = serde_json::to_vec(&fields)?;
        self.ledger.write(&key, &updated).await?;
        debug!(record_id = %id, status = %status, "record status written");

        Record::from_bytes(id.clone(), &updated)
            .map_err(|e| LedgerError::corrupt(key, e.to_string()))
    }
}
