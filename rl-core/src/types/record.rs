//! Record Types
//!
//! The record is the ledger's unit of storage: a sealed payload plus the
//! plaintext metadata needed to index and review it.
//!
//! # Wire Format
//!
//! Records are stored as a JSON envelope under a per-record key:
//!
//! ```text
//! { "sealedPayload": "...", "createdAt": 1700000000, "owner": "0x..",
//!   "category": "Plastic", "status": "pending" }
//! ```
//!
//! The id is not part of the envelope; it is recovered from the key. Older
//! writers used `data` / `timestamp` for the first two fields and sometimes
//! omitted `status`; both are still accepted on read.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Category, RecordStatus};

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque unique record identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    /// Wrap an existing id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id: `<unix-millis>-<7 base36 chars>`
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        Self(format!("{}-{}", Utc::now().timestamp_millis(), suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Wallet-style identity of a record owner or caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerAddress(pub String);

impl OwnerAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Addresses compare ASCII case-insensitively (checksummed vs lowercase hex)
    pub fn same_identity(&self, other: &OwnerAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for OwnerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Confidentiality codec output, stored verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedPayload(pub String);

impl SealedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// On-ledger record envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordEnvelope {
    /// Sealed payload
    #[serde(alias = "data")]
    pub sealed_payload: SealedPayload,
    /// Creation time, unix seconds
    #[serde(alias = "timestamp")]
    pub created_at: i64,
    /// Submitter
    pub owner: OwnerAddress,
    /// Material category
    pub category: Category,
    /// Workflow status
    #[serde(default)]
    pub status: RecordStatus,
}

/// A record as seen by callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record id (immutable)
    pub id: RecordId,
    /// Sealed payload (immutable)
    pub sealed_payload: SealedPayload,
    /// Submitter (immutable)
    pub owner: OwnerAddress,
    /// Material category (immutable)
    pub category: Category,
    /// Creation time, unix seconds (immutable)
    pub created_at: i64,
    /// Workflow status
    pub status: RecordStatus,
}

impl Record {
    /// Create a new pending record stamped with the current time
    pub fn new(
        id: RecordId,
        sealed_payload: SealedPayload,
        owner: OwnerAddress,
        category: Category,
    ) -> Self {
        Self {
            id,
            sealed_payload,
            owner,
            category,
            created_at: Utc::now().timestamp(),
            status: RecordStatus::Pending,
        }
    }

    /// Rebuild a record from its envelope and key-derived id
    pub fn from_envelope(id: RecordId, envelope: RecordEnvelope) -> Self {
        Self {
            id,
            sealed_payload: envelope.sealed_payload,
            owner: envelope.owner,
            category: envelope.category,
            created_at: envelope.created_at,
            status: envelope.status,
        }
    }

    /// Envelope written to the ledger
    pub fn to_envelope(&self) -> RecordEnvelope {
        RecordEnvelope {
            sealed_payload: self.sealed_payload.clone(),
            created_at: self.created_at,
            owner: self.owner.clone(),
            category: self.category,
            status: self.status,
        }
    }

    /// Serialize to wire bytes
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.to_envelope())
    }

    /// Deserialize from wire bytes
    pub fn from_bytes(id: RecordId, bytes: &[u8]) -> serde_json::Result<Self> {
        let envelope: RecordEnvelope = serde_json::from_slice(bytes)?;
        Ok(Self::from_envelope(id, envelope))
    }

    /// Whether `caller` owns this record
    pub fn is_owned_by(&self, caller: &OwnerAddress) -> bool {
        self.owner.same_identity(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::new(
            RecordId::new("r1"),
            SealedPayload("FHE-c2FtcGxl".to_string()),
            OwnerAddress::new("0xA"),
            Category::Plastic,
        )
    }

    #[test]
    fn test_generated_id_shape() {
        let id = RecordId::generate();
        let (millis, suffix) = id.as_str().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn test_wire_roundtrip() {
        let record = sample();
        let bytes = record.to_bytes().unwrap();
        let decoded = Record::from_bytes(record.id.clone(), &bytes).unwrap();
        assert_eq!(decoded, record);

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["category"], "Plastic");
        assert!(value.get("sealedPayload").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_legacy_field_names_accepted() {
        let legacy = br#"{"data":"FHE-eA==","timestamp":1700000000,"owner":"0xB","category":"Glass"}"#;
        let record = Record::from_bytes(RecordId::new("old"), legacy).unwrap();
        assert_eq!(record.sealed_payload.as_str(), "FHE-eA==");
        assert_eq!(record.created_at, 1_700_000_000);
        assert_eq!(record.status, RecordStatus::Pending);
        assert_eq!(record.category, Category::Glass);
    }

    #[test]
    fn test_owner_match_ignores_case() {
        let record = Record {
            owner: OwnerAddress::new("0xAbCdEf"),
            ..sample()
        };
        assert!(record.is_owned_by(&OwnerAddress::new("0xabcdef")));
        assert!(!record.is_owned_by(&OwnerAddress::new("0xabcde0")));
    }

    #[test]
    fn test_malformed_bytes_rejected() {
        assert!(Record::from_bytes(RecordId::new("bad"), b"\x00\x01not json").is_err());
        let wrong_category = br#"{"sealedPayload":"x","createdAt":1,"owner":"0xA","category":"Wood"}"#;
        assert!(Record::from_bytes(RecordId::new("bad"), wrong_category).is_err());
    }
}
