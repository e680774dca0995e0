//! Ledger key layout

use crate::types::RecordId;

/// Shared key holding the JSON array of all record ids
pub const INDEX_KEY: &str = "record_keys";

/// Prefix of per-record body keys
pub const RECORD_KEY_PREFIX: &str = "record_";

/// Key of a record body
pub fn record_key(id: &RecordId) -> String {
    format!("{}{}", RECORD_KEY_PREFIX, id)
}
