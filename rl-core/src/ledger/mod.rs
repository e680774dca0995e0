//! Ledger Module
//!
//! Everything that touches the external key-value ledger:
//! - Ledger client trait (the adapter boundary) and an in-memory backend
//! - Key layout
//! - Record Store (per-record bodies)
//! - Record Index (shared id set with conflict resolution)

pub mod client;
pub mod index;
pub mod keys;
pub mod memory;
pub mod record_store;

pub use client::LedgerClient;
pub use index::{AppendReceipt, IndexConfig, IndexManager};
pub use keys::{record_key, INDEX_KEY, RECORD_KEY_PREFIX};
pub use memory::MemoryLedger;
pub use record_store::{BatchRead, RecordStore};
