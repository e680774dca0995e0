//! Record Ledger Types
//!
//! - Records and their on-ledger envelope
//! - Workflow status and material category
//! - Submission drafts and listing statistics

pub mod category;
pub mod draft;
pub mod record;
pub mod stats;
pub mod status;

pub use category::Category;
pub use draft::RecordDraft;
pub use record::{OwnerAddress, Record, RecordEnvelope, RecordId, SealedPayload};
pub use stats::LedgerStats;
pub use status::RecordStatus;
