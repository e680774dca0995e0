//! Record Ledger Core - Confidential Record Ledger
//!
//! Multiple independent clients submit, index and review sealed records on a
//! shared key-value ledger that offers only per-key `read` / `write`: no
//! compare-and-swap, no cross-key transactions, no locks.
//!
//! # Key Principles
//!
//! 1. **No lost ids**: once a submission reports success its id stays in the
//!    shared index (see [`ledger::index`] for the append protocol)
//! 2. **Sealed at rest**: payloads reach the ledger only after `seal`
//! 3. **Consent-gated disclosure**: `unseal` runs only after the capability
//!    check passes
//! 4. **Monotonic workflow**: `pending` moves once to a terminal status, by
//!    the owner only
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LedgerSession                          │
//! │     list · submit · advance_status · disclose · lifecycle     │
//! └───────┬──────────────┬───────────────┬───────────────┬────────┘
//!         │              │               │               │
//!   IndexManager    RecordStore    WorkflowEngine   DisclosureGate
//!   record_keys     record_<id>     (RecordStore)   codec · verifier
//!         │              │
//! ┌───────┴──────────────┴───────────────────────────────────────┐
//! │                LedgerClient (read / write)                    │
//! │        MemoryLedger · LocalLedger · GatewayLedger             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Core Types
//!
//! - [`Record`]: sealed payload plus owner, category, creation time, status
//! - [`RecordStatus`]: `pending` / `processed` / `rejected`
//! - [`CapabilityChallenge`]: consent message and validity window
//! - [`SessionContext`]: caller identity and challenge, passed explicitly

pub mod cancel;
pub mod config;
pub mod crypto;
pub mod disclosure;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod session;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use error::{LedgerError, LedgerResult};

pub use types::{
    Category, LedgerStats, OwnerAddress, Record, RecordDraft, RecordEnvelope, RecordId,
    RecordStatus, SealedPayload,
};

pub use ledger::{
    AppendReceipt, BatchRead, IndexConfig, IndexManager, LedgerClient, MemoryLedger, RecordStore,
    INDEX_KEY,
};

pub use crypto::{
    CapabilityChallenge, CapabilityProof, ConfidentialityCodec, SimulatedFheCodec,
};

pub use cancel::{run_bounded, CancelToken};
pub use config::SessionConfig;
pub use disclosure::{CapabilityVerifier, ConsentVerifier, DisclosureGate};
pub use lifecycle::{LifecycleReporter, OperationEvent, OperationKind, OperationPhase};
pub use session::{LedgerSession, SessionContext};
pub use workflow::WorkflowEngine;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Wire format version of record envelopes and the index
pub const WIRE_VERSION: &str = "v1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(WIRE_VERSION, "v1");
    }
}
