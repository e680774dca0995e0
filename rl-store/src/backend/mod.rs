//! Ledger Backends
//!
//! `LedgerClient` implementations beyond the in-memory one in `rl-core`.

pub mod gateway;
pub mod local;

pub use gateway::GatewayLedger;
pub use local::LocalLedger;
