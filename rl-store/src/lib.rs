//! Record Ledger Backends
//!
//! `LedgerClient` implementations for the confidential record ledger, plus
//! the logging setup shared by its binaries.
//!
//! # Backends
//!
//! - **Local filesystem**: one file per key, atomic replace; development and
//!   single-host deployments
//! - **Gateway**: HTTP adapter to a gateway fronting the ledger contract
//! - **Memory**: re-exported from `rl-core`, process-local
//!
//! # Usage
//!
//! ```ignore
//! use rl_core::{LedgerSession, SessionConfig};
//! use rl_store::BackendConfig;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let ledger = BackendConfig::from_env().open().await?;
//!     let session = LedgerSession::new(ledger, SessionConfig::from_env())?;
//!
//!     for record in session.list_records().await? {
//!         println!("{} {} {}", record.id, record.category, record.status);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod telemetry;

pub use backend::{GatewayLedger, LocalLedger};
pub use config::BackendConfig;
pub use error::{StoreError, StoreResult};
pub use rl_core::MemoryLedger;
pub use telemetry::{init_logging, LogConfig, LogFormat, LogLevel};
