//! Record Ledger CLI
//!
//! Command-line interface for the confidential record ledger: submit sealed
//! records, list and review them, and disclose plaintext with a signed
//! capability challenge.
//!
//! # Usage
//!
//! ```text
//! rl [OPTIONS] <COMMAND>
//!
//! Commands:
//!   list        List all readable records, newest first
//!   submit      Seal and submit a new record
//!   advance     Move one of your pending records to processed or rejected
//!   challenge   Issue a capability challenge to sign
//!   disclose    Reveal a record's plaintext with a signed challenge
//!   stats       Counters by status and category
//!   reconcile   Restore journaled or given ids lost to a stale writer
//!
//! Options:
//!       --ledger-dir <DIR>     Local ledger directory
//!       --gateway-url <URL>    Contract gateway URL
//!       --contract <ADDRESS>   Ledger contract address
//!       --journal <FILE>       Acknowledged-id journal [default: <ledger-dir>/.acknowledged]
//!   -i, --identity <ADDRESS>   Connected wallet address
//!   -f, --format <FORMAT>      Output format (json, table, plain) [default: table]
//!   -v, --verbose              Enable verbose output
//! ```
//!
//! # Examples
//!
//! ## Submit a record
//! ```text
//! rl --ledger-dir ./ledger -i 0xA submit -c Plastic -d "two bottles"
//! ```
//!
//! ## Disclose it
//! ```text
//! rl --ledger-dir ./ledger challenge --out challenge.json
//! rl --ledger-dir ./ledger -i 0xA disclose <ID> -s <SIGNATURE> --challenge challenge.json
//! ```

pub mod commands;
pub mod error;
pub mod handler;
pub mod journal;
pub mod output;

pub use commands::{Cli, Commands, OutputFormat};
pub use error::{CliError, CliResult};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
