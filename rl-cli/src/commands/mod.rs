//! CLI Commands Module
//!
//! Command definitions for the record ledger CLI.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Confidential Record Ledger CLI
#[derive(Parser, Debug)]
#[command(name = "rl")]
#[command(author = "Rainbow City Foundation")]
#[command(version)]
#[command(about = "Confidential Record Ledger Command Line Interface")]
#[command(long_about = "A command-line tool for submitting, listing, reviewing and \
    disclosing sealed records on a shared key-value ledger.\n\n\
    Without --ledger-dir or --gateway-url the ledger lives in memory and is \
    lost when the command exits.")]
pub struct Cli {
    /// Local ledger directory (env: RL_LEDGER_DIR)
    #[arg(long, env = "RL_LEDGER_DIR", conflicts_with = "gateway_url")]
    pub ledger_dir: Option<PathBuf>,

    /// Contract gateway URL (env: RL_GATEWAY_URL)
    #[arg(long, env = "RL_GATEWAY_URL")]
    pub gateway_url: Option<String>,

    /// Ledger contract address (env: RL_CONTRACT_ADDRESS)
    #[arg(
        long,
        env = "RL_CONTRACT_ADDRESS",
        default_value = "0x0000000000000000000000000000000000000000"
    )]
    pub contract: String,

    /// File recording ids this client submitted (env: RL_ACK_JOURNAL);
    /// defaults to `.acknowledged` inside --ledger-dir
    #[arg(long, env = "RL_ACK_JOURNAL")]
    pub journal: Option<PathBuf>,

    /// Connected wallet address (env: RL_IDENTITY)
    #[arg(short, long, env = "RL_IDENTITY")]
    pub identity: Option<String>,

    /// Skip simulated decryption and processing delays
    #[arg(long)]
    pub no_latency: bool,

    /// Output format (json, table, plain)
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Table format (human-readable)
    #[default]
    Table,
    /// Plain text
    Plain,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all readable records, newest first
    List,

    /// Seal and submit a new record
    Submit(SubmitArgs),

    /// Move one of your pending records to processed or rejected
    Advance {
        /// Record id
        id: String,
        /// Target status (processed, rejected)
        status: String,
    },

    /// Issue a capability challenge to sign
    Challenge {
        /// Write the challenge JSON here for a later `disclose`
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Reveal a record's plaintext with a signed challenge
    Disclose(DiscloseArgs),

    /// Counters by status and category
    Stats,

    /// Restore index entries this client acknowledged but lost to a stale writer
    Reconcile {
        /// Extra record ids to restore, on top of the journal
        ids: Vec<String>,
    },
}

/// Arguments of `submit`
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Material category (Plastic, Paper, Glass, Metal, Organic, Hazardous)
    #[arg(short, long)]
    pub category: String,

    /// Free-form description, sealed as part of a record draft
    #[arg(short, long, conflicts_with = "payload")]
    pub description: Option<String>,

    /// Encoded image data to attach to the draft
    #[arg(long, requires = "description")]
    pub image_data: Option<String>,

    /// Raw payload text
    #[arg(short, long, conflicts_with = "file")]
    pub payload: Option<String>,

    /// Read the raw payload from a file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments of `disclose`
#[derive(Args, Debug)]
pub struct DiscloseArgs {
    /// Record id
    pub id: String,

    /// Wallet signature over the challenge message
    #[arg(short, long)]
    pub signature: String,

    /// Challenge JSON written by `challenge --out`; a fresh one is issued when omitted
    #[arg(long)]
    pub challenge: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_help() {
        let result = Cli::try_parse_from(["rl", "--help"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Table);
    }

    #[test]
    fn test_parse_submit() {
        let cli = Cli::try_parse_from([
            "rl",
            "--identity",
            "0xA",
            "submit",
            "--category",
            "Plastic",
            "--payload",
            "sample-image-bytes",
        ])
        .unwrap();
        match cli.command {
            Commands::Submit(args) => {
                assert_eq!(args.category, "Plastic");
                assert_eq!(args.payload.as_deref(), Some("sample-image-bytes"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.identity.as_deref(), Some("0xA"));
    }

    #[test]
    fn test_backends_conflict() {
        let result = Cli::try_parse_from([
            "rl",
            "--ledger-dir",
            "/tmp/l",
            "--gateway-url",
            "http://gw",
            "list",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_reconcile_ids() {
        let cli = Cli::try_parse_from(["rl", "--journal", "/tmp/acks", "reconcile", "r1", "r2"]).unwrap();
        assert_eq!(cli.journal, Some(PathBuf::from("/tmp/acks")));
        assert!(matches!(cli.command, Commands::Reconcile { ref ids } if ids == &["r1", "r2"]));

        let cli = Cli::try_parse_from(["rl", "reconcile"]).unwrap();
        assert!(matches!(cli.command, Commands::Reconcile { ref ids } if ids.is_empty()));
    }

    #[test]
    fn test_parse_advance() {
        let cli = Cli::try_parse_from(["rl", "-f", "json", "advance", "r1", "processed"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Advance { ref status, .. } if status == "processed"));
    }
}
