//! Command Handlers
//!
//! Handler functions for CLI commands.

use rl_core::{
    CapabilityChallenge, CapabilityProof, Category, LedgerSession, OwnerAddress, RecordDraft,
    RecordId, RecordStatus, SessionConfig, SessionContext,
};
use rl_store::BackendConfig;
use std::path::Path;
use tracing::debug;

use crate::commands::{Cli, Commands, DiscloseArgs, SubmitArgs};
use crate::error::{CliError, CliResult};
use crate::journal::AckJournal;
use crate::output::{self, Disclosure};

/// Backend selected by the CLI flags
pub fn backend_config(cli: &Cli) -> BackendConfig {
    match (&cli.gateway_url, &cli.ledger_dir) {
        (Some(url), _) => BackendConfig::Gateway {
            url: url.clone(),
            contract_address: cli.contract.clone(),
            timeout_secs: 30,
        },
        (None, Some(dir)) => BackendConfig::Local { path: dir.clone() },
        (None, None) => BackendConfig::Memory,
    }
}

/// Session configuration: environment first, flags on top
pub fn session_config(cli: &Cli) -> SessionConfig {
    let mut config = SessionConfig::from_env();
    config.contract_address = cli.contract.clone();
    if cli.no_latency {
        config.decrypt_latency_ms = 0;
        config.processing_latency_ms = 0;
    }
    config
}

/// Acknowledgement journal selected by the CLI flags
pub fn journal(cli: &Cli) -> Option<AckJournal> {
    match (&cli.journal, &cli.ledger_dir) {
        (Some(path), _) => Some(AckJournal::new(path.clone())),
        (None, Some(dir)) if cli.gateway_url.is_none() => Some(AckJournal::in_ledger_dir(dir)),
        _ => None,
    }
}

/// Run the CLI with parsed arguments
pub async fn run(cli: Cli) -> CliResult<()> {
    let backend = backend_config(&cli);
    backend.validate()?;
    let config = session_config(&cli);
    config.validate()?;

    if let Commands::Challenge { out } = &cli.command {
        return handle_challenge(&config, out.as_deref(), &cli);
    }

    debug!(backend = backend.kind(), "opening ledger");
    let ledger = backend.open().await?;
    let session = LedgerSession::new(ledger, config)?;
    let identity = cli.identity.clone().map(OwnerAddress::new);
    let journal = journal(&cli);

    match &cli.command {
        Commands::List => handle_list(&session, &cli).await,
        Commands::Submit(args) => {
            handle_submit(&session, identity, args, journal.as_ref(), &cli).await
        }
        Commands::Advance { id, status } => {
            handle_advance(&session, identity, id, status, &cli).await
        }
        Commands::Disclose(args) => handle_disclose(&session, identity, args, &cli).await,
        Commands::Stats => handle_stats(&session, &cli).await,
        Commands::Reconcile { ids } => handle_reconcile(&session, ids, journal.as_ref()).await,
        Commands::Challenge { .. } => Ok(()),
    }
}

async fn handle_list(session: &LedgerSession, cli: &Cli) -> CliResult<()> {
    let records = session.list_records().await?;
    output::print_records(&records, cli.format);
    Ok(())
}

/// Plaintext payload and category described by `submit` arguments
pub fn submission_payload(args: &SubmitArgs) -> CliResult<(Category, Vec<u8>)> {
    let category: Category = args
        .category
        .parse()
        .map_err(CliError::invalid_arg)?;

    let payload = match (&args.description, &args.payload, &args.file) {
        (Some(description), _, _) => {
            let mut draft = RecordDraft::new(category, description.clone());
            if let Some(image_data) = &args.image_data {
                draft = draft.with_image_data(image_data.clone());
            }
            draft.to_payload()?
        }
        (None, Some(text), _) => text.as_bytes().to_vec(),
        (None, None, Some(path)) => std::fs::read(path)?,
        (None, None, None) => {
            return Err(CliError::invalid_arg(
                "one of --description, --payload or --file is required",
            ))
        }
    };

    Ok((category, payload))
}

async fn handle_submit(
    session: &LedgerSession,
    identity: Option<OwnerAddress>,
    args: &SubmitArgs,
    journal: Option<&AckJournal>,
    cli: &Cli,
) -> CliResult<()> {
    let (category, payload) = submission_payload(args)?;
    let ctx = session.context_for(identity);
    let record = session.submit_record(&ctx, category, &payload).await?;
    if let Some(journal) = journal {
        // The record is already acknowledged; a journal failure only costs reconcile coverage
        if let Err(e) = journal.record(&record.id).await {
            output::print_warning(&format!(
                "could not record {} in {}: {}",
                record.id,
                journal.path().display(),
                e
            ));
        }
    }
    output::print_record("Record Submitted", &record, cli.format);
    Ok(())
}

async fn handle_advance(
    session: &LedgerSession,
    identity: Option<OwnerAddress>,
    id: &str,
    status: &str,
    cli: &Cli,
) -> CliResult<()> {
    let target: RecordStatus = status.parse().map_err(CliError::invalid_arg)?;
    let ctx = session.context_for(identity);
    let record = session
        .advance_status(&ctx, &RecordId::new(id), target)
        .await?;
    output::print_record("Status Updated", &record, cli.format);
    Ok(())
}

fn handle_challenge(config: &SessionConfig, out: Option<&Path>, cli: &Cli) -> CliResult<()> {
    let challenge = CapabilityChallenge::issue(
        config.contract_address.clone(),
        config.chain_id,
        config.window_days,
    );
    if let Some(path) = out {
        save_challenge(&challenge, path)?;
        output::print_success(&format!("Challenge written to {}", path.display()));
    }
    output::print_challenge(&challenge, cli.format);
    Ok(())
}

/// Persist a challenge for a later `disclose --challenge`
pub fn save_challenge(challenge: &CapabilityChallenge, path: &Path) -> CliResult<()> {
    let json = serde_json::to_string_pretty(challenge)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a challenge written by `save_challenge`
pub fn load_challenge(path: &Path) -> CliResult<CapabilityChallenge> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

async fn handle_disclose(
    session: &LedgerSession,
    identity: Option<OwnerAddress>,
    args: &DiscloseArgs,
    cli: &Cli,
) -> CliResult<()> {
    let ctx = match &args.challenge {
        Some(path) => SessionContext::with_challenge(identity, load_challenge(path)?),
        None => {
            output::print_warning("no --challenge given; binding the signature to a fresh challenge");
            session.context_for(identity)
        }
    };
    let proof = CapabilityProof::new(args.signature.clone(), ctx.challenge());
    let id = RecordId::new(args.id.clone());

    let plaintext = session.disclose(&ctx, &id, &proof).await?;
    output::print_disclosure(&Disclosure::new(id.as_str(), &plaintext), cli.format);
    Ok(())
}

async fn handle_stats(session: &LedgerSession, cli: &Cli) -> CliResult<()> {
    let stats = session.stats().await?;
    output::print_stats(&stats, cli.format);
    Ok(())
}

async fn handle_reconcile(
    session: &LedgerSession,
    explicit: &[String],
    journal: Option<&AckJournal>,
) -> CliResult<()> {
    let mut ids: Vec<RecordId> = match journal {
        Some(journal) => journal.load().await?,
        None => Vec::new(),
    };
    for id in explicit.iter().map(RecordId::new) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let restored = if ids.is_empty() {
        session.reconcile_index().await?
    } else {
        session.reconcile_ids(&ids).await?
    };
    output::print_success(&format!("Index reconciled, {} id(s) restored", restored));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_backend_selection() {
        let cli = parse(&["rl", "--ledger-dir", "/tmp/ledger", "list"]);
        assert_eq!(backend_config(&cli).kind(), "local");

        let cli = parse(&["rl", "--gateway-url", "http://gw:8545", "list"]);
        assert_eq!(backend_config(&cli).kind(), "gateway");
    }

    #[test]
    fn test_submission_payload_variants() {
        let cli = parse(&["rl", "submit", "-c", "plastic", "-p", "sample-image-bytes"]);
        let Commands::Submit(args) = &cli.command else {
            panic!("expected submit");
        };
        let (category, payload) = submission_payload(args).unwrap();
        assert_eq!(category, Category::Plastic);
        assert_eq!(payload, b"sample-image-bytes");

        let cli = parse(&["rl", "submit", "-c", "Glass", "-d", "bottles", "--image-data", "AA=="]);
        let Commands::Submit(args) = &cli.command else {
            panic!("expected submit");
        };
        let (_, payload) = submission_payload(args).unwrap();
        let draft = RecordDraft::from_payload(&payload).unwrap();
        assert_eq!(draft.description, "bottles");
        assert_eq!(draft.image_data, "AA==");

        let cli = parse(&["rl", "submit", "-c", "Wood", "-p", "x"]);
        let Commands::Submit(args) = &cli.command else {
            panic!("expected submit");
        };
        assert_eq!(submission_payload(args).unwrap_err().exit_code(), 2);
    }

    async fn open_local(path: &Path) -> LedgerSession {
        let ledger = BackendConfig::Local { path: path.to_path_buf() }
            .open()
            .await
            .unwrap();
        LedgerSession::new(ledger, SessionConfig::immediate()).unwrap()
    }

    #[tokio::test]
    async fn test_reconcile_restores_journaled_submission() {
        let dir = TempDir::new().unwrap();
        let ledger_dir = dir.path().to_str().unwrap();

        run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--identity", "0xA", "--no-latency",
            "submit", "-c", "Paper", "-p", "receipts",
        ]))
        .await
        .unwrap();

        let id = open_local(dir.path()).await.list_records().await.unwrap()[0].id.clone();
        let journaled = AckJournal::in_ledger_dir(dir.path()).load().await.unwrap();
        assert_eq!(journaled, vec![id.clone()]);

        // A stale writer that never saw the submission replaces the index.
        let ledger = rl_store::LocalLedger::new(dir.path()).await.unwrap();
        rl_core::LedgerClient::write(&ledger, rl_core::INDEX_KEY, br#"["other"]"#)
            .await
            .unwrap();
        assert!(open_local(dir.path()).await.list_records().await.unwrap().is_empty());

        run(parse(&["rl", "--ledger-dir", ledger_dir, "--no-latency", "reconcile"]))
            .await
            .unwrap();
        let listed = open_local(dir.path()).await.list_records().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);

        let err = run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--no-latency", "reconcile", "no-such-id",
        ]))
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 21);
    }

    #[test]
    fn test_journal_selection() {
        let cli = parse(&["rl", "--ledger-dir", "/tmp/ledger", "list"]);
        assert_eq!(
            journal(&cli).unwrap().path(),
            Path::new("/tmp/ledger/.acknowledged")
        );
        let cli = parse(&["rl", "--gateway-url", "http://gw:8545", "list"]);
        assert!(journal(&cli).is_none());
        let cli = parse(&["rl", "--gateway-url", "http://gw:8545", "--journal", "/tmp/acks", "list"]);
        assert_eq!(journal(&cli).unwrap().path(), Path::new("/tmp/acks"));
    }

    #[test]
    fn test_challenge_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("challenge.json");
        let challenge = CapabilityChallenge::issue("0xC0ntract", 31337, 30);
        save_challenge(&challenge, &path).unwrap();
        assert_eq!(load_challenge(&path).unwrap(), challenge);
    }

    #[tokio::test]
    async fn test_commands_against_local_ledger() {
        let dir = TempDir::new().unwrap();
        let ledger_dir = dir.path().to_str().unwrap();
        let challenge_path = dir.path().join("challenge.json");
        let challenge_file = challenge_path.to_str().unwrap();

        run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--identity", "0xA", "--no-latency",
            "submit", "-c", "Metal", "-p", "cans",
        ]))
        .await
        .unwrap();

        let ledger = BackendConfig::Local { path: dir.path().to_path_buf() }
            .open()
            .await
            .unwrap();
        let session = LedgerSession::new(ledger, SessionConfig::immediate()).unwrap();
        let records = session.list_records().await.unwrap();
        assert_eq!(records.len(), 1);
        let id = records[0].id.to_string();

        let err = run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--identity", "0xB", "--no-latency",
            "advance", &id, "processed",
        ]))
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 23);

        run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--identity", "0xA", "--no-latency",
            "advance", &id, "processed",
        ]))
        .await
        .unwrap();

        run(parse(&["rl", "--ledger-dir", ledger_dir, "challenge", "--out", challenge_file]))
            .await
            .unwrap();
        run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--identity", "0xB", "--no-latency",
            "disclose", &id, "--signature", "0xsig", "--challenge", challenge_file,
        ]))
        .await
        .unwrap();

        let err = run(parse(&[
            "rl", "--ledger-dir", ledger_dir, "--no-latency", "advance", &id, "rejected",
        ]))
        .await
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
