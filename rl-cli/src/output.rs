//! Output Formatting
//!
//! Utilities for formatting CLI output in various formats.

use chrono::DateTime;
use rl_core::{CapabilityChallenge, LedgerStats, Record, RecordDraft, RecordStatus};
use serde::Serialize;

use crate::commands::OutputFormat;

/// Disclosed plaintext, as printed
#[derive(Debug, Clone, Serialize)]
pub struct Disclosure {
    pub record_id: String,
    pub bytes: usize,
    /// Plaintext when it is valid UTF-8
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Parsed draft when the plaintext is a record draft
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<RecordDraft>,
}

impl Disclosure {
    pub fn new(record_id: impl Into<String>, plaintext: &[u8]) -> Self {
        Self {
            record_id: record_id.into(),
            bytes: plaintext.len(),
            text: std::str::from_utf8(plaintext).ok().map(str::to_string),
            draft: RecordDraft::from_payload(plaintext).ok(),
        }
    }
}

/// Issued challenge, as printed
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeView<'a> {
    pub challenge: &'a CapabilityChallenge,
    pub digest: String,
    pub message: String,
    pub window_end: i64,
}

impl<'a> ChallengeView<'a> {
    pub fn new(challenge: &'a CapabilityChallenge) -> Self {
        Self {
            challenge,
            digest: challenge.digest(),
            message: challenge.message(),
            window_end: challenge.window_end(),
        }
    }
}

/// Print as JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error formatting JSON: {}", e),
    }
}

/// Print a record listing
pub fn print_records(records: &[Record], format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(records),
        OutputFormat::Plain => {
            for record in records {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    record.id, record.category, record.status, record.owner, record.created_at
                );
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!("No records.");
                return;
            }
            println!(
                "{:<24} {:<10} {:<10} {:<20} {:<44}",
                "ID", "CATEGORY", "STATUS", "CREATED", "OWNER"
            );
            print_separator(112);
            for record in records {
                println!(
                    "{:<24} {:<10} {:<10} {:<20} {:<44}",
                    record.id.as_str(),
                    record.category.as_str(),
                    record.status.as_str(),
                    format_time(record.created_at),
                    record.owner.as_str()
                );
            }
        }
    }
}

/// Print a single record
pub fn print_record(title: &str, record: &Record, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Plain => println!("{}", record.id),
        OutputFormat::Table => {
            println!("{}", title);
            println!("{}", "=".repeat(title.len()));
            print_row("ID:", record.id.as_str());
            print_row("Category:", record.category.as_str());
            print_row("Status:", record.status.as_str());
            print_row("Owner:", record.owner.as_str());
            print_row("Created:", &format_time(record.created_at));
            print_row("Sealed bytes:", &record.sealed_payload.len().to_string());
        }
    }
}

/// Print ledger statistics
pub fn print_stats(stats: &LedgerStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(stats),
        OutputFormat::Table | OutputFormat::Plain => {
            println!("Ledger Statistics");
            println!("=================");
            print_row("Total:", &stats.total.to_string());
            for status in RecordStatus::ALL {
                let count = match status {
                    RecordStatus::Pending => stats.pending,
                    RecordStatus::Processed => stats.processed,
                    RecordStatus::Rejected => stats.rejected,
                };
                print_row(
                    &format!("{}:", status),
                    &format!("{} ({:.1}%)", count, stats.status_share(status)),
                );
            }
            println!();
            println!("By category:");
            for (category, count) in &stats.by_category {
                println!("  {:<12} {}", category.as_str(), count);
            }
        }
    }
}

/// Print an issued challenge
pub fn print_challenge(challenge: &CapabilityChallenge, format: OutputFormat) {
    let view = ChallengeView::new(challenge);
    match format {
        OutputFormat::Json => print_json(&view),
        OutputFormat::Plain => println!("{}", view.message),
        OutputFormat::Table => {
            println!("Capability Challenge");
            println!("====================");
            print_row("Contract:", &challenge.contract_address);
            print_row("Chain id:", &challenge.chain_id.to_string());
            print_row("Valid from:", &format_time(challenge.start_timestamp));
            print_row("Valid until:", &format_time(view.window_end));
            print_row("Digest:", &view.digest);
            println!();
            println!("Sign this message with the connected wallet:");
            println!("{}", view.message);
        }
    }
}

/// Print disclosed plaintext
pub fn print_disclosure(disclosure: &Disclosure, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(disclosure),
        OutputFormat::Plain => match &disclosure.text {
            Some(text) => println!("{}", text),
            None => println!("<{} bytes of binary plaintext>", disclosure.bytes),
        },
        OutputFormat::Table => {
            println!("Disclosed Record");
            println!("================");
            print_row("ID:", &disclosure.record_id);
            print_row("Bytes:", &disclosure.bytes.to_string());
            match (&disclosure.draft, &disclosure.text) {
                (Some(draft), _) => {
                    print_row("Category:", draft.category.as_str());
                    print_row("Description:", &draft.description);
                    print_row("Image data:", &format!("{} chars", draft.image_data.len()));
                }
                (None, Some(text)) => print_row("Plaintext:", text),
                (None, None) => print_row("Plaintext:", "<binary>"),
            }
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("Warning: {}", message);
}

/// Print a table row
pub fn print_row(key: &str, value: &str) {
    println!("{:<14} {}", key, value);
}

fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Unix seconds as `YYYY-MM-DD HH:MM:SS` UTC
pub fn format_time(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}
