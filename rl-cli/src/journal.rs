//! Acknowledgement Journal
//!
//! Ids of records this client submitted, one per line, appended after each
//! acknowledged submission. The index only remembers acknowledgements for
//! the life of a session; `rl reconcile` reads them back from here so a
//! later invocation can restore ids a stale writer dropped.

use rl_core::RecordId;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::CliResult;

/// File name used inside a local ledger directory
pub const DEFAULT_JOURNAL_FILE: &str = ".acknowledged";

/// Append-only list of acknowledged record ids
#[derive(Debug, Clone)]
pub struct AckJournal {
    path: PathBuf,
}

impl AckJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Journal kept beside a local ledger
    pub fn in_ledger_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_JOURNAL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an acknowledged id
    pub async fn record(&self, id: &RecordId) -> CliResult<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", id).as_bytes()).await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Every recorded id, first occurrence order; a missing file is empty
    pub async fn load(&self) -> CliResult<Vec<RecordId>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids: Vec<RecordId> = Vec::new();
        for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let id = RecordId::new(line);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}
