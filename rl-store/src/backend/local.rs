//! Local Filesystem Ledger
//!
//! Implements `LedgerClient` with one file per key under a base directory.
//! Suitable for development, demos and single-host deployments where several
//! processes share one ledger directory.
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a reader sees either the previous value or the new one, never a
//! torn write. Like the contract, there is no cross-key atomicity.

use async_trait::async_trait;
use rl_core::{LedgerClient, LedgerError, LedgerResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

const VALUE_EXTENSION: &str = "val";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File-per-key ledger
pub struct LocalLedger {
    /// Base directory for values
    base_path: PathBuf,
}

impl LocalLedger {
    /// Open (and create if needed) a ledger directory
    pub async fn new(base_path: impl AsRef<Path>) -> StoreResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)
            .await
            .map_err(|e| StoreError::io(&base_path, e))?;

        info!("Initialized local ledger at {:?}", base_path);

        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// File holding the value of `key`
    fn value_path(&self, key: &str) -> PathBuf {
        self.base_path
            .join(format!("{}.{}", encode_key(key), VALUE_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.base_path
            .join(format!(".{}.{}.{}.tmp", encode_key(key), std::process::id(), n))
    }
}

/// Map a ledger key to a file name: `[A-Za-z0-9_-]` pass through, every
/// other byte becomes `%XX`. Injective, so distinct keys never share a file.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

#[async_trait]
impl LedgerClient for LocalLedger {
    async fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let path = self.value_path(key);
        match fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => {
                debug!(key, bytes = bytes.len(), "local ledger read");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::LedgerUnavailable(format!(
                "failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    async fn write(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        let path = self.value_path(key);
        let temp = self.temp_path(key);

        let result = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(value).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp, &path).await
        }
        .await;

        if let Err(e) = result {
            let _ = fs::remove_file(&temp).await;
            return Err(LedgerError::write_failed(key, e.to_string()));
        }

        debug!(key, bytes = value.len(), "local ledger write");
        Ok(())
    }

    async fn is_available(&self) -> LedgerResult<bool> {
        if !self.base_path.exists() {
            return Ok(false);
        }

        // Try to write a probe file
        let probe = self.base_path.join(".health_check");
        match fs::write(&probe, b"health_check").await {
            Ok(_) => {
                let _ = fs::remove_file(&probe).await;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    fn backend_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_ledger() -> (LocalLedger, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let ledger = LocalLedger::new(temp_dir.path()).await.unwrap();
        (ledger, temp_dir)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let (ledger, _temp_dir) = create_test_ledger().await;

        assert_eq!(ledger.read("record_keys").await.unwrap(), None);
        ledger.write("record_keys", br#"["r1"]"#).await.unwrap();
        assert_eq!(
            ledger.read("record_keys").await.unwrap(),
            Some(br#"["r1"]"#.to_vec())
        );

        ledger.write("record_keys", br#"["r1","r2"]"#).await.unwrap();
        assert_eq!(
            ledger.read("record_keys").await.unwrap(),
            Some(br#"["r1","r2"]"#.to_vec())
        );
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        {
            let ledger = LocalLedger::new(temp_dir.path()).await.unwrap();
            ledger.write("record_1-abc", b"body").await.unwrap();
        }
        let reopened = LocalLedger::new(temp_dir.path()).await.unwrap();
        assert_eq!(reopened.read("record_1-abc").await.unwrap(), Some(b"body".to_vec()));
    }

    #[tokio::test]
    async fn test_hostile_keys_stay_inside_base() {
        let (ledger, temp_dir) = create_test_ledger().await;
        ledger.write("../escape", b"x").await.unwrap();
        ledger.write("a/b", b"y").await.unwrap();

        assert_eq!(ledger.read("../escape").await.unwrap(), Some(b"x".to_vec()));
        assert_eq!(ledger.read("a/b").await.unwrap(), Some(b"y".to_vec()));
        assert!(!temp_dir.path().parent().unwrap().join("escape.val").exists());
    }

    #[test]
    fn test_key_encoding_is_injective() {
        assert_eq!(encode_key("record_1700-ab12"), "record_1700-ab12");
        assert_ne!(encode_key("a.b"), encode_key("a%2Eb"));
        assert_ne!(encode_key("a/b"), encode_key("a_b"));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let (ledger, temp_dir) = create_test_ledger().await;
        for n in 0..5 {
            ledger.write("k", format!("v{}", n).as_bytes()).await.unwrap();
        }

        let mut entries = fs::read_dir(temp_dir.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        assert_eq!(names, vec!["k.val".to_string()]);
    }

    #[tokio::test]
    async fn test_health_check() {
        let (ledger, _temp_dir) = create_test_ledger().await;
        assert!(ledger.is_available().await.unwrap());
        assert_eq!(ledger.backend_type(), "local");
    }
}
