//! Backend Configuration
//!
//! Selects and opens the ledger backend a process talks to.
//! Supports loading from environment variables with the RL_ prefix.

use rl_core::{LedgerClient, MemoryLedger};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::backend::{GatewayLedger, LocalLedger};
use crate::error::{StoreError, StoreResult};

/// Ledger backend selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Process-local, lost on exit
    Memory,
    /// One file per key under a directory
    Local { path: PathBuf },
    /// Contract gateway over HTTP
    Gateway {
        url: String,
        contract_address: String,
        #[serde(default = "default_gateway_timeout")]
        timeout_secs: u64,
    },
}

fn default_gateway_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl BackendConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - RL_GATEWAY_URL: contract gateway base URL (selects the gateway backend)
    /// - RL_CONTRACT_ADDRESS: contract address for the gateway
    /// - RL_GATEWAY_TIMEOUT_SECS: gateway request timeout
    /// - RL_LEDGER_DIR: ledger directory (selects the local backend)
    ///
    /// The gateway wins when both are set; with neither, the memory backend
    /// is used.
    pub fn from_env() -> Self {
        if let Ok(url) = env::var("RL_GATEWAY_URL") {
            return Self::Gateway {
                url,
                contract_address: env::var("RL_CONTRACT_ADDRESS").unwrap_or_default(),
                timeout_secs: env::var("RL_GATEWAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(default_gateway_timeout()),
            };
        }
        if let Ok(path) = env::var("RL_LEDGER_DIR") {
            return Self::Local { path: path.into() };
        }
        Self::Memory
    }

    /// Backend name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Memory => "memory",
            BackendConfig::Local { .. } => "local",
            BackendConfig::Gateway { .. } => "gateway",
        }
    }

    /// Open the configured backend
    pub async fn open(&self) -> StoreResult<Arc<dyn LedgerClient>> {
        let ledger: Arc<dyn LedgerClient> = match self {
            BackendConfig::Memory => Arc::new(MemoryLedger::new()),
            BackendConfig::Local { path } => Arc::new(LocalLedger::new(path).await?),
            BackendConfig::Gateway {
                url,
                contract_address,
                timeout_secs,
            } => Arc::new(GatewayLedger::with_timeout(
                url.clone(),
                contract_address.clone(),
                *timeout_secs,
            )?),
        };

        info!(backend = self.kind(), "ledger backend opened");
        Ok(ledger)
    }

    pub fn validate(&self) -> StoreResult<()> {
        match self {
            BackendConfig::Gateway {
                contract_address, ..
            } if contract_address.trim().is_empty() => Err(StoreError::Configuration(
                "gateway backend requires a contract address".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_local() {
        let dir = TempDir::new().unwrap();
        let config = BackendConfig::Local {
            path: dir.path().join("ledger"),
        };
        let ledger = config.open().await.unwrap();
        assert_eq!(ledger.backend_type(), "local");
        ledger.write("k", b"v").await.unwrap();
        assert!(dir.path().join("ledger").join("k.val").exists());
    }

    #[tokio::test]
    async fn test_open_memory() {
        let ledger = BackendConfig::default().open().await.unwrap();
        assert_eq!(ledger.backend_type(), "memory");
    }

    #[test]
    fn test_gateway_requires_address() {
        let config = BackendConfig::Gateway {
            url: "http://localhost:8545".to_string(),
            contract_address: String::new(),
            timeout_secs: 5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_shape() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"type":"local","path":"/var/lib/rl"}"#).unwrap();
        assert_eq!(config.kind(), "local");
    }
}
