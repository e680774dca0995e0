//! Session Configuration
//!
//! Ledger contract coordinates, index conflict tuning, deadlines and the
//! simulated latencies of the confidentiality backend.
//! Supports loading from environment variables with the RL_ prefix.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::error::{LedgerError, LedgerResult};
use crate::ledger::IndexConfig;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Ledger contract address (bound into the capability challenge)
    #[serde(default = "default_contract_address")]
    pub contract_address: String,
    /// Chain id (bound into the capability challenge)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Disclosure window length in days
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    /// Index append retries after the first attempt
    #[serde(default = "default_index_retries")]
    pub index_append_retries: u32,
    /// Verification reads after an appended id is first observed
    #[serde(default = "default_index_confirmations")]
    pub index_confirmations: u32,
    /// Spacing of verification reads in milliseconds
    #[serde(default = "default_confirmation_interval_ms")]
    pub confirmation_interval_ms: u64,
    /// Hard deadline for a submission in seconds
    #[serde(default = "default_submit_timeout")]
    pub submit_timeout_secs: u64,
    /// Hard deadline for a disclosure in seconds
    #[serde(default = "default_disclose_timeout")]
    pub disclose_timeout_secs: u64,
    /// Simulated decryption delay in milliseconds
    #[serde(default = "default_decrypt_latency_ms")]
    pub decrypt_latency_ms: u64,
    /// Simulated processing delay before a status transition in milliseconds
    #[serde(default = "default_processing_latency_ms")]
    pub processing_latency_ms: u64,
}

fn default_contract_address() -> String {
    "0x0000000000000000000000000000000000000000".to_string()
}

fn default_chain_id() -> u64 {
    31337
}

fn default_window_days() -> u32 {
    30
}

fn default_index_retries() -> u32 {
    5
}

fn default_index_confirmations() -> u32 {
    1
}

fn default_confirmation_interval_ms() -> u64 {
    250
}

fn default_submit_timeout() -> u64 {
    120
}

fn default_disclose_timeout() -> u64 {
    60
}

fn default_decrypt_latency_ms() -> u64 {
    1500
}

fn default_processing_latency_ms() -> u64 {
    3000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            contract_address: default_contract_address(),
            chain_id: default_chain_id(),
            window_days: default_window_days(),
            index_append_retries: default_index_retries(),
            index_confirmations: default_index_confirmations(),
            confirmation_interval_ms: default_confirmation_interval_ms(),
            submit_timeout_secs: default_submit_timeout(),
            disclose_timeout_secs: default_disclose_timeout(),
            decrypt_latency_ms: default_decrypt_latency_ms(),
            processing_latency_ms: default_processing_latency_ms(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - RL_CONTRACT_ADDRESS: ledger contract address
    /// - RL_CHAIN_ID: chain id
    /// - RL_WINDOW_DAYS: disclosure window in days
    /// - RL_INDEX_RETRIES: index append retries
    /// - RL_INDEX_CONFIRMATIONS: verification reads after an append
    /// - RL_CONFIRMATION_INTERVAL_MS: spacing of verification reads
    /// - RL_SUBMIT_TIMEOUT_SECS: submission deadline
    /// - RL_DISCLOSE_TIMEOUT_SECS: disclosure deadline
    /// - RL_DECRYPT_LATENCY_MS: simulated decryption delay
    /// - RL_PROCESSING_LATENCY_MS: simulated processing delay
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
            value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
        }

        let defaults = Self::default();
        Self {
            contract_address: lookup("RL_CONTRACT_ADDRESS").unwrap_or(defaults.contract_address),
            chain_id: parsed(lookup("RL_CHAIN_ID"), defaults.chain_id),
            window_days: parsed(lookup("RL_WINDOW_DAYS"), defaults.window_days),
            index_append_retries: parsed(lookup("RL_INDEX_RETRIES"), defaults.index_append_retries),
            index_confirmations: parsed(
                lookup("RL_INDEX_CONFIRMATIONS"),
                defaults.index_confirmations,
            ),
            confirmation_interval_ms: parsed(
                lookup("RL_CONFIRMATION_INTERVAL_MS"),
                defaults.confirmation_interval_ms,
            ),
            submit_timeout_secs: parsed(lookup("RL_SUBMIT_TIMEOUT_SECS"), defaults.submit_timeout_secs),
            disclose_timeout_secs: parsed(
                lookup("RL_DISCLOSE_TIMEOUT_SECS"),
                defaults.disclose_timeout_secs,
            ),
            decrypt_latency_ms: parsed(lookup("RL_DECRYPT_LATENCY_MS"), defaults.decrypt_latency_ms),
            processing_latency_ms: parsed(
                lookup("RL_PROCESSING_LATENCY_MS"),
                defaults.processing_latency_ms,
            ),
        }
    }

    /// No simulated latency and no confirmation spacing
    pub fn immediate() -> Self {
        Self {
            confirmation_interval_ms: 0,
            decrypt_latency_ms: 0,
            processing_latency_ms: 0,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> LedgerResult<()> {
        if self.contract_address.trim().is_empty() {
            return Err(LedgerError::Configuration(
                "contract_address must not be empty".to_string(),
            ));
        }
        if self.window_days == 0 {
            return Err(LedgerError::Configuration(
                "window_days must be at least 1".to_string(),
            ));
        }
        if self.submit_timeout_secs == 0 || self.disclose_timeout_secs == 0 {
            return Err(LedgerError::Configuration(
                "operation timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            max_retries: self.index_append_retries,
            confirmations: self.index_confirmations,
            confirmation_interval: Duration::from_millis(self.confirmation_interval_ms),
        }
    }

    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    pub fn disclose_timeout(&self) -> Duration {
        Duration::from_secs(self.disclose_timeout_secs)
    }

    pub fn decrypt_latency(&self) -> Duration {
        Duration::from_millis(self.decrypt_latency_ms)
    }

    pub fn processing_latency(&self) -> Duration {
        Duration::from_millis(self.processing_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.window_days, 30);
        assert_eq!(config.decrypt_latency(), Duration::from_millis(1500));
        assert_eq!(config.processing_latency(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("RL_CONTRACT_ADDRESS", "0xC0ntract"),
            ("RL_CHAIN_ID", "11155111"),
            ("RL_INDEX_RETRIES", " 9 "),
            ("RL_DECRYPT_LATENCY_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = SessionConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.contract_address, "0xC0ntract");
        assert_eq!(config.chain_id, 11155111);
        assert_eq!(config.index_config().max_retries, 9);
        assert_eq!(config.decrypt_latency_ms, 1500);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"chain_id": 1}"#).unwrap();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.submit_timeout_secs, 120);
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = SessionConfig {
            window_days: 0,
            ..SessionConfig::immediate()
        };
        assert_eq!(config.validate().unwrap_err().kind(), "configuration");
    }
}
