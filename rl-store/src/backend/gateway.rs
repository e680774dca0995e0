//! Contract Gateway Ledger
//!
//! HTTP adapter to a gateway that fronts the ledger contract. The gateway
//! exposes the contract's three calls per contract address:
//!
//! ```text
//! POST {base}/contracts/{address}/getData      {"key": k}              -> {"value": "0x.."}
//! POST {base}/contracts/{address}/setData      {"key": k, "value": v}  -> {"ok": true}
//! GET  {base}/contracts/{address}/isAvailable                          -> {"available": b}
//! ```
//!
//! Values travel as `0x`-prefixed hex. An empty value (`"0x"`) means the key
//! was never written. The adapter neither retries nor caches.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use rl_core::{LedgerClient, LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// `getData` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDataRequest {
    pub key: String,
}

/// `getData` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDataResponse {
    pub value: String,
}

/// `setData` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDataRequest {
    pub key: String,
    pub value: String,
}

/// `setData` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetDataResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// `isAvailable` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub available: bool,
}

/// Hex-encode a value for the wire
pub fn encode_value(value: &[u8]) -> String {
    format!("0x{}", hex::encode(value))
}

/// Decode a wire value; `None` for empty
pub fn decode_value(value: &str) -> Result<Option<Vec<u8>>, hex::FromHexError> {
    let body = value.strip_prefix("0x").unwrap_or(value);
    if body.is_empty() {
        return Ok(None);
    }
    hex::decode(body).map(Some)
}

/// Ledger client over the contract gateway
pub struct GatewayLedger {
    /// HTTP client
    client: Client,
    /// Gateway base URL
    base_url: String,
    /// Contract address
    contract_address: String,
}

impl GatewayLedger {
    /// Create a new client
    pub fn new(base_url: impl Into<String>, contract_address: impl Into<String>) -> StoreResult<Self> {
        Self::with_timeout(base_url, contract_address, 30)
    }

    /// Create with custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        contract_address: impl Into<String>,
        timeout_secs: u64,
    ) -> StoreResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(StoreError::Configuration(format!(
                "gateway url must be http(s): {}",
                base_url
            )));
        }

        let contract_address = contract_address.into();
        if contract_address.trim().is_empty() {
            return Err(StoreError::Configuration(
                "contract address must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            contract_address,
        })
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    fn url(&self, call: &str) -> String {
        format!("{}/contracts/{}/{}", self.base_url, self.contract_address, call)
    }
}

fn transport_error(call: &str, err: reqwest::Error) -> LedgerError {
    LedgerError::LedgerUnavailable(format!("{} request failed: {}", call, err))
}

#[async_trait]
impl LedgerClient for GatewayLedger {
    async fn read(&self, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        let url = self.url("getData");
        let response = self
            .client
            .post(&url)
            .json(&GetDataRequest { key: key.to_string() })
            .send()
            .await
            .map_err(|e| transport_error("getData", e))?;

        if !response.status().is_success() {
            return Err(LedgerError::LedgerUnavailable(format!(
                "getData returned {}: {}",
                response.status().as_u16(),
                response.text().await.unwrap_or_default()
            )));
        }

        let body: GetDataResponse = response
            .json()
            .await
            .map_err(|e| transport_error("getData", e))?;
        let value = decode_value(&body.value).map_err(|e| LedgerError::corrupt(key, e.to_string()))?;

        debug!(key, found = value.is_some(), "gateway ledger read");
        Ok(value)
    }

    async fn write(&self, key: &str, value: &[u8]) -> LedgerResult<()> {
        let url = self.url("setData");
        let response = self
            .client
            .post(&url)
            .json(&SetDataRequest {
                key: key.to_string(),
                value: encode_value(value),
            })
            .send()
            .await
            .map_err(|e| transport_error("setData", e))?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(LedgerError::LedgerUnavailable(format!(
                "setData returned {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(LedgerError::write_failed(
                key,
                format!(
                    "setData returned {}: {}",
                    status.as_u16(),
                    response.text().await.unwrap_or_default()
                ),
            ));
        }

        let body: SetDataResponse = response
            .json()
            .await
            .map_err(|e| transport_error("setData", e))?;
        if !body.ok {
            return Err(LedgerError::write_failed(
                key,
                body.error.unwrap_or_else(|| "rejected by contract".to_string()),
            ));
        }

        debug!(key, bytes = value.len(), "gateway ledger write");
        Ok(())
    }

    async fn is_available(&self) -> LedgerResult<bool> {
        let url = self.url("isAvailable");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("isAvailable", e))?;

        if !response.status().is_success() {
            return Ok(false);
        }

        let body: AvailabilityResponse = response
            .json()
            .await
            .map_err(|e| transport_error("isAvailable", e))?;
        Ok(body.available)
    }

    fn backend_type(&self) -> &'static str {
        "gateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_encoding() {
        assert_eq!(encode_value(b"\x01\xff"), "0x01ff");
        assert_eq!(decode_value("0x01ff").unwrap(), Some(vec![1, 255]));
        assert_eq!(decode_value("0x").unwrap(), None);
        assert_eq!(decode_value("").unwrap(), None);
        assert!(decode_value("0xzz").is_err());
    }

    #[test]
    fn test_rejects_bad_configuration() {
        assert!(matches!(
            GatewayLedger::new("ftp://gateway", "0xC"),
            Err(StoreError::Configuration(_))
        ));
        assert!(matches!(
            GatewayLedger::new("http://gateway", " "),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_url_layout() {
        let ledger = GatewayLedger::new("http://gateway:8545/", "0xC0ntract").unwrap();
        assert_eq!(
            ledger.url("getData"),
            "http://gateway:8545/contracts/0xC0ntract/getData"
        );
    }
}
