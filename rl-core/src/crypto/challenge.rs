//! Capability Challenge
//!
//! Disclosure requires a signature over a canonical message. The message is
//! a fixed-order concatenation of labeled fields; changing any field or the
//! order invalidates every proof issued against the previous message.
//!
//! ```text
//! publickey:<pk>
//! contractAddresses:<address>
//! contractsChainId:<chain id>
//! startTimestamp:<unix seconds>
//! durationDays:<days>
//! ```
//!
//! Signatures are produced and checked by the wallet subsystem; this module
//! only builds the message and tracks the validity window.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest as Sha2Digest, Sha256};

/// Hex digits of generated public key material
pub const PUBLIC_KEY_HEX_LEN: usize = 2000;

const SECONDS_PER_DAY: i64 = 86_400;

/// Generate session-scoped public key material: `0x` + 2000 hex digits
pub fn generate_public_key() -> String {
    let mut bytes = vec![0u8; PUBLIC_KEY_HEX_LEN / 2];
    rand::thread_rng().fill(bytes.as_mut_slice());
    format!("0x{}", hex::encode(bytes))
}

/// Parameters of the consent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityChallenge {
    /// Public key material blob
    pub public_key: String,
    /// Ledger contract address
    pub contract_address: String,
    /// Chain identifier
    pub chain_id: u64,
    /// Window start, unix seconds
    pub start_timestamp: i64,
    /// Window length in days
    pub duration_days: u32,
}

impl CapabilityChallenge {
    /// Fresh challenge with generated key material, window starting now
    pub fn issue(contract_address: impl Into<String>, chain_id: u64, duration_days: u32) -> Self {
        Self {
            public_key: generate_public_key(),
            contract_address: contract_address.into(),
            chain_id,
            start_timestamp: Utc::now().timestamp(),
            duration_days,
        }
    }

    /// Canonical message handed to the signer verbatim
    pub fn message(&self) -> String {
        format!(
            "publickey:{}\ncontractAddresses:{}\ncontractsChainId:{}\nstartTimestamp:{}\ndurationDays:{}",
            self.public_key,
            self.contract_address,
            self.chain_id,
            self.start_timestamp,
            self.duration_days
        )
    }

    /// SHA-256 of the canonical message, hex encoded
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.message().as_bytes()))
    }

    /// End of the validity window, unix seconds
    pub fn window_end(&self) -> i64 {
        self.start_timestamp + i64::from(self.duration_days) * SECONDS_PER_DAY
    }

    /// Whether `at` falls inside `[start, start + duration)`
    pub fn is_active_at(&self, at: i64) -> bool {
        at >= self.start_timestamp && at < self.window_end()
    }
}

/// Opaque proof of possession (a wallet signature over the challenge message)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityProof {
    /// Signature bytes as produced by the wallet, usually 0x-prefixed hex
    pub signature: String,
    /// Digest of the challenge the signature was produced for
    pub challenge_digest: String,
}

impl CapabilityProof {
    pub fn new(signature: impl Into<String>, challenge: &CapabilityChallenge) -> Self {
        Self {
            signature: signature.into(),
            challenge_digest: challenge.digest(),
        }
    }

    /// Signature with any `0x` prefix and surrounding whitespace removed
    pub fn signature_body(&self) -> &str {
        let trimmed = self.signature.trim();
        trimmed.strip_prefix("0x").unwrap_or(trimmed)
    }
}
