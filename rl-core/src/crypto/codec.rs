//! Confidentiality Codec
//!
//! Payloads are sealed before they reach the ledger and unsealed only after
//! a disclosure check. The transform is pluggable so a real homomorphic
//! backend can replace the simulated one without touching index or
//! workflow logic.
//!
//! # Contract
//!
//! - `unseal(seal(x)) == x` for every `x`
//! - Sealed output is text; it is stored verbatim in the record envelope

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{LedgerError, LedgerResult};
use crate::types::SealedPayload;

/// Marker prepended by the simulated scheme
pub const FHE_PREFIX: &str = "FHE-";

/// Reversible confidentiality transform
pub trait ConfidentialityCodec: Send + Sync {
    /// Scheme identifier, for logs and diagnostics
    fn scheme(&self) -> &'static str;

    /// Seal plaintext bytes
    fn seal(&self, plaintext: &[u8]) -> SealedPayload;

    /// Recover plaintext from a sealed payload
    fn unseal(&self, sealed: &SealedPayload) -> LedgerResult<Vec<u8>>;
}

/// Stand-in for a homomorphic scheme: `FHE-` followed by base64
///
/// Values without the prefix are returned unchanged on unseal; early
/// writers stored some payloads in the clear.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedFheCodec;

impl SimulatedFheCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ConfidentialityCodec for SimulatedFheCodec {
    fn scheme(&self) -> &'static str {
        "simulated-fhe-v1"
    }

    fn seal(&self, plaintext: &[u8]) -> SealedPayload {
        SealedPayload(format!("{}{}", FHE_PREFIX, STANDARD.encode(plaintext)))
    }

    fn unseal(&self, sealed: &SealedPayload) -> LedgerResult<Vec<u8>> {
        match sealed.as_str().strip_prefix(FHE_PREFIX) {
            Some(body) => STANDARD
                .decode(body)
                .map_err(|e| LedgerError::Codec(format!("invalid sealed body: {}", e))),
            None => Ok(sealed.as_str().as_bytes().to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_arbitrary_bytes() {
        let codec = SimulatedFheCodec::new();
        let samples: [&[u8]; 5] = [
            b"",
            b"sample-image-bytes",
            &[0u8, 255, 1, 254, 128],
            "unicode \u{2603} payload".as_bytes(),
            b"FHE-looks-sealed-already",
        ];
        for plain in samples {
            let sealed = codec.seal(plain);
            assert!(sealed.as_str().starts_with(FHE_PREFIX));
            assert_eq!(codec.unseal(&sealed).unwrap(), plain);
        }
    }

    #[test]
    fn test_sealed_hides_plaintext() {
        let codec = SimulatedFheCodec::new();
        let sealed = codec.seal(b"sample-image-bytes");
        assert!(!sealed.as_str().contains("sample-image-bytes"));
    }

    #[test]
    fn test_unprefixed_passthrough() {
        let codec = SimulatedFheCodec::new();
        let legacy = SealedPayload("plain legacy".to_string());
        assert_eq!(codec.unseal(&legacy).unwrap(), b"plain legacy");
    }

    #[test]
    fn test_malformed_body_is_codec_error() {
        let codec = SimulatedFheCodec::new();
        let broken = SealedPayload("FHE-***not base64***".to_string());
        let err = codec.unseal(&broken).unwrap_err();
        assert_eq!(err.kind(), "codec");
    }
}
