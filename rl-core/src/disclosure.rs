//! Disclosure Gate
//!
//! Consent-gated access to a record's plaintext. A caller presents a proof
//! produced over the session's capability challenge; the gate checks the
//! challenge window, the proof binding and the external verifier, and only
//! then unseals.
//!
//! Disclosure never writes to the ledger. A failed disclosure leaves no
//! trace and may be retried from scratch.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::crypto::{CapabilityChallenge, CapabilityProof, ConfidentialityCodec};
use crate::error::{LedgerError, LedgerResult};
use crate::types::Record;

/// Verifies a proof of possession against a challenge
///
/// Signature cryptography belongs to the wallet subsystem; implementations
/// adapt whatever that subsystem exposes.
#[async_trait]
pub trait CapabilityVerifier: Send + Sync {
    async fn verify(
        &self,
        challenge: &CapabilityChallenge,
        proof: &CapabilityProof,
    ) -> LedgerResult<()>;
}

/// Accepts any non-empty signature; treats the signature as consent only
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsentVerifier;

#[async_trait]
impl CapabilityVerifier for ConsentVerifier {
    async fn verify(
        &self,
        _challenge: &CapabilityChallenge,
        proof: &CapabilityProof,
    ) -> LedgerResult<()> {
        if proof.signature_body().is_empty() {
            return Err(LedgerError::Denied("empty signature".to_string()));
        }
        Ok(())
    }
}

/// Disclosure gate
#[derive(Clone)]
pub struct DisclosureGate {
    codec: Arc<dyn ConfidentialityCodec>,
    verifier: Arc<dyn CapabilityVerifier>,
    decrypt_latency: Duration,
}

impl DisclosureGate {
    pub fn new(codec: Arc<dyn ConfidentialityCodec>, verifier: Arc<dyn CapabilityVerifier>) -> Self {
        Self {
            codec,
            verifier,
            decrypt_latency: Duration::ZERO,
        }
    }

    /// Simulated decryption delay applied after consent is established
    pub fn with_decrypt_latency(mut self, latency: Duration) -> Self {
        self.decrypt_latency = latency;
        self
    }

    /// Check consent for `record` and return its plaintext
    pub async fn request_disclosure(
        &self,
        record: &Record,
        challenge: &CapabilityChallenge,
        proof: &CapabilityProof,
    ) -> LedgerResult<Vec<u8>> {
        let now = Utc::now().timestamp();
        if !challenge.is_active_at(now) {
            warn!(record_id = %record.id, window_end = challenge.window_end(), now, "challenge window not active");
            return Err(LedgerError::Denied(format!(
                "challenge window not active at {} (valid {}..{})",
                now,
                challenge.start_timestamp,
                challenge.window_end()
            )));
        }

        if proof.challenge_digest != challenge.digest() {
            warn!(record_id = %record.id, "proof was produced for a different challenge");
            return Err(LedgerError::Denied(
                "proof does not match the current challenge".to_string(),
            ));
        }

        self.verifier
            .verify(challenge, proof)
            .await
            .map_err(|e| match e {
                LedgerError::Denied(reason) => LedgerError::Denied(reason),
                other => LedgerError::Denied(format!("verifier rejected proof: {}", other)),
            })?;

        debug!(record_id = %record.id, scheme = self.codec.scheme(), "consent established, unsealing");
        if !self.decrypt_latency.is_zero() {
            tokio::time::sleep(self.decrypt_latency).await;
        }

        let plaintext = self.codec.unseal(&record.sealed_payload)?;
        info!(record_id = %record.id, bytes = plaintext.len(), "record disclosed");
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SimulatedFheCodec;
    use crate::types::{Category, OwnerAddress, RecordId, SealedPayload};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingCodec {
        unseals: AtomicUsize,
    }

    impl ConfidentialityCodec for CountingCodec {
        fn scheme(&self) -> &'static str {
            "counting"
        }

        fn seal(&self, plaintext: &[u8]) -> SealedPayload {
            SimulatedFheCodec.seal(plaintext)
        }

        fn unseal(&self, sealed: &SealedPayload) -> LedgerResult<Vec<u8>> {
            self.unseals.fetch_add(1, Ordering::SeqCst);
            SimulatedFheCodec.unseal(sealed)
        }
    }

    struct RejectingVerifier;

    #[async_trait]
    impl CapabilityVerifier for RejectingVerifier {
        async fn verify(&self, _: &CapabilityChallenge, _: &CapabilityProof) -> LedgerResult<()> {
            Err(LedgerError::Codec("bad signature encoding".to_string()))
        }
    }

    fn record(codec: &dyn ConfidentialityCodec) -> Record {
        Record::new(
            RecordId::new("r1"),
            codec.seal(b"sample-image-bytes"),
            OwnerAddress::new("0xA"),
            Category::Hazardous,
        )
    }

    fn challenge() -> CapabilityChallenge {
        CapabilityChallenge::issue("0xC0ntract", 31337, 30)
    }

    fn gate(codec: Arc<CountingCodec>, verifier: Arc<dyn CapabilityVerifier>) -> DisclosureGate {
        DisclosureGate::new(codec, verifier)
    }

    #[tokio::test]
    async fn test_valid_proof_discloses() {
        let codec = Arc::new(CountingCodec::default());
        let gate = gate(codec.clone(), Arc::new(ConsentVerifier));
        let challenge = challenge();
        let proof = CapabilityProof::new("0xsig", &challenge);

        let plain = gate
            .request_disclosure(&record(codec.as_ref()), &challenge, &proof)
            .await
            .unwrap();
        assert_eq!(plain, b"sample-image-bytes");
        assert_eq!(codec.unseals.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_window_denied_without_unseal() {
        let codec = Arc::new(CountingCodec::default());
        let gate = gate(codec.clone(), Arc::new(ConsentVerifier));
        let mut challenge = challenge();
        challenge.start_timestamp -= 31 * 86_400;
        let proof = CapabilityProof::new("0xsig", &challenge);

        let err = gate
            .request_disclosure(&record(codec.as_ref()), &challenge, &proof)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "denied");
        assert_eq!(codec.unseals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_proof_for_other_challenge_denied() {
        let codec = Arc::new(CountingCodec::default());
        let gate = gate(codec.clone(), Arc::new(ConsentVerifier));
        let stale = challenge();
        let current = challenge();
        let proof = CapabilityProof::new("0xsig", &stale);

        let err = gate
            .request_disclosure(&record(codec.as_ref()), &current, &proof)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "denied");
        assert_eq!(codec.unseals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_verifier_rejection_maps_to_denied() {
        let codec = Arc::new(CountingCodec::default());
        let gate = gate(codec.clone(), Arc::new(RejectingVerifier));
        let challenge = challenge();
        let proof = CapabilityProof::new("0xsig", &challenge);

        let err = gate
            .request_disclosure(&record(codec.as_ref()), &challenge, &proof)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Denied(ref r) if r.contains("bad signature")));
        assert_eq!(codec.unseals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_signature_denied() {
        let codec = Arc::new(CountingCodec::default());
        let gate = gate(codec.clone(), Arc::new(ConsentVerifier));
        let challenge = challenge();
        let proof = CapabilityProof::new("0x", &challenge);

        let err = gate
            .request_disclosure(&record(codec.as_ref()), &challenge, &proof)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "denied");
        assert_eq!(codec.unseals.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decrypt_latency_applied() {
        let codec = Arc::new(CountingCodec::default());
        let gate = gate(codec.clone(), Arc::new(ConsentVerifier))
            .with_decrypt_latency(Duration::from_millis(1500));
        let challenge = challenge();
        let proof = CapabilityProof::new("0xsig", &challenge);

        let started = tokio::time::Instant::now();
        gate.request_disclosure(&record(codec.as_ref()), &challenge, &proof)
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
    }
}
