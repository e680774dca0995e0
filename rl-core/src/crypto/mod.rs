//! Confidentiality Primitives
//!
//! The sealing transform applied to record payloads and the capability
//! challenge that gates disclosure.
//!
//! # Modules
//!
//! - **codec**: `seal` / `unseal` behind a swappable trait
//! - **challenge**: deterministic consent message for the external signer

pub mod challenge;
pub mod codec;

pub use challenge::{generate_public_key, CapabilityChallenge, CapabilityProof};
pub use codec::{ConfidentialityCodec, SimulatedFheCodec, FHE_PREFIX};
