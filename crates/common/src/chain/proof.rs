//! Content usage proofs.
//!
//! A usage proof binds a license identifier to the moment of access.
//! The proof body is a hex-encoded JSON payload and carries no cryptographic
//! guarantees, so [`verify_proof`] only checks that a proof is well-formed.

use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Length of a random nonce attached to each proof.
pub const NONCE_LENGTH: usize = 16;

/// Proof of a single content usage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageProof {
    /// `0x`-prefixed hex-encoded proof payload.
    pub proof: String,

    /// Values revealed by the proof. The first one is always a license identifier.
    pub public_inputs: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProofPayload {
    license_id: String,
}

/// Generate a random proof nonce.
pub fn nonce() -> String {
    Alphanumeric.sample_string(&mut thread_rng(), NONCE_LENGTH)
}

/// Generate a usage proof for the provided license.
pub fn generate_usage_proof(license_id: &str, timestamp: i64, nonce: &str) -> UsageProof {
    let payload = json!({
        "licenseId": license_id,
        "timestamp": timestamp,
        "nonce": nonce,
    });

    UsageProof {
        proof: format!("0x{}", hex::encode(payload.to_string())),
        public_inputs: vec![license_id.to_string()],
    }
}

/// Check that the provided proof is well-formed and matches its public inputs.
pub fn verify_proof(proof: &UsageProof) -> bool {
    let Some(encoded) = proof.proof.strip_prefix("0x") else {
        return false;
    };

    let Ok(raw) = hex::decode(encoded) else {
        return false;
    };

    let Ok(payload) = serde_json::from_slice::<ProofPayload>(&raw) else {
        return false;
    };

    proof.public_inputs.first() == Some(&payload.license_id)
}
