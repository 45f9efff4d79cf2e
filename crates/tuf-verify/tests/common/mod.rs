//! Common test utilities for integration tests.

#![allow(dead_code)]

use ed25519_dalek::SigningKey;
use tuf_verify::{MemoryTrustDb, RoleDocument, SignedEnvelope, Signer};

pub const ROOT_PAYLOAD: &str = r#"{"_type":"root","version":1,"expires":"2030-01-01T00:00:00Z"}"#;

/// Deterministic signer.
pub fn signer(seed: u8) -> Signer {
    Signer::from_seed(&[seed; 32]).expect("valid seed")
}

/// Fresh random signer.
pub fn random_signer() -> Signer {
    Signer::new(SigningKey::generate(&mut rand::thread_rng())).expect("valid key")
}

/// Trust DB knowing `known` keys, with `role` authorizing `authorized` at `threshold`.
pub fn trust_db(
    role: &str,
    known: &[&Signer],
    authorized: &[&Signer],
    threshold: u64,
) -> MemoryTrustDb {
    let db = MemoryTrustDb::new();
    for s in known {
        db.add_key(s.key_id(), &s.key_document())
            .expect("failed to add key");
    }
    db.add_role(
        role,
        &RoleDocument {
            key_ids: authorized.iter().map(|s| s.key_id().to_string()).collect(),
            threshold,
        },
    )
    .expect("failed to add role");
    db
}

/// Envelope over `payload` signed by each signer in order.
pub fn signed_by(payload: &str, signers: &[&Signer]) -> SignedEnvelope {
    let mut envelope = SignedEnvelope::from_raw_payload(payload).expect("valid payload JSON");
    for s in signers {
        s.sign(&mut envelope).expect("signing failed");
    }
    envelope
}
