//! Producing signatures over signed payloads.
//!
//! The counterpart of verification: signs the canonical encoding of a
//! payload, so a signature made here verifies regardless of how the payload
//! text is later re-serialized.

use std::fmt;

use ed25519_dalek::{Signer as _, SigningKey};

use crate::canonicalize::{canonical_payload_bytes, CanonicalizeResult};
use crate::error::TrustDbResult;
use crate::trust::Key;
use crate::types::{KeyDocument, Signature, SignedEnvelope, VerifyConfig};

/// An Ed25519 signing key paired with its public [`Key`].
pub struct Signer {
    key: Key,
    signing_key: SigningKey,
}

impl Signer {
    /// Wrap a signing key.
    pub fn new(signing_key: SigningKey) -> TrustDbResult<Self> {
        let key = Key::ed25519(signing_key.verifying_key().to_bytes())?;
        Ok(Self { key, signing_key })
    }

    /// Signer from a 32-byte secret seed.
    pub fn from_seed(seed: &[u8; 32]) -> TrustDbResult<Self> {
        Self::new(SigningKey::from_bytes(seed))
    }

    /// Public key of this signer.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// ID of the public key.
    pub fn key_id(&self) -> &str {
        self.key.id()
    }

    /// Published document for the public key.
    pub fn key_document(&self) -> KeyDocument {
        self.key.to_document()
    }

    /// Sign an already-canonical message.
    pub fn sign_message(&self, message: &[u8]) -> Signature {
        Signature {
            key_id: self.key.id().to_string(),
            method: self.key.scheme().method().to_string(),
            signature: self.signing_key.sign(message).to_bytes().to_vec(),
        }
    }

    /// Sign the envelope's payload, replacing any earlier signature by this key.
    pub fn sign(&self, envelope: &mut SignedEnvelope) -> CanonicalizeResult<()> {
        self.sign_with_config(envelope, &VerifyConfig::default())
    }

    /// Like [`Signer::sign`] with explicit decoding limits.
    pub fn sign_with_config(
        &self,
        envelope: &mut SignedEnvelope,
        config: &VerifyConfig,
    ) -> CanonicalizeResult<()> {
        let message = canonical_payload_bytes(envelope.payload(), config)?;
        let signature = self.sign_message(&message);

        envelope.signatures.retain(|s| s.key_id != signature.key_id);
        envelope.signatures.push(signature);
        Ok(())
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("key_id", &self.key.id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonicalize::CanonicalizeError;
    use crate::verifier::verify_ed25519;

    #[test]
    fn test_signature_over_canonical_bytes() {
        let signer = Signer::from_seed(&[1u8; 32]).unwrap();
        let mut env = SignedEnvelope::from_raw_payload(r#"{ "b": 2, "a": 1 }"#).unwrap();
        signer.sign(&mut env).unwrap();

        let sig: [u8; 64] = env.signatures[0].signature.as_slice().try_into().unwrap();
        assert!(verify_ed25519(
            signer.key().public_key(),
            br#"{"a":1,"b":2}"#,
            &sig
        ));
        assert_eq!(env.signatures[0].method, "ed25519");
        assert_eq!(env.signatures[0].key_id, signer.key_id());
    }

    #[test]
    fn test_resign_replaces_own_signature() {
        let a = Signer::from_seed(&[2u8; 32]).unwrap();
        let b = Signer::from_seed(&[3u8; 32]).unwrap();
        let mut env = SignedEnvelope::new(&serde_json::json!({"version": 1})).unwrap();

        a.sign(&mut env).unwrap();
        b.sign(&mut env).unwrap();
        a.sign(&mut env).unwrap();

        assert_eq!(env.signatures.len(), 2);
        assert_eq!(env.signatures[0].key_id, b.key_id());
        assert_eq!(env.signatures[1].key_id, a.key_id());
    }

    #[test]
    fn test_sign_rejects_non_object_payload() {
        let signer = Signer::from_seed(&[4u8; 32]).unwrap();
        let mut env = SignedEnvelope::from_raw_payload("[1,2]").unwrap();

        let result = signer.sign(&mut env);
        assert!(matches!(result, Err(CanonicalizeError::NotAnObject { .. })));
        assert!(env.signatures.is_empty());
    }

    #[test]
    fn test_sign_duplicate_keys_last_wins() {
        let signer = Signer::from_seed(&[4u8; 32]).unwrap();
        let mut env = SignedEnvelope::from_raw_payload(r#"{"a":2,"a":1}"#).unwrap();
        signer.sign(&mut env).unwrap();

        assert_eq!(env.signatures[0], signer.sign_message(br#"{"a":1}"#));
    }

    #[test]
    fn test_debug_hides_secret() {
        let signer = Signer::from_seed(&[5u8; 32]).unwrap();
        let debug = format!("{:?}", signer);
        assert!(debug.contains(signer.key_id()));
        assert!(!debug.contains("signing_key"));
    }

    #[test]
    fn test_deterministic_from_seed() {
        let a = Signer::from_seed(&[6u8; 32]).unwrap();
        let b = Signer::from_seed(&[6u8; 32]).unwrap();
        assert_eq!(a.key_id(), b.key_id());
        assert_eq!(a.sign_message(b"m"), b.sign_message(b"m"));
    }
}
