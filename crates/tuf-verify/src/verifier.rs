//! Signature schemes and the raw cryptographic check.
//!
//! Pure functions only: no key lookup, no policy. Lengths are validated by the
//! caller before anything reaches the primitive.

use ed25519_dalek::{Signature as Ed25519Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

pub use ed25519_dalek::{PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Method identifier for Ed25519 signatures.
pub const ED25519_METHOD: &str = "ed25519";

/// Supported signature schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    Ed25519,
}

impl KeyScheme {
    /// Resolve the scheme named by a signature's `method` field.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            ED25519_METHOD => Some(Self::Ed25519),
            _ => None,
        }
    }

    /// Method identifier carried by signatures of this scheme.
    pub fn method(self) -> &'static str {
        match self {
            Self::Ed25519 => ED25519_METHOD,
        }
    }

    /// Key type identifier used in key documents.
    pub fn keytype(self) -> &'static str {
        match self {
            Self::Ed25519 => "ed25519",
        }
    }

    /// Fixed signature length in bytes.
    pub fn signature_length(self) -> usize {
        match self {
            Self::Ed25519 => SIGNATURE_LENGTH,
        }
    }

    /// Fixed public key length in bytes.
    pub fn public_key_length(self) -> usize {
        match self {
            Self::Ed25519 => PUBLIC_KEY_LENGTH,
        }
    }

    /// Check `signature` over `message`.
    ///
    /// A signature of the wrong length never verifies.
    pub fn verify(
        self,
        public_key: &[u8; PUBLIC_KEY_LENGTH],
        message: &[u8],
        signature: &[u8],
    ) -> bool {
        match self {
            Self::Ed25519 => match <&[u8; SIGNATURE_LENGTH]>::try_from(signature) {
                Ok(signature) => verify_ed25519(public_key, message, signature),
                Err(_) => false,
            },
        }
    }
}

/// Verify an Ed25519 signature.
///
/// A public key that does not decode to a curve point yields `false`.
pub fn verify_ed25519(
    public_key: &[u8; PUBLIC_KEY_LENGTH],
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
) -> bool {
    let Ok(key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let signature = Ed25519Signature::from_bytes(signature);
    key.verify(message, &signature).is_ok()
}
