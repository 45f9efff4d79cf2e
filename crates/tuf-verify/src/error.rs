//! Error types for signed metadata verification.

/// Verification errors.
///
/// The set is closed: every failure of [`crate::verify_signed`] is exactly one
/// of these kinds, and every kind is terminal for that call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    /// The envelope carries no signatures at all.
    #[error("data has no signatures")]
    NoSignatures,

    /// The trust database has no role with this name.
    #[error("unknown role: {role}")]
    UnknownRole { role: String },

    /// The envelope or its signed payload could not be decoded into canonical form.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A signature declares a method other than the supported scheme.
    #[error("invalid signature type {method:?} from key {key_id}")]
    WrongMethod { key_id: String, method: String },

    /// A signature is malformed or fails the cryptographic check.
    #[error("signature verification failed for key {key_id}: {fault}")]
    InvalidSignature { key_id: String, fault: SignatureFault },

    /// Fewer distinct authorized keys signed than the role requires.
    #[error("valid signatures did not meet threshold for role {role}: {valid} of {threshold}")]
    RoleThreshold {
        role: String,
        valid: usize,
        threshold: usize,
    },
}

/// Why a signature was rejected as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureFault {
    /// Signature bytes do not have the scheme's fixed length.
    #[error("expected {expected} signature bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Signature bytes are well-formed but do not verify.
    #[error("ed25519 verification failed")]
    VerificationFailed,
}

/// How a metadata-acceptance pipeline should react to a failed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The document may have been damaged in transit; fetch it again.
    Refetch,

    /// The document is well-formed but not yet signed by enough keys.
    AwaitSigners,

    /// The document must not be trusted; stop processing it.
    Abort,
}

impl VerificationError {
    /// Classify the error for the caller.
    pub fn disposition(&self) -> Disposition {
        match self {
            // Transport damage
            Self::Decode { .. } => Disposition::Refetch,

            // Not enough signers (yet)
            Self::NoSignatures => Disposition::AwaitSigners,
            Self::RoleThreshold { .. } => Disposition::AwaitSigners,

            // Policy / tamper
            Self::UnknownRole { .. } => Disposition::Abort,
            Self::WrongMethod { .. } => Disposition::Abort,
            Self::InvalidSignature { .. } => Disposition::Abort,
        }
    }

    /// Whether fetching the document again may succeed.
    pub fn is_retryable(&self) -> bool {
        self.disposition() == Disposition::Refetch
    }

    /// Whether the failure indicates a forged or mis-declared signature.
    pub fn is_tamper_signal(&self) -> bool {
        matches!(
            self,
            Self::WrongMethod { .. } | Self::InvalidSignature { .. }
        )
    }
}

/// Result type for verification operations.
pub type VerificationResult<T> = Result<T, VerificationError>;

/// Errors raised while populating a [`crate::MemoryTrustDb`].
#[derive(Debug, thiserror::Error)]
pub enum TrustDbError {
    /// Key type is not supported.
    #[error("invalid key type: {keytype}")]
    WrongKeyType { keytype: String },

    /// Claimed key ID does not match the ID computed from the key material.
    #[error("key id mismatch: claimed {claimed}, computed {computed}")]
    KeyIdMismatch { claimed: String, computed: String },

    /// Public key material is malformed.
    #[error("invalid key {key_id}: {reason}")]
    InvalidKey { key_id: String, reason: String },

    /// Role name is not a recognized top-level role.
    #[error("invalid role: {role}")]
    InvalidRole { role: String },

    /// Role references a key ID of the wrong shape.
    #[error("invalid key id in role {role}: {key_id}")]
    InvalidKeyId { role: String, key_id: String },

    /// Role threshold is below one.
    #[error("invalid threshold {threshold} for role {role}")]
    InvalidThreshold { role: String, threshold: u64 },

    /// Trust manifest could not be parsed.
    #[error("invalid trust manifest: {message}")]
    Manifest { message: String },

    /// Trust manifest could not be read.
    #[error("failed to read trust manifest: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for trust database operations.
pub type TrustDbResult<T> = Result<T, TrustDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<VerificationError> {
        vec![
            VerificationError::NoSignatures,
            VerificationError::UnknownRole {
                role: "mirror".to_string(),
            },
            VerificationError::Decode {
                message: "trailing characters".to_string(),
            },
            VerificationError::WrongMethod {
                key_id: "a".repeat(64),
                method: "rsa".to_string(),
            },
            VerificationError::InvalidSignature {
                key_id: "a".repeat(64),
                fault: SignatureFault::VerificationFailed,
            },
            VerificationError::RoleThreshold {
                role: "root".to_string(),
                valid: 1,
                threshold: 2,
            },
        ]
    }

    #[test]
    fn test_disposition_matrix() {
        let expected = [
            Disposition::AwaitSigners,
            Disposition::Abort,
            Disposition::Refetch,
            Disposition::Abort,
            Disposition::Abort,
            Disposition::AwaitSigners,
        ];
        for (err, want) in all_kinds().iter().zip(expected) {
            assert_eq!(err.disposition(), want, "{err}");
        }
    }

    #[test]
    fn test_only_decode_is_retryable() {
        let retryable: Vec<_> = all_kinds().into_iter().filter(|e| e.is_retryable()).collect();
        assert_eq!(retryable.len(), 1);
        assert!(matches!(retryable[0], VerificationError::Decode { .. }));
    }

    #[test]
    fn test_tamper_signals() {
        let tamper: Vec<_> = all_kinds()
            .into_iter()
            .filter(|e| e.is_tamper_signal())
            .collect();
        assert_eq!(tamper.len(), 2);
        assert!(tamper.iter().all(|e| e.disposition() == Disposition::Abort));
    }

    #[test]
    fn test_display_is_stable() {
        let err = VerificationError::RoleThreshold {
            role: "root".to_string(),
            valid: 1,
            threshold: 2,
        };
        assert_eq!(
            err.to_string(),
            "valid signatures did not meet threshold for role root: 1 of 2"
        );

        let err = VerificationError::InvalidSignature {
            key_id: "k".to_string(),
            fault: SignatureFault::WrongLength {
                expected: 64,
                actual: 63,
            },
        };
        assert_eq!(
            err.to_string(),
            "signature verification failed for key k: expected 64 signature bytes, got 63"
        );
    }
}
