//! Threshold signature verification of signed metadata.
//!
//! # Verification Steps
//!
//! 1. Reject envelopes without signatures
//! 2. Look up the role policy
//! 3. Strictly decode the payload and re-encode it canonically (JCS)
//! 4. Scan signatures in listed order:
//!    - unsupported method → fail the whole call
//!    - wrong signature length → fail
//!    - key not authorized for the role, or unknown → skip
//!    - cryptographically invalid → fail
//!    - valid → count the key once
//! 5. Compare distinct valid keys against the role threshold
//!
//! The scan is fail-fast: the first fatal signature in list order is reported,
//! even if other signatures would have met the threshold.

use std::collections::BTreeSet;

use crate::canonicalize::canonical_payload_bytes;
use crate::error::{SignatureFault, VerificationError, VerificationResult};
use crate::trust::TrustDb;
use crate::types::{SignedEnvelope, VerifyConfig};
use crate::verifier::KeyScheme;

/// Outcome of a successful threshold check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSignatures {
    /// Role the envelope was verified against.
    pub role: String,

    /// Threshold the role required.
    pub threshold: usize,

    /// Distinct keys whose signatures verified.
    pub key_ids: BTreeSet<String>,
}

/// Verify that `envelope` is signed by enough authorized keys for `role`.
///
/// Uses the default [`VerifyConfig`] decoding limits.
pub fn verify_signed<D>(db: &D, envelope: &SignedEnvelope, role: &str) -> VerificationResult<()>
where
    D: TrustDb + ?Sized,
{
    verify_signed_with_config(db, envelope, role, &VerifyConfig::default())
}

/// Like [`verify_signed`] with explicit decoding limits.
pub fn verify_signed_with_config<D>(
    db: &D,
    envelope: &SignedEnvelope,
    role: &str,
    config: &VerifyConfig,
) -> VerificationResult<()>
where
    D: TrustDb + ?Sized,
{
    verify_signatures(db, envelope, role, config).map(|_| ())
}

/// Verify `envelope` against `role` and report which keys counted.
pub fn verify_signatures<D>(
    db: &D,
    envelope: &SignedEnvelope,
    role: &str,
    config: &VerifyConfig,
) -> VerificationResult<VerifiedSignatures>
where
    D: TrustDb + ?Sized,
{
    // 1. Signatures present
    if envelope.signatures.is_empty() {
        return Err(VerificationError::NoSignatures);
    }

    // 2. Role policy
    let role_data = db.role(role).ok_or_else(|| VerificationError::UnknownRole {
        role: role.to_string(),
    })?;

    // 3-4. CRITICAL: verify over bytes re-derived from the decoded payload,
    // never over the bytes received.
    let message = canonical_payload_bytes(envelope.payload(), config)?;

    // 5. Scan signatures
    let mut valid = BTreeSet::new();
    for sig in &envelope.signatures {
        let Some(scheme) = KeyScheme::from_method(&sig.method) else {
            tracing::warn!(
                key_id = %sig.key_id,
                method = %sig.method,
                role,
                "unsupported signature method"
            );
            return Err(VerificationError::WrongMethod {
                key_id: sig.key_id.clone(),
                method: sig.method.clone(),
            });
        };

        let expected = scheme.signature_length();
        if sig.signature.len() != expected {
            tracing::warn!(
                key_id = %sig.key_id,
                expected,
                actual = sig.signature.len(),
                role,
                "signature has wrong length"
            );
            return Err(VerificationError::InvalidSignature {
                key_id: sig.key_id.clone(),
                fault: SignatureFault::WrongLength {
                    expected,
                    actual: sig.signature.len(),
                },
            });
        }

        if !role_data.is_authorized(&sig.key_id) {
            tracing::debug!(key_id = %sig.key_id, role, "skipping signature: key not authorized for role");
            continue;
        }

        let Some(key) = db.key(&sig.key_id) else {
            tracing::debug!(key_id = %sig.key_id, role, "skipping signature: unknown key");
            continue;
        };

        if key.scheme() != scheme || !scheme.verify(key.public_key(), &message, &sig.signature) {
            tracing::warn!(key_id = %sig.key_id, role, "signature verification failed");
            return Err(VerificationError::InvalidSignature {
                key_id: sig.key_id.clone(),
                fault: SignatureFault::VerificationFailed,
            });
        }

        valid.insert(sig.key_id.clone());
    }

    // 6. Threshold over distinct keys
    let threshold = role_data.threshold();
    if valid.len() < threshold {
        return Err(VerificationError::RoleThreshold {
            role: role.to_string(),
            valid: valid.len(),
            threshold,
        });
    }

    tracing::debug!(role, valid = valid.len(), threshold, "signature threshold met");

    Ok(VerifiedSignatures {
        role: role.to_string(),
        threshold,
        key_ids: valid,
    })
}
