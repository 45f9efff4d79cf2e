//! Threshold signature verification for signed update-framework metadata.
//!
//! This crate decides whether a signed metadata document is trustworthy for a
//! named role, providing:
//!
//! - Bounded decoding of the signed payload (duplicate keys resolve last-wins)
//! - Canonical re-encoding (JCS, RFC 8785) of the payload before any signature check
//! - Ed25519 signature checks against keys from a trust database
//! - Per-role thresholds counted over distinct authorized keys
//! - An in-memory trust database that can be rotated while readers verify
//!
//! # Quick Start
//!
//! ```
//! use tuf_verify::{verify_signed, MemoryTrustDb, RoleDocument, SignedEnvelope, Signer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let signer = Signer::from_seed(&[7u8; 32])?;
//!
//! let db = MemoryTrustDb::new();
//! db.add_key(signer.key_id(), &signer.key_document())?;
//! db.add_role(
//!     "root",
//!     &RoleDocument {
//!         key_ids: vec![signer.key_id().to_string()],
//!         threshold: 1,
//!     },
//! )?;
//!
//! let mut envelope = SignedEnvelope::from_raw_payload(r#"{"_type": "root", "version": 1}"#)?;
//! signer.sign(&mut envelope)?;
//!
//! verify_signed(&db, &envelope, "root")?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Configuration
//!
//! Decoding limits come from [`VerifyConfig`], which can be read from the
//! environment with [`VerifyConfig::from_env`]:
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `TUF_VERIFY_MAX_PAYLOAD_BYTES` | Maximum raw payload size (default: 10 MiB) |
//! | `TUF_VERIFY_MAX_DEPTH` | Maximum payload nesting depth (default: 50) |
//! | `TUF_VERIFY_MAX_KEYS_PER_OBJECT` | Maximum keys per payload object (default: 10000) |
//! | `TUF_VERIFY_MAX_STRING_LENGTH` | Maximum payload string length (default: 1 MiB) |

pub mod canonicalize;
mod digest;
pub mod error;
pub mod signer;
pub mod trust;
pub mod types;
pub mod verifier;
pub mod verify;

// Re-export main types
pub use error::{
    Disposition, SignatureFault, TrustDbError, TrustDbResult, VerificationError,
    VerificationResult,
};
pub use signer::Signer;
pub use trust::{compute_key_id, Key, MemoryTrustDb, Role, TrustDb, TOP_LEVEL_ROLES};
pub use types::{
    KeyDocument, KeyValue, RoleDocument, Signature, SignedEnvelope, TrustManifest, VerifyConfig,
};
pub use verifier::{KeyScheme, ED25519_METHOD};
pub use verify::{verify_signatures, verify_signed, verify_signed_with_config, VerifiedSignatures};

// Canonical payload encoding
pub use canonicalize::{
    canonical_payload_bytes, parse_json_strict, parse_payload_strict, to_canonical_jcs_bytes,
    CanonicalizeError, CanonicalizeResult, MAX_DEPTH, MAX_KEYS_PER_OBJECT, MAX_PAYLOAD_BYTES,
    MAX_SAFE_INTEGER, MAX_STRING_LENGTH, MIN_SAFE_INTEGER,
};
pub use digest::KEY_ID_LENGTH;
