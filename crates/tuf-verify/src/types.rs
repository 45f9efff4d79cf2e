//! Wire types for signed metadata documents and verifier configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::canonicalize::{MAX_DEPTH, MAX_KEYS_PER_OBJECT, MAX_PAYLOAD_BYTES, MAX_STRING_LENGTH};
use crate::error::{VerificationError, VerificationResult};

/// A signed metadata document as it arrives over the wire.
///
/// ```json
/// {"signed": {...}, "signatures": [{"keyid": "...", "method": "ed25519", "sig": "..."}]}
/// ```
///
/// The payload is kept as raw JSON text. It is only decoded (strictly) and
/// canonicalized during verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEnvelope {
    /// Raw signed payload.
    pub signed: Box<RawValue>,

    /// Signatures, in the order they were listed.
    pub signatures: Vec<Signature>,
}

impl SignedEnvelope {
    /// Create an unsigned envelope around a serializable payload.
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> serde_json::Result<Self> {
        Ok(Self {
            signed: serde_json::value::to_raw_value(payload)?,
            signatures: Vec::new(),
        })
    }

    /// Create an unsigned envelope around raw payload JSON, preserving its text.
    pub fn from_raw_payload(json: impl Into<String>) -> serde_json::Result<Self> {
        Ok(Self {
            signed: RawValue::from_string(json.into())?,
            signatures: Vec::new(),
        })
    }

    /// Decode an envelope from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> VerificationResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| VerificationError::Decode {
            message: format!("invalid signed envelope: {}", e),
        })
    }

    /// Encode the envelope to its JSON wire form.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// The raw payload text.
    pub fn payload(&self) -> &str {
        self.signed.get()
    }
}

/// A detached signature over a canonical payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Key ID.
    #[serde(rename = "keyid")]
    pub key_id: String,

    /// Signature method (e.g., "ed25519").
    pub method: String,

    /// Hex-encoded signature bytes.
    #[serde(rename = "sig", with = "hex::serde")]
    pub signature: Vec<u8>,
}

/// Public key as published in a trust manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDocument {
    /// Key type (always "ed25519" for now).
    pub keytype: String,

    /// Key material.
    pub keyval: KeyValue,
}

/// Public key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Hex-encoded public key.
    #[serde(with = "hex::serde")]
    pub public: Vec<u8>,
}

/// Role policy as published in a trust manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDocument {
    /// Key IDs authorized to sign for the role.
    #[serde(rename = "keyids")]
    pub key_ids: Vec<String>,

    /// Number of distinct authorized keys required.
    pub threshold: u64,
}

/// Keys and roles of a root-style trust manifest.
///
/// Other root fields (version, expiry, ...) are ignored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrustManifest {
    /// Key ID -> key.
    #[serde(default)]
    pub keys: BTreeMap<String, KeyDocument>,

    /// Role name -> role.
    #[serde(default)]
    pub roles: BTreeMap<String, RoleDocument>,
}

/// Verifier configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Maximum raw payload size in bytes.
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,

    /// Maximum nesting depth of the payload.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum number of keys in a single payload object.
    #[serde(default = "default_max_keys_per_object")]
    pub max_keys_per_object: usize,

    /// Maximum length in bytes of any payload string or key.
    #[serde(default = "default_max_string_length")]
    pub max_string_length: usize,
}

fn default_max_payload_bytes() -> usize {
    MAX_PAYLOAD_BYTES
}

fn default_max_depth() -> usize {
    MAX_DEPTH
}

fn default_max_keys_per_object() -> usize {
    MAX_KEYS_PER_OBJECT
}

fn default_max_string_length() -> usize {
    MAX_STRING_LENGTH
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload_bytes(),
            max_depth: default_max_depth(),
            max_keys_per_object: default_max_keys_per_object(),
            max_string_length: default_max_string_length(),
        }
    }
}

impl VerifyConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `TUF_VERIFY_MAX_PAYLOAD_BYTES` | Maximum raw payload size |
    /// | `TUF_VERIFY_MAX_DEPTH` | Maximum payload nesting depth |
    /// | `TUF_VERIFY_MAX_KEYS_PER_OBJECT` | Maximum keys per payload object |
    /// | `TUF_VERIFY_MAX_STRING_LENGTH` | Maximum payload string length |
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        Self {
            max_payload_bytes: env_usize("TUF_VERIFY_MAX_PAYLOAD_BYTES")
                .unwrap_or_else(default_max_payload_bytes),
            max_depth: env_usize("TUF_VERIFY_MAX_DEPTH").unwrap_or_else(default_max_depth),
            max_keys_per_object: env_usize("TUF_VERIFY_MAX_KEYS_PER_OBJECT")
                .unwrap_or_else(default_max_keys_per_object),
            max_string_length: env_usize("TUF_VERIFY_MAX_STRING_LENGTH")
                .unwrap_or_else(default_max_string_length),
        }
    }

    /// Set the maximum payload size.
    pub fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }

    /// Set the maximum nesting depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum number of keys per object.
    pub fn with_max_keys_per_object(mut self, keys: usize) -> Self {
        self.max_keys_per_object = keys;
        self
    }

    /// Set the maximum string length.
    pub fn with_max_string_length(mut self, length: usize) -> Self {
        self.max_string_length = length;
        self
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
