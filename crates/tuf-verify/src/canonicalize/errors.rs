//! Canonicalization error types and limits.

use crate::error::VerificationError;

/// Maximum nesting depth for payload structures.
pub const MAX_DEPTH: usize = 50;

/// Maximum number of keys in a single object.
pub const MAX_KEYS_PER_OBJECT: usize = 10_000;

/// Maximum string length (1MB).
pub const MAX_STRING_LENGTH: usize = 1_024 * 1_024;

/// Maximum raw payload size (10MB).
pub const MAX_PAYLOAD_BYTES: usize = 10 * 1_024 * 1_024;

/// Maximum safe integer value (2^53 for JCS compatibility).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_992; // 2^53

/// Minimum safe integer value (-2^53 for JCS compatibility).
pub const MIN_SAFE_INTEGER: i64 = -9_007_199_254_740_992; // -2^53

/// Errors specific to canonicalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizeError {
    /// Top-level payload is not an object.
    NotAnObject { found: &'static str },

    /// Integer beyond ±2^53 that no double spells exactly.
    IntegerOutOfRange { value: String },

    /// Nesting too deep.
    MaxDepthExceeded { depth: usize, limit: usize },

    /// Too many keys in object.
    MaxKeysExceeded { count: usize, limit: usize },

    /// String too long.
    StringTooLong { length: usize, limit: usize },

    /// Payload too large.
    InputTooLarge { size: usize, limit: usize },

    /// JSON parse error.
    ParseError { message: String },

    /// Canonical serialization error.
    SerializeError { message: String },
}

impl std::fmt::Display for CanonicalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject { found } => write!(f, "payload must be an object, got {}", found),
            Self::IntegerOutOfRange { value } => {
                write!(f, "integer {} has no exact double form beyond ±2^53", value)
            }
            Self::MaxDepthExceeded { depth, limit } => {
                write!(f, "nesting depth {} exceeds limit {}", depth, limit)
            }
            Self::MaxKeysExceeded { count, limit } => {
                write!(f, "object has {} keys, exceeds limit {}", count, limit)
            }
            Self::StringTooLong { length, limit } => {
                write!(f, "string length {} exceeds limit {}", length, limit)
            }
            Self::InputTooLarge { size, limit } => {
                write!(f, "payload size {} exceeds limit {}", size, limit)
            }
            Self::ParseError { message } => write!(f, "JSON parse error: {}", message),
            Self::SerializeError { message } => write!(f, "JCS serialize error: {}", message),
        }
    }
}

impl std::error::Error for CanonicalizeError {}

/// Result type for canonicalization operations.
pub type CanonicalizeResult<T> = Result<T, CanonicalizeError>;

impl From<CanonicalizeError> for VerificationError {
    fn from(err: CanonicalizeError) -> Self {
        VerificationError::Decode {
            message: format!("canonicalization failed: {}", err),
        }
    }
}
