//! Canonical encoding of signed payloads.
//!
//! Signatures are checked over bytes re-derived from the *decoded* payload,
//! never over the bytes received. Two payloads that differ only in key order,
//! whitespace, string escaping, number spelling, or repeated keys canonicalize
//! identically.
//!
//! # Decoding
//!
//! Duplicate keys in an object resolve last-wins (compared after unescaping).
//!
//! The following are **rejected** while decoding:
//! - A top-level payload that is not an object
//! - Trailing data after the payload
//!
//! # Canonical form
//!
//! JCS (RFC 8785) encoding: keys sorted lexicographically by their raw UTF-8
//! bytes (code point order), no insignificant whitespace, ECMAScript number
//! formatting. Any finite double is accepted. An integer beyond ±2^53 must be
//! written exactly as JCS spells the double it rounds to (`10000000000000000`)
//! or it is rejected.
//!
//! # DoS Limits
//!
//! Defaults, overridable through [`VerifyConfig`](crate::VerifyConfig):
//! - Max depth: 50
//! - Max keys per object: 10,000
//! - Max string length: 1MB
//! - Max payload size: 10MB

mod errors;
mod json;
mod strict;


pub use errors::{
    CanonicalizeError, CanonicalizeResult, MAX_DEPTH, MAX_KEYS_PER_OBJECT, MAX_PAYLOAD_BYTES,
    MAX_SAFE_INTEGER, MAX_STRING_LENGTH, MIN_SAFE_INTEGER,
};
pub use json::to_canonical_jcs_bytes;
pub use strict::{parse_json_strict, parse_payload_strict};

use crate::types::VerifyConfig;

/// Decode a raw signed payload and re-encode it canonically.
///
/// This produces the exact message that signatures are computed over.
pub fn canonical_payload_bytes(raw: &str, config: &VerifyConfig) -> CanonicalizeResult<Vec<u8>> {
    let decoded = parse_payload_strict(raw, config)?;
    to_canonical_jcs_bytes(&decoded)
}
