//! JCS (JSON Canonicalization Scheme) encoding.

use serde_json::Value as JsonValue;

use super::errors::{CanonicalizeError, CanonicalizeResult, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};

/// Convert a JSON value to JCS (JSON Canonicalization Scheme) bytes.
///
/// JCS (RFC 8785) produces deterministic JSON output by:
/// - Sorting object keys lexicographically by their raw UTF-8 bytes (code point order)
/// - No whitespace
/// - ECMAScript number formatting (`1.0` → `1`, `1e2` → `100`, `1e16` → `10000000000000000`)
///
/// Every finite double is accepted. An integer beyond ±2^53 is accepted only
/// when its digits are exactly the ECMAScript spelling of the double it rounds
/// to; any other such integer would be signed under a different value than the
/// one received.
pub fn to_canonical_jcs_bytes(value: &JsonValue) -> CanonicalizeResult<Vec<u8>> {
    check_exact_numbers(value)?;

    serde_jcs::to_vec(value).map_err(|e| CanonicalizeError::SerializeError {
        message: e.to_string(),
    })
}

fn check_exact_numbers(value: &JsonValue) -> CanonicalizeResult<()> {
    match value {
        JsonValue::Number(n) => {
            let exact = if let Some(i) = n.as_i64() {
                (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&i)
                    || spelled_as_double(i as f64, &i.to_string())
            } else if let Some(u) = n.as_u64() {
                u <= MAX_SAFE_INTEGER as u64 || spelled_as_double(u as f64, &u.to_string())
            } else {
                true
            };
            if !exact {
                return Err(CanonicalizeError::IntegerOutOfRange {
                    value: n.to_string(),
                });
            }
            Ok(())
        }
        JsonValue::Array(items) => items.iter().try_for_each(check_exact_numbers),
        JsonValue::Object(map) => map.values().try_for_each(check_exact_numbers),
        JsonValue::Null | JsonValue::Bool(_) | JsonValue::String(_) => Ok(()),
    }
}

// True when `digits` is how JCS writes `double`, so the integer and the double
// canonicalize to the same bytes.
fn spelled_as_double(double: f64, digits: &str) -> bool {
    serde_jcs::to_string(&double).is_ok_and(|spelled| spelled == digits)
}
