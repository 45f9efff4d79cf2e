//! Bounded JSON decoding of signed payloads.
//!
//! Duplicate keys resolve last-wins, compared after unescaping (`"a"` and
//! `"\u0061"` are the same key). The decoded value, not the received text,
//! is what gets canonicalized, so a payload with a repeated key verifies
//! exactly like the payload holding only the surviving value.

use std::cell::RefCell;
use std::fmt;

use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value as JsonValue};

use super::errors::{CanonicalizeError, CanonicalizeResult};
use crate::types::VerifyConfig;

/// Parse a JSON document within `config` limits. Duplicate keys: last wins.
pub fn parse_json_strict(content: &str, config: &VerifyConfig) -> CanonicalizeResult<JsonValue> {
    if content.len() > config.max_payload_bytes {
        return Err(CanonicalizeError::InputTooLarge {
            size: content.len(),
            limit: config.max_payload_bytes,
        });
    }

    let ctx = Context {
        config,
        fault: RefCell::new(None),
    };
    let mut de = serde_json::Deserializer::from_str(content);
    let parsed = StrictValue { ctx: &ctx, depth: 0 }
        .deserialize(&mut de)
        .and_then(|value| {
            de.end()?;
            Ok(value)
        });

    // Prefer the typed limit violation over serde's stringly error.
    parsed.map_err(|e| {
        ctx.fault
            .take()
            .unwrap_or_else(|| CanonicalizeError::ParseError {
                message: e.to_string(),
            })
    })
}

/// Parse a signed payload: a JSON document whose top level is an object.
pub fn parse_payload_strict(
    content: &str,
    config: &VerifyConfig,
) -> CanonicalizeResult<JsonValue> {
    let value = parse_json_strict(content, config)?;
    if !value.is_object() {
        return Err(CanonicalizeError::NotAnObject {
            found: kind_of(&value),
        });
    }
    Ok(value)
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

struct Context<'a> {
    config: &'a VerifyConfig,
    fault: RefCell<Option<CanonicalizeError>>,
}

impl Context<'_> {
    /// Record the first typed failure and hand serde an opaque error to unwind with.
    fn fail<E: de::Error>(&self, err: CanonicalizeError) -> E {
        let message = err.to_string();
        self.fault.borrow_mut().get_or_insert(err);
        E::custom(message)
    }

    fn check_string<E: de::Error>(&self, s: &str) -> Result<(), E> {
        let limit = self.config.max_string_length;
        if s.len() > limit {
            return Err(self.fail(CanonicalizeError::StringTooLong {
                length: s.len(),
                limit,
            }));
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct StrictValue<'a> {
    ctx: &'a Context<'a>,
    depth: usize,
}

impl StrictValue<'_> {
    fn nested<E: de::Error>(self) -> Result<Self, E> {
        let depth = self.depth + 1;
        let limit = self.ctx.config.max_depth;
        if depth > limit {
            return Err(self
                .ctx
                .fail(CanonicalizeError::MaxDepthExceeded { depth, limit }));
        }
        Ok(Self {
            ctx: self.ctx,
            depth,
        })
    }
}

impl<'de> DeserializeSeed<'de> for StrictValue<'_> {
    type Value = JsonValue;

    fn deserialize<D>(self, deserializer: D) -> Result<JsonValue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for StrictValue<'_> {
    type Value = JsonValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<JsonValue, E> {
        Ok(JsonValue::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<JsonValue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        self.deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<JsonValue, E> {
        Ok(JsonValue::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<JsonValue, E> {
        Ok(JsonValue::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<JsonValue, E> {
        Number::from_f64(v)
            .map(JsonValue::Number)
            .ok_or_else(|| E::custom(format!("non-finite number: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<JsonValue, E> {
        self.ctx.check_string(v)?;
        Ok(JsonValue::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<JsonValue, E> {
        self.ctx.check_string(&v)?;
        Ok(JsonValue::String(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<JsonValue, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let child = self.nested()?;
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(1_024));
        while let Some(item) = seq.next_element_seed(child)? {
            items.push(item);
        }
        Ok(JsonValue::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<JsonValue, A::Error>
    where
        A: MapAccess<'de>,
    {
        let child = self.nested()?;
        let limit = self.ctx.config.max_keys_per_object;
        let mut object = Map::new();

        while let Some(key) = map.next_key::<String>()? {
            self.ctx.check_string(&key)?;
            let duplicate = object.contains_key(&key);
            if !duplicate && object.len() >= limit {
                return Err(self.ctx.fail(CanonicalizeError::MaxKeysExceeded {
                    count: object.len() + 1,
                    limit,
                }));
            }
            let value = map.next_value_seed(child)?;
            if duplicate {
                tracing::debug!(key = %key, "duplicate payload key, last value wins");
            }
            object.insert(key, value);
        }

        Ok(JsonValue::Object(object))
    }
}
