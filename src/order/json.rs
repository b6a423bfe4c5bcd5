use alloy_primitives::U256;
use serde::{de, Deserialize, Deserializer, Serializer};
use serde_json::{Map, Value};

use super::types::Order;

/// Parse an unsigned integer from a decimal or `0x`-prefixed hex string.
pub fn parse_u256(input: &str) -> Result<U256, String> {
    let s = input.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16),
        Some(_) => return Err(format!("'{}' has no hex digits", input)),
        None if s.is_empty() => return Err("empty integer".to_string()),
        None => U256::from_str_radix(s, 10),
    };
    parsed.map_err(|e| format!("'{}' is not an unsigned integer: {}", input, e))
}

/// Hex payload of an ethers BigNumber, serialized either as
/// `{"type":"BigNumber","hex":"0x.."}` or `{"_hex":"0x.."}`.
fn big_number_hex(map: &Map<String, Value>) -> Option<&str> {
    if map.get("type").and_then(Value::as_str) == Some("BigNumber") {
        if let Some(hex) = map.get("hex").and_then(Value::as_str) {
            return Some(hex);
        }
    }
    map.get("_hex").and_then(Value::as_str)
}

/// Read an integer out of any JSON shape an order field shows up in.
pub fn value_to_u256(value: &Value) -> Result<U256, String> {
    match value {
        Value::String(s) => parse_u256(s),
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{} is not an unsigned integer", n)),
        Value::Object(map) => match big_number_hex(map) {
            Some(hex) => parse_u256(hex),
            None => Err("object is not a BigNumber".to_string()),
        },
        other => Err(format!("expected an integer, got {}", other)),
    }
}

/// Replace every BigNumber-shaped object with its decimal string, recursively.
/// Everything else is kept as is, so applying it twice changes nothing.
pub fn normalize_json(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(hex) = big_number_hex(&map) {
                return match parse_u256(hex) {
                    Ok(n) => Value::String(n.to_string()),
                    Err(_) => Value::String(hex.to_string()),
                };
            }
            Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, normalize_json(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_json).collect()),
        other => other,
    }
}

/// Transport form of a signed order: plain JSON with every integer field as a
/// decimal string, so nothing is lost when the backend stores it.
pub fn to_json_safe(order: &Order) -> Result<Value, serde_json::Error> {
    serde_json::to_value(order).map(normalize_json)
}

/// Serde adapter: U256 as a decimal string out, any integer shape in.
pub mod u256_dec {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let value = Value::deserialize(deserializer)?;
        value_to_u256(&value).map_err(de::Error::custom)
    }
}

/// Small enum discriminants may arrive as numbers or numeric strings.
pub(crate) fn deserialize_u8<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let n = value_to_u256(&value).map_err(de::Error::custom)?;
    u8::try_from(n).map_err(|_| de::Error::custom(format!("{} does not fit in u8", n)))
}
