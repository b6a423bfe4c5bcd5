use serde_json::Value;

use super::json::normalize_json;
use super::types::Order;
use crate::error::MarketError;

/// Pull a usable signed order out of whatever the backend stored.
///
/// Accepts an object, a JSON-encoded string, or either of those wrapped in an
/// `order` key. The result must carry well-formed `parameters`.
pub fn extract_order(raw: Option<&Value>) -> Result<Order, MarketError> {
    let raw = match raw {
        Some(Value::Null) | None => {
            return Err(MarketError::MalformedOrder(
                "token is not listed for sale".to_string(),
            ))
        }
        Some(v) => v,
    };

    let mut value = decode_layer(raw)?;
    if let Some(inner) = value.get("order") {
        value = decode_layer(inner)?;
    }

    if !value.get("parameters").is_some_and(Value::is_object) {
        return Err(MarketError::MalformedOrder(
            "stored order has no parameters".to_string(),
        ));
    }

    serde_json::from_value(normalize_json(value))
        .map_err(|e| MarketError::MalformedOrder(format!("bad order parameters: {}", e)))
}

fn decode_layer(value: &Value) -> Result<Value, MarketError> {
    match value {
        Value::String(text) => serde_json::from_str(text).map_err(|e| {
            MarketError::MalformedOrder(format!("stored order is not valid JSON: {}", e))
        }),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::to_json_safe;
    use crate::testkit::sample_order;
    use serde_json::json;

    #[test]
    fn test_extract_plain_object() {
        let order = sample_order();
        let raw = to_json_safe(&order).unwrap();
        assert_eq!(extract_order(Some(&raw)).unwrap(), order);
    }

    #[test]
    fn test_extract_from_json_string() {
        let order = sample_order();
        let text = serde_json::to_string(&to_json_safe(&order).unwrap()).unwrap();
        let raw = Value::String(text);
        assert_eq!(extract_order(Some(&raw)).unwrap(), order);
    }

    #[test]
    fn test_extract_nested_under_order_key() {
        let order = sample_order();
        let raw = json!({ "order": to_json_safe(&order).unwrap(), "orderHash": "0x00" });
        assert_eq!(extract_order(Some(&raw)).unwrap(), order);
    }

    #[test]
    fn test_extract_with_big_number_fields() {
        let order = sample_order();
        let mut raw = to_json_safe(&order).unwrap();
        raw["parameters"]["salt"] = json!({"type": "BigNumber", "hex": "0x2a"});

        let parsed = extract_order(Some(&raw)).unwrap();
        assert_eq!(parsed.parameters.salt, alloy_primitives::U256::from(42));
    }

    #[test]
    fn test_missing_order_is_malformed() {
        for raw in [None, Some(Value::Null)] {
            let err = extract_order(raw.as_ref()).unwrap_err();
            assert!(matches!(err, MarketError::MalformedOrder(_)));
        }
    }

    #[test]
    fn test_missing_parameters_is_malformed() {
        let raw = json!({"signature": "0x"});
        assert!(matches!(
            extract_order(Some(&raw)),
            Err(MarketError::MalformedOrder(_))
        ));

        let raw = Value::String("not json".to_string());
        assert!(matches!(
            extract_order(Some(&raw)),
            Err(MarketError::MalformedOrder(_))
        ));

        let raw = json!({"parameters": {"offerer": "nope"}});
        assert!(matches!(
            extract_order(Some(&raw)),
            Err(MarketError::MalformedOrder(_))
        ));
    }
}
