//! Tests for tolerant decoding and category splitting

use budget_relay::core::{AmountShape, CategoryCodec, ToleranceDecoder, PLACEHOLDER_ICON};
use serde_json::json;

#[test]
fn test_mixed_value_shapes() {
    let map =
        ToleranceDecoder::decode(r#"{"🍔 Food": 100, "🛍️ Shop": "50", "✈️ Travel": true}"#);
    assert_eq!(map.len(), 2);
    assert!((map["🍔 Food"] - 100.0).abs() < f64::EPSILON);
    assert!((map["🛍️ Shop"] - 50.0).abs() < f64::EPSILON);
    assert!(!map.contains_key("✈️ Travel"));
}

#[test]
fn test_non_object_inputs_are_empty() {
    for raw in ["not json", "", "[]", "42", "null", r#""{}""#] {
        assert!(ToleranceDecoder::decode(raw).is_empty(), "input {raw:?}");
    }
}

#[test]
fn test_shapes_classify() {
    assert_eq!(AmountShape::classify(&json!(12)), AmountShape::Integer(12));
    assert_eq!(AmountShape::classify(&json!(12.5)), AmountShape::Float(12.5));
    assert_eq!(AmountShape::classify(&json!(u64::MAX)), AmountShape::Unsigned(u64::MAX));
    assert_eq!(AmountShape::classify(&json!(" 7 ")), AmountShape::NumericText(7.0));
    assert_eq!(AmountShape::classify(&json!("seven")), AmountShape::Unrecognized);
    assert_eq!(AmountShape::classify(&json!(null)), AmountShape::Unrecognized);
}

#[test]
fn test_negative_and_non_finite_amounts_dropped() {
    let map = ToleranceDecoder::decode(r#"{"a": -5, "b": "NaN", "c": "inf", "d": 0}"#);
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["d"]);
}

#[test]
fn test_out_of_range_number_drops_only_that_entry() {
    let map = ToleranceDecoder::decode(
        r#"{"🍔 Food": 100, "💰 Savings": 1e400, "🚗 Car": "1e400"}"#,
    );
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["🍔 Food"]);
    assert!((map["🍔 Food"] - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_codec_split() {
    assert_eq!(
        CategoryCodec::split("🍔 Food"),
        ("🍔".to_string(), "Food".to_string())
    );
    assert_eq!(
        CategoryCodec::split("Food"),
        (PLACEHOLDER_ICON.to_string(), "Food".to_string())
    );
}
