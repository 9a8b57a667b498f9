//! Tolerant decoding of category → amount blobs.
//!
//! Object-level failure yields an empty map; entry-level failure drops only
//! that entry. Callers treat a missing category as zero.

use std::collections::BTreeMap;

use serde_json::value::RawValue;
use serde_json::Value;

/// Category string → amount, iterated in ascending lexical order.
pub type AmountMap = BTreeMap<String, f64>;

/// Every value shape the decoder knows about, in coercion order.
#[derive(Debug, Clone, PartialEq)]
pub enum AmountShape {
    /// JSON number with a fractional part or exponent.
    Float(f64),
    /// JSON integer that fits in `i64`.
    Integer(i64),
    /// JSON integer above `i64::MAX`.
    Unsigned(u64),
    /// String holding a decimal number, e.g. `"50"` or `" 12.5 "`.
    NumericText(f64),
    /// Anything else: bools, null, arrays, objects, non-numeric text.
    Unrecognized,
}

impl AmountShape {
    /// Classify a raw JSON value.
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Unsigned(u)
                } else {
                    n.as_f64().map_or(Self::Unrecognized, Self::Float)
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map_or(Self::Unrecognized, Self::NumericText),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => Self::Unrecognized,
        }
    }

    /// The amount carried by this shape, if it is a usable amount.
    ///
    /// Amounts must be finite and non-negative.
    #[allow(clippy::cast_precision_loss)]
    pub fn amount(&self) -> Option<f64> {
        let raw = match *self {
            Self::Float(f) | Self::NumericText(f) => f,
            Self::Integer(i) => i as f64,
            Self::Unsigned(u) => u as f64,
            Self::Unrecognized => return None,
        };
        (raw.is_finite() && raw >= 0.0).then_some(raw)
    }
}

/// Decoder for the budgets/spent blobs written by the host application.
pub struct ToleranceDecoder;

impl ToleranceDecoder {
    /// Decode `text` into an [`AmountMap`]. Never fails.
    pub fn decode(text: &str) -> AmountMap {
        // Values stay raw until per-entry parsing; a bad entry must not empty the map.
        let Ok(object) = serde_json::from_str::<BTreeMap<String, Box<RawValue>>>(text) else {
            tracing::debug!("amount blob is not a JSON object; using empty map");
            return AmountMap::new();
        };

        let mut out = AmountMap::new();
        for (category, raw) in object {
            let shape = serde_json::from_str::<Value>(raw.get())
                .map_or(AmountShape::Unrecognized, |value| AmountShape::classify(&value));
            match shape.amount() {
                Some(amount) => {
                    out.insert(category, amount);
                }
                None => tracing::debug!(%category, "dropping entry with unrecognized amount"),
            }
        }
        out
    }
}
