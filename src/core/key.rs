//! Hashable cell values used for grouping and joining.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A single value of a key column.
///
/// Keys are totally ordered so that grouped output is deterministic: within a
/// column every value has the same variant, so ordering reduces to ordering of
/// the wrapped values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeyValue {
    Integer(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl KeyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            KeyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            KeyValue::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Integer(v) => write!(f, "{}", v),
            KeyValue::Text(s) => f.write_str(s),
            KeyValue::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::Text(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Integer(value)
    }
}

impl From<DateTime<Utc>> for KeyValue {
    fn from(value: DateTime<Utc>) -> Self {
        KeyValue::Timestamp(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn key_values_display_compactly() {
        assert_eq!(KeyValue::from("north").to_string(), "north");
        assert_eq!(KeyValue::from(2024).to_string(), "2024");
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        assert_eq!(KeyValue::from(ts).to_string(), "2024-03-04");
    }

    #[test]
    fn key_values_order_within_variant() {
        assert!(KeyValue::from(1) < KeyValue::from(2));
        assert!(KeyValue::from("a") < KeyValue::from("b"));
        assert_eq!(KeyValue::from("x").as_text(), Some("x"));
        assert_eq!(KeyValue::from(7).as_integer(), Some(7));
        assert_eq!(KeyValue::from("x").as_integer(), None);
    }
}
