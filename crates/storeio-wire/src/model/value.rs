//! Property values.
//!
//! Entities are opaque records (spec §3); the connector never interprets
//! property values beyond the handful of statistics fields it reads
//! (§4.5.2). The wire encoding mirrors a proto `oneof` projected to JSON:
//! a flat struct with exactly one field populated.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::model::int_string::option"
    )]
    pub integer_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<()>,
}

impl Value {
    #[must_use]
    pub fn integer(v: i64) -> Self {
        Self {
            integer_value: Some(v),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn string(v: impl Into<String>) -> Self {
        Self {
            string_value: Some(v.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn double(v: f64) -> Self {
        Self {
            double_value: Some(v),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn boolean(v: bool) -> Self {
        Self {
            boolean_value: Some(v),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn null() -> Self {
        Self {
            null_value: Some(()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        self.integer_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trips_as_a_json_string() {
        let v = Value::integer(1_700_000_000);
        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, r#"{"integerValue":"1700000000"}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_integer(), Some(1_700_000_000));
    }
}
