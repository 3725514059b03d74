//! `int64`-as-JSON-string (de)serialization.
//!
//! The Store's proto messages map `int64` fields to JSON strings to avoid
//! precision loss in clients whose JSON numbers are IEEE-754 doubles —
//! the same convention Google's other proto-over-JSON APIs use. This
//! module provides the `serde(with = ...)` helper for the `Option<i64>`
//! fields the wire model actually carries.

pub mod option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => v.to_string().serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<i64>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| s.parse().map_err(serde::de::Error::custom))
            .transpose()
    }
}
