//! Entities (spec §3 "Entity").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{key::Key, value::Value};

/// An opaque record identified by a `Key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub key: Key,
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    #[must_use]
    pub fn new(key: Key) -> Self {
        Self {
            key,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Used by §4.5.2 size estimation to pull `timestamp`/`entity_bytes`
    /// off a statistics row.
    #[must_use]
    pub fn integer_property(&self, name: &str) -> Option<i64> {
        self.properties.get(name).and_then(Value::as_integer)
    }
}
