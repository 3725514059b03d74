//! Mutations (spec §3 "Mutation").
//!
//! The connector only ever constructs the two idempotent variants,
//! `upsert` and `delete`; `insert`/`update` exist on the Store's wire
//! format but this crate has no constructor for them.

use serde::{Deserialize, Serialize};

use crate::model::{entity::Entity, key::Key};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mutation {
    #[serde(rename = "upsert")]
    Upsert(Entity),
    #[serde(rename = "delete")]
    Delete(Key),
}

impl Mutation {
    #[must_use]
    pub const fn key(&self) -> &Key {
        match self {
            Self::Upsert(entity) => &entity.key,
            Self::Delete(key) => key,
        }
    }

    /// Approximate wire size in bytes, used by the batching writer's byte
    /// ceiling (spec §4.6.2). Computed from the JSON encoding since this
    /// crate has no protobuf serializer.
    #[must_use]
    pub fn serialized_size(&self) -> u64 {
        serde_json::to_vec(self).map_or(0, |v| v.len() as u64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitMode {
    NonTransactional,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Key>,
}
