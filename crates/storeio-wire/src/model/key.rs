//! Keys and path elements (spec §3 "Entity"/"Key").

use serde::{Deserialize, Serialize};

use crate::model::partition::PartitionId;

/// One segment of a key's path.
///
/// A segment is *complete* once it carries a non-zero `id` or a
/// non-empty `name`; the connector never synthesizes either, it only
/// validates completeness (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathElement {
    pub kind: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::model::int_string::option"
    )]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PathElement {
    #[must_use]
    pub fn with_id(kind: impl Into<String>, id: i64) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id),
            name: None,
        }
    }

    #[must_use]
    pub fn with_name(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            name: Some(name.into()),
        }
    }

    /// An id/name-less placeholder path element, never valid on its own
    /// as the leaf of a key but useful as an ancestor-path constructor
    /// argument in tests.
    #[must_use]
    pub fn incomplete(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            name: None,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.id {
            Some(id) => id != 0,
            None => matches!(&self.name, Some(name) if !name.is_empty()),
        }
    }
}

/// An ordered path of `PathElement`s scoped to a `Partition`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub partition_id: PartitionId,
    pub path: Vec<PathElement>,
}

impl Key {
    #[must_use]
    pub fn new(partition_id: PartitionId, path: Vec<PathElement>) -> Self {
        Self { partition_id, path }
    }

    /// A key is complete iff its last path element is complete (spec §3).
    /// A key with an empty path is never complete.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.path.last().is_some_and(PathElement::is_complete)
    }

    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.path.last().map(|e| e.kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition() -> PartitionId {
        PartitionId::new("proj", "", None::<String>)
    }

    #[test]
    fn id_path_element_is_complete_iff_nonzero() {
        assert!(PathElement::with_id("Task", 1).is_complete());
        assert!(!PathElement::with_id("Task", 0).is_complete());
    }

    #[test]
    fn name_path_element_is_complete_iff_nonempty() {
        assert!(PathElement::with_name("Task", "a").is_complete());
        assert!(!PathElement::with_name("Task", "").is_complete());
    }

    #[test]
    fn key_completeness_follows_last_element() {
        let key = Key::new(
            partition(),
            vec![PathElement::incomplete("Ancestor"), PathElement::with_id("Task", 5)],
        );
        assert!(key.is_complete());

        let incomplete = Key::new(partition(), vec![PathElement::incomplete("Task")]);
        assert!(!incomplete.is_complete());
    }

    #[test]
    fn empty_path_is_incomplete() {
        let key = Key::new(partition(), vec![]);
        assert!(!key.is_complete());
    }
}
