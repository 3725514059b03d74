//! Partition addressing (spec §3 "Partition", §6 "Partition semantics").

use serde::{Deserialize, Serialize};

/// A `(projectId, databaseId, namespace)` triple.
///
/// An empty/absent namespace denotes the default namespace and must be
/// omitted on the wire rather than sent as an empty string (spec §3/§6).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionId {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
}

impl PartitionId {
    /// `namespace` is normalized: an empty string is treated the same as
    /// `None` and becomes an unset field on the wire.
    #[must_use]
    pub fn new(
        project_id: impl Into<String>,
        database_id: impl Into<String>,
        namespace: Option<impl Into<String>>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            database_id: database_id.into(),
            namespace_id: namespace.map(Into::into).filter(|n: &String| !n.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_namespace_is_omitted_on_the_wire() {
        let p = PartitionId::new("proj", "", Some(""));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"projectId":"proj"}"#);
        assert_eq!(p.namespace_id, None);
    }

    #[test]
    fn nonempty_namespace_is_set() {
        let p = PartitionId::new("proj", "db1", Some("tenant-a"));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"projectId":"proj","databaseId":"db1","namespaceId":"tenant-a"}"#);
    }
}
