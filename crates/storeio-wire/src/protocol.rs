//! `RunQuery`, `Commit` and `SplitQuery` request/response envelopes
//! (spec §6 "Store RPC surface").

use serde::{Deserialize, Serialize};

use crate::model::{CommitMode, Entity, Mutation, MutationResult, PartitionId, Query};

/// Whether a result batch is the tail of the query's result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoreResultsType {
    NotFinished,
    MoreResultsAfterLimit,
    MoreResultsAfterCursor,
    NoMoreResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityResult {
    pub entity: Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResultBatch {
    #[serde(default)]
    pub entity_results: Vec<EntityResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    pub more_results: MoreResultsType,
}

/// `readOptions.readTime` carries a caller-supplied snapshot timestamp
/// (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlQuery {
    pub query_string: String,
    #[serde(default)]
    pub allow_literals: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_id: String,
    pub partition_id: PartitionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gql_query: Option<GqlQuery>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_options: Option<ReadOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub batch: QueryResultBatch,
    /// The structured query the Store executed — echoed back so GQL
    /// translation (spec §4.5.1) can extract it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Query>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_id: String,
    pub mode: CommitMode,
    pub mutations: Vec<Mutation>,
}

/// §6: the response's serialized size is what gets reported as the
/// `WriteSuccessSummary`'s byte count, so the transport stamps
/// `serialized_size_bytes` after deserializing the raw body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResponse {
    #[serde(default)]
    pub mutation_results: Vec<MutationResult>,
    #[serde(skip)]
    pub serialized_size_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitQueryRequest {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database_id: String,
    pub partition_id: PartitionId,
    pub query: Query,
    pub num_splits: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitQueryResponse {
    #[serde(default)]
    pub splits: Vec<Query>,
}
