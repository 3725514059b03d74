//! Dataset size estimation from the Store's statistics tables (spec §4.5.2).

use std::sync::Arc;

use storeio_error::StoreError;
use storeio_wire::model::{
    CompositeFilter, CompositeOp, Filter, PartitionId, PropertyFilter, PropertyFilterOp,
    SortDirection, Value,
};
use storeio_wire::protocol::RunQueryRequest;
use storeio_wire::StoreClient;

/// Outcome of a size-estimation attempt. Distinguishes "the statistics
/// tables had no row yet" (never fatal, spec §7) from a genuine RPC error.
#[derive(Debug)]
pub enum EstimateError {
    /// The `__Stat_Total__`/`__Stat_Kind__` query returned no rows.
    Unavailable,
    Store(StoreError),
}

impl From<StoreError> for EstimateError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Estimates the on-disk byte size of kind `kind` by reading the two
/// statistics snapshots described in spec §4.5.2.
pub async fn estimate_size_bytes(
    client: &Arc<dyn StoreClient>,
    project_id: &str,
    database_id: &str,
    partition_id: &PartitionId,
    kind: &str,
) -> Result<u64, EstimateError> {
    let namespaced = partition_id.namespace_id.is_some();
    let total_kind = if namespaced { "__Stat_Ns_Total__" } else { "__Stat_Total__" };
    let kind_stat_kind = if namespaced { "__Stat_Ns_Kind__" } else { "__Stat_Kind__" };

    let total_query = storeio_wire::model::Query::for_kind(total_kind)
        .order_by("timestamp", SortDirection::Descending)
        .limit(1);
    let total_entity = run_single(client, project_id, database_id, partition_id, total_query)
        .await?
        .ok_or(EstimateError::Unavailable)?;
    let timestamp_secs =
        total_entity.integer_property("timestamp").ok_or(EstimateError::Unavailable)?;
    let timestamp_micros = timestamp_secs.saturating_mul(1_000_000);

    let kind_query = storeio_wire::model::Query::for_kind(kind_stat_kind)
        .filter(Filter::Composite(CompositeFilter {
            op: CompositeOp::And,
            filters: vec![
                Filter::Property(PropertyFilter {
                    property: "kind_name".into(),
                    op: PropertyFilterOp::Equal,
                    value: Value::string(kind),
                }),
                Filter::Property(PropertyFilter {
                    property: "timestamp".into(),
                    op: PropertyFilterOp::Equal,
                    value: Value::integer(timestamp_micros),
                }),
            ],
        }))
        .limit(1);
    let kind_entity = run_single(client, project_id, database_id, partition_id, kind_query)
        .await?
        .ok_or(EstimateError::Unavailable)?;
    let entity_bytes =
        kind_entity.integer_property("entity_bytes").ok_or(EstimateError::Unavailable)?;
    #[allow(clippy::cast_sign_loss)]
    Ok(entity_bytes.max(0) as u64)
}

async fn run_single(
    client: &Arc<dyn StoreClient>,
    project_id: &str,
    database_id: &str,
    partition_id: &PartitionId,
    query: storeio_wire::model::Query,
) -> Result<Option<storeio_wire::model::Entity>, StoreError> {
    let request = RunQueryRequest {
        project_id: project_id.to_string(),
        database_id: database_id.to_string(),
        partition_id: partition_id.clone(),
        query: Some(query),
        gql_query: None,
        read_options: None,
    };
    let response = client.run_query(request).await?;
    Ok(response.batch.entity_results.into_iter().next().map(|r| r.entity))
}

/// A convenience wrapper mapping RPC-level errors onto
/// [`storeio_error::ConfigError::WrongKindCount`]-adjacent statistics
/// failures: unused by the estimator itself, kept for callers that want
/// a uniform `StoreError` view (e.g. logging).
#[must_use]
pub fn as_store_error(err: &EstimateError) -> Option<&StoreError> {
    match err {
        EstimateError::Unavailable => None,
        EstimateError::Store(e) => Some(e),
    }
}
