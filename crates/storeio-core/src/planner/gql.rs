//! GQL-to-structured-query translation (spec §4.5.1).

use std::sync::Arc;

use storeio_error::{StatusCode, StoreError};
use storeio_wire::model::{PartitionId, Query};
use storeio_wire::protocol::{GqlQuery, RunQueryRequest};
use storeio_wire::StoreClient;

/// Translates a textual GQL query into a structured [`Query`] by issuing
/// a `RunQuery` with `LIMIT 0` appended and reading back the server-echoed
/// structured query. If the server rejects the augmented text with
/// `INVALID_ARGUMENT` (read as "the text already has a limit"), retries
/// once without the suffix.
pub async fn translate(
    client: &Arc<dyn StoreClient>,
    project_id: &str,
    database_id: &str,
    partition_id: &PartitionId,
    gql: &str,
) -> Result<Query, StoreError> {
    match run_gql(client, project_id, database_id, partition_id, &format!("{gql} LIMIT 0")).await {
        Ok(query) => Ok(query),
        Err(err) if err.code == StatusCode::InvalidArgument => {
            run_gql(client, project_id, database_id, partition_id, gql).await
        }
        Err(err) => Err(err),
    }
}

async fn run_gql(
    client: &Arc<dyn StoreClient>,
    project_id: &str,
    database_id: &str,
    partition_id: &PartitionId,
    query_string: &str,
) -> Result<Query, StoreError> {
    let request = RunQueryRequest {
        project_id: project_id.to_string(),
        database_id: database_id.to_string(),
        partition_id: partition_id.clone(),
        query: None,
        gql_query: Some(GqlQuery { query_string: query_string.to_string(), allow_literals: true }),
        read_options: None,
    };
    let response = client.run_query(request).await?;
    response
        .query
        .ok_or_else(|| StoreError::new(StatusCode::Internal, "server did not echo a structured query"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeio_wire::testing::InMemoryStoreClient;

    fn partition() -> PartitionId {
        PartitionId::new("proj", "", None::<String>)
    }

    #[tokio::test]
    async fn translates_a_plain_gql_query() {
        let fake: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
        let query = translate(&fake, "proj", "", &partition(), "SELECT * FROM Task")
            .await
            .unwrap();
        assert_eq!(query.single_kind(), Some("Task"));
    }

    #[tokio::test]
    async fn retries_once_without_the_limit_suffix_on_invalid_argument() {
        let fake = InMemoryStoreClient::new();
        fake.queue_gql_outcomes([
            Err(StoreError::new(StatusCode::InvalidArgument, "already has a limit")),
            Ok(()),
        ]);
        let fake: Arc<dyn StoreClient> = Arc::new(fake);
        let query = translate(&fake, "proj", "", &partition(), "SELECT * FROM Task LIMIT 5")
            .await
            .unwrap();
        assert_eq!(query.single_kind(), Some("Task"));
    }

    #[tokio::test]
    async fn other_error_codes_propagate_without_retry() {
        let fake = InMemoryStoreClient::new();
        fake.queue_gql_outcomes([Err(StoreError::new(StatusCode::Unavailable, "down"))]);
        let fake: Arc<dyn StoreClient> = Arc::new(fake);
        let err = translate(&fake, "proj", "", &partition(), "SELECT * FROM Task")
            .await
            .unwrap_err();
        assert_eq!(err.code, StatusCode::Unavailable);
    }
}
