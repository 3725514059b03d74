//! Cursor-driven paginated read over a single split query (spec §4.5.5, §4.5.6).

use std::sync::Arc;

use storeio_error::{StatusCode, StoreError};
use storeio_wire::backoff::{retry, RetryPolicy, TokioSleeper};
use storeio_wire::model::{Entity, PartitionId, Query};
use storeio_wire::protocol::{MoreResultsType, ReadOptions, RunQueryRequest};
use storeio_wire::StoreClient;

const PAGE_SIZE: i32 = 500;

/// Reads every entity matched by `query`, paginating with a server cursor
/// until the user limit (if any) is exhausted or the Store reports no
/// more results. Retries each page with the shared backoff policy,
/// propagating non-retryable and retry-exhausted errors immediately.
pub async fn read_split(
    client: &Arc<dyn StoreClient>,
    project_id: &str,
    database_id: &str,
    partition_id: &PartitionId,
    query: Query,
    read_options: Option<ReadOptions>,
) -> Result<Vec<Entity>, StoreError> {
    let mut remaining = query.limit;
    let mut cursor: Option<String> = query.start_cursor.clone();
    let mut entities = Vec::new();
    let policy = RetryPolicy::spec_default();
    let sleeper = TokioSleeper;

    loop {
        if let Some(r) = remaining {
            if r <= 0 {
                break;
            }
        }

        let page_limit = remaining.map_or(PAGE_SIZE, |r| r.min(PAGE_SIZE));
        let mut page_query = query.clone();
        page_query.limit = Some(page_limit);
        page_query.start_cursor = cursor.clone();

        let request = RunQueryRequest {
            project_id: project_id.to_string(),
            database_id: database_id.to_string(),
            partition_id: partition_id.clone(),
            query: Some(page_query),
            gql_query: None,
            read_options: read_options.clone(),
        };

        let response = retry(policy, &sleeper, |_attempt| {
            let client = Arc::clone(client);
            let request = request.clone();
            async move { client.run_query(request).await }
        })
        .await?;

        #[allow(clippy::cast_possible_wrap)]
        let returned = response.batch.entity_results.len() as i32;
        if let Some(r) = remaining {
            if returned > r {
                return Err(StoreError::new(
                    StatusCode::Internal,
                    format!("store returned {returned} entities, exceeding the remaining user limit of {r}"),
                ));
            }
            remaining = Some(r - returned);
        }
        cursor = response.batch.end_cursor;
        let keep_going = remaining.is_none_or(|r| r > 0)
            && (returned == PAGE_SIZE || response.batch.more_results == MoreResultsType::NotFinished);

        entities.extend(response.batch.entity_results.into_iter().map(|r| r.entity));

        if !keep_going {
            break;
        }
    }

    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeio_wire::model::{Key, PathElement, Value};
    use storeio_wire::testing::InMemoryStoreClient;

    fn partition() -> PartitionId {
        PartitionId::new("proj", "", None::<String>)
    }

    fn seed_entities(fake: &InMemoryStoreClient, kind: &str, n: i64) {
        for i in 0..n {
            let key = Key::new(partition(), vec![PathElement::with_id(kind, i + 1)]);
            fake.seed(Entity::new(key).with_property("i", Value::integer(i)));
        }
    }

    #[tokio::test]
    async fn reads_fewer_entities_than_a_page_in_one_round_trip() {
        let fake = InMemoryStoreClient::new();
        seed_entities(&fake, "Task", 10);
        let fake: Arc<dyn StoreClient> = Arc::new(fake);

        let entities =
            read_split(&fake, "proj", "", &partition(), Query::for_kind("Task"), None)
                .await
                .unwrap();
        assert_eq!(entities.len(), 10);
    }

    #[tokio::test]
    async fn paginates_across_more_than_one_page() {
        let fake = InMemoryStoreClient::new();
        seed_entities(&fake, "Task", 1_200);
        let fake: Arc<dyn StoreClient> = Arc::new(fake);

        let entities =
            read_split(&fake, "proj", "", &partition(), Query::for_kind("Task"), None)
                .await
                .unwrap();
        assert_eq!(entities.len(), 1_200);
    }

    #[tokio::test]
    async fn respects_a_user_supplied_limit_across_pages() {
        let fake = InMemoryStoreClient::new();
        seed_entities(&fake, "Task", 1_200);
        let fake: Arc<dyn StoreClient> = Arc::new(fake);

        let entities = read_split(
            &fake,
            "proj",
            "",
            &partition(),
            Query::for_kind("Task").limit(700),
            None,
        )
        .await
        .unwrap();
        assert_eq!(entities.len(), 700);
    }
}
