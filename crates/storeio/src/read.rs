//! The public `Read` transform: a thin, stateless wrapper over
//! [`storeio_core::planner::execute_read`] (Design Note §9 "Builder
//! explosion" applies equally to read and write — one function, not a
//! builder hierarchy).

use std::sync::Arc;

use storeio_core::planner::{self, QuerySource};
use storeio_error::{ConfigError, ConnectorError};
use storeio_wire::model::{Entity, PartitionId, Query};
use storeio_wire::protocol::ReadOptions;
use storeio_wire::StoreClient;

use crate::config::{ConnectorConfig, ReadConfig};

/// Reads every entity matching `query`, planning and executing splits
/// internally (spec §4.5).
///
/// # Errors
/// Returns [`ConfigError::MissingProjectId`] if `config.project_id` is
/// empty, or whatever [`planner::execute_read`] returns for a store or
/// configuration failure encountered while planning or paginating.
pub async fn read(
    client: &Arc<dyn StoreClient>,
    config: &ConnectorConfig,
    query: Query,
) -> Result<Vec<Entity>, ConnectorError> {
    execute(client, config, QuerySource::Structured(query), 0, None).await
}

/// Same as [`read`], but the query is supplied as GQL text (spec §4.5.1).
///
/// # Errors
/// See [`read`].
pub async fn read_gql(
    client: &Arc<dyn StoreClient>,
    config: &ConnectorConfig,
) -> Result<Vec<Entity>, ConnectorError> {
    let read_config = config_or_missing(config)?;
    execute(
        client,
        config,
        QuerySource::Gql(read_config.gql_query.clone()),
        read_config.num_query_splits,
        read_config.read_time.as_ref().map(|read_time| ReadOptions {
            read_time: Some(read_time.clone()),
        }),
    )
    .await
}

fn config_or_missing(config: &ConnectorConfig) -> Result<&ReadConfig, ConnectorError> {
    config
        .read
        .as_ref()
        .ok_or_else(|| ConfigError::ContradictoryQuery("no [read] section configured".into()).into())
}

async fn execute(
    client: &Arc<dyn StoreClient>,
    config: &ConnectorConfig,
    source: QuerySource,
    num_query_splits: i32,
    read_options: Option<ReadOptions>,
) -> Result<Vec<Entity>, ConnectorError> {
    if config.project_id.is_empty() {
        return Err(ConfigError::MissingProjectId.into());
    }
    let partition_id =
        PartitionId::new(config.project_id.clone(), config.database_id.clone(), config.namespace.clone());
    planner::execute_read(
        client,
        &config.project_id,
        &config.database_id,
        &partition_id,
        source,
        num_query_splits,
        read_options,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeio_wire::model::{Key, PathElement, Value};
    use storeio_wire::testing::InMemoryStoreClient;

    fn config() -> ConnectorConfig {
        ConnectorConfig {
            project_id: "proj".into(),
            database_id: String::new(),
            namespace: None,
            localhost: None,
            read: None,
            write: crate::config::WriteConfig::default(),
        }
    }

    #[tokio::test]
    async fn reads_a_structured_query_end_to_end() {
        let fake = InMemoryStoreClient::new();
        for i in 0..10 {
            let key =
                Key::new(PartitionId::new("proj", "", None::<String>), vec![PathElement::with_id("Task", i + 1)]);
            fake.seed(Entity::new(key).with_property("i", Value::integer(i)));
        }
        fake.script_split(Ok(1));
        let client: Arc<dyn StoreClient> = Arc::new(fake);

        let entities = read(&client, &config(), Query::for_kind("Task")).await.unwrap();
        assert_eq!(entities.len(), 10);
    }

    #[tokio::test]
    async fn missing_project_id_is_rejected_before_any_rpc() {
        let client: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
        let mut config = config();
        config.project_id = String::new();
        let err = read(&client, &config, Query::for_kind("Task")).await.unwrap_err();
        assert!(matches!(err, ConnectorError::Config(ConfigError::MissingProjectId)));
    }

    #[tokio::test]
    async fn gql_read_requires_a_read_section() {
        let client: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
        let err = read_gql(&client, &config()).await.unwrap_err();
        assert!(matches!(err, ConnectorError::Config(ConfigError::ContradictoryQuery(_))));
    }
}
