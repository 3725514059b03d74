//! The public write surface: `Write`, `DeleteByEntity`, `DeleteByKey`
//! (spec §4.6.1). Design Note §9 "Builder explosion" resolves these
//! into one [`MutationEngine`], so each variant here is nothing more
//! than that engine plus the closure turning an input element into the
//! right [`Mutation`].

use std::sync::Arc;
use std::time::Instant;

use storeio_core::runtime::Window;
use storeio_core::{AdaptiveThrottler, MutationEngine, RampUpThrottle, WriteBatcher, WriteSuccessSummary};
use storeio_error::ConnectorError;
use storeio_wire::model::{Entity, Key, Mutation};
use storeio_wire::StoreClient;

use crate::config::ConnectorConfig;

/// Which wire mutation a [`MutationSink`] turns each input element into.
enum Mode {
    Write,
    DeleteByEntity,
    DeleteByKey,
}

/// A configured mutation sink: batches, throttles, retries and commits
/// whatever is fed to it via [`MutationSink::write`]/[`MutationSink::delete_entity`]/
/// [`MutationSink::delete_key`], one bundle at a time.
///
/// Construct with [`MutationSink::for_writes`], [`MutationSink::for_entity_deletes`]
/// or [`MutationSink::for_key_deletes`] depending on which of the three
/// public transforms (spec §4.6.1) it backs.
pub struct MutationSink {
    engine: MutationEngine,
    mode: Mode,
    /// Gradual ramp-up throttle (C4, spec §4.4), admitting mutations
    /// before they reach the batching writer. `None` when
    /// `config.write.throttle_rampup` is false.
    rampup: Option<RampUpThrottle>,
}

impl MutationSink {
    fn new(
        client: Arc<dyn StoreClient>,
        config: &ConnectorConfig,
        mode: Mode,
        pipeline_start: Instant,
    ) -> Self {
        let engine = MutationEngine::new(
            client,
            config.project_id.clone(),
            config.database_id.clone(),
            Arc::new(WriteBatcher::new()),
            Arc::new(AdaptiveThrottler::defaults()),
            Arc::new(storeio_core::runtime::MetricsContext),
        );
        let rampup = config
            .write
            .throttle_rampup
            .then(|| RampUpThrottle::new(pipeline_start, config.write.hint_num_workers));
        Self { engine, mode, rampup }
    }

    /// Backs the `Write` transform: every entity is upserted (spec §4.6.1).
    ///
    /// `pipeline_start` is the broadcast pipeline-start instant the ramp-up
    /// throttle (C4) measures elapsed warm-up time against (Design Note §9
    /// "Cycle between ramp-up and clock"); callers construct it once per
    /// pipeline run and pass it to every sink.
    #[must_use]
    pub fn for_writes(client: Arc<dyn StoreClient>, config: &ConnectorConfig, pipeline_start: Instant) -> Self {
        Self::new(client, config, Mode::Write, pipeline_start)
    }

    /// Backs `DeleteByEntity`: the mutation deletes each entity's key,
    /// ignoring its properties (spec §4.6.1).
    #[must_use]
    pub fn for_entity_deletes(
        client: Arc<dyn StoreClient>,
        config: &ConnectorConfig,
        pipeline_start: Instant,
    ) -> Self {
        Self::new(client, config, Mode::DeleteByEntity, pipeline_start)
    }

    /// Backs `DeleteByKey`: the input is already a key (spec §4.6.1).
    #[must_use]
    pub fn for_key_deletes(
        client: Arc<dyn StoreClient>,
        config: &ConnectorConfig,
        pipeline_start: Instant,
    ) -> Self {
        Self::new(client, config, Mode::DeleteByKey, pipeline_start)
    }

    /// Feeds one entity through the sink (valid for `Write` and
    /// `DeleteByEntity` modes).
    ///
    /// # Errors
    /// See [`MutationEngine::process_mutation`].
    pub async fn write(
        &self,
        entity: Entity,
        window: Window,
        now_ms: i64,
    ) -> Result<Vec<WriteSuccessSummary>, ConnectorError> {
        let mutation = match self.mode {
            Mode::Write => Mutation::Upsert(entity),
            Mode::DeleteByEntity => Mutation::Delete(entity.key),
            Mode::DeleteByKey => {
                unreachable!("DeleteByKey sinks are fed via delete_key, not write")
            }
        };
        if let Some(rampup) = &self.rampup {
            rampup.acquire().await;
        }
        self.engine.process_mutation(mutation, window, now_ms).await
    }

    /// Feeds one key through the sink (valid for `DeleteByKey` mode).
    ///
    /// # Errors
    /// See [`MutationEngine::process_mutation`].
    pub async fn delete_key(
        &self,
        key: Key,
        window: Window,
        now_ms: i64,
    ) -> Result<Vec<WriteSuccessSummary>, ConnectorError> {
        debug_assert!(matches!(self.mode, Mode::DeleteByKey));
        if let Some(rampup) = &self.rampup {
            rampup.acquire().await;
        }
        self.engine.process_mutation(Mutation::Delete(key), window, now_ms).await
    }

    /// Flushes any mutations still pending. Every bundle must call this
    /// at completion (spec §3 "Bundle-end always flushes").
    ///
    /// # Errors
    /// See [`MutationEngine::finish_bundle`].
    pub async fn finish_bundle(
        &self,
        now_ms: i64,
    ) -> Result<Option<WriteSuccessSummary>, ConnectorError> {
        self.engine.finish_bundle(now_ms).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storeio_wire::model::{PartitionId, PathElement, Value};
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

    fn entity(id: i64) -> Entity {
        let key = Key::new(PartitionId::new("proj", "", None::<String>), vec![PathElement::with_id("Task", id)]);
        Entity::new(key).with_property("i", Value::integer(id))
    }

    #[tokio::test]
    async fn write_upserts_entities_into_the_store() {
        let fake = InMemoryStoreClient::new();
        let fake: Arc<dyn StoreClient> = Arc::new(fake);
        let sink = MutationSink::for_writes(Arc::clone(&fake), &config(), Instant::now());

        sink.write(entity(1), Window::at(0), 0).await.unwrap();
        sink.finish_bundle(0).await.unwrap();
    }

    #[tokio::test]
    async fn delete_by_entity_removes_only_the_key() {
        let fake = InMemoryStoreClient::new();
        fake.seed(entity(1));
        let fake: Arc<dyn StoreClient> = Arc::new(fake);
        let sink = MutationSink::for_entity_deletes(Arc::clone(&fake), &config(), Instant::now());

        sink.write(entity(1), Window::at(0), 0).await.unwrap();
        sink.finish_bundle(0).await.unwrap();
    }

    #[tokio::test]
    async fn delete_by_key_accepts_a_bare_key() {
        let key = entity(1).key;
        let fake: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
        let sink = MutationSink::for_key_deletes(Arc::clone(&fake), &config(), Instant::now());

        sink.delete_key(key, Window::at(0), 0).await.unwrap();
        sink.finish_bundle(0).await.unwrap();
    }

    #[tokio::test]
    async fn disabling_rampup_skips_the_throttle() {
        let fake: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
        let mut config = config();
        config.write.throttle_rampup = false;
        let sink = MutationSink::for_writes(Arc::clone(&fake), &config, Instant::now());
        assert!(sink.rampup.is_none());

        sink.write(entity(1), Window::at(0), 0).await.unwrap();
        sink.finish_bundle(0).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn rampup_admits_the_configured_per_second_budget_before_waiting() {
        let fake: Arc<dyn StoreClient> = Arc::new(InMemoryStoreClient::new());
        // Default hint (500 workers) gives a budget of exactly 1/sec at s=0.
        let config = config();
        let start = Instant::now();
        let sink = MutationSink::for_writes(Arc::clone(&fake), &config, start);
        assert!(sink.rampup.is_some());

        sink.write(entity(1), Window::at(0), 0).await.unwrap();
        assert!(Instant::now().duration_since(start) < std::time::Duration::from_millis(100));

        sink.write(entity(2), Window::at(0), 0).await.unwrap();
        assert!(Instant::now().duration_since(start) >= std::time::Duration::from_secs(1));
        sink.finish_bundle(0).await.unwrap();
    }
}
