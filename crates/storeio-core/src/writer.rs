//! Batch assembly, dedup, commit-with-retry, driving C1-C4 (C6, spec §4.6).

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use storeio_error::{ConfigError, ConnectorError, StatusCode, StoreError};
use storeio_wire::backoff::RetryPolicy;
use storeio_wire::model::{Key, Mutation};
use storeio_wire::protocol::CommitRequest;
use storeio_wire::StoreClient;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::batcher::{WriteBatcher, TARGET_LATENCY_MS};
use crate::metrics;
use crate::runtime::{BundleContext, Window};
use crate::throttle::AdaptiveThrottler;

/// Byte ceiling that triggers a flush before a new mutation is appended
/// (spec §4.6.2, §3 invariants).
pub const BYTE_FLUSH_THRESHOLD: u64 = 9_000_000;

/// Emitted once per successful commit RPC (spec §3 "`WriteSuccessSummary`").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSuccessSummary {
    pub num_writes: u32,
    pub num_bytes: u64,
    pub window: Window,
}

#[derive(Default)]
struct BatchState {
    pending: Vec<(Mutation, Window)>,
    size_bytes: u64,
    keys: HashSet<Key>,
}

/// Unifies the write/delete-by-entity/delete-by-key public transforms
/// (Design Note §9 "Builder explosion") behind one batching, retrying,
/// throttled, instrumented mutation sink.
pub struct MutationEngine {
    client: Arc<dyn StoreClient>,
    project_id: String,
    database_id: String,
    batcher: Arc<WriteBatcher>,
    throttler: Arc<AdaptiveThrottler>,
    context: Arc<dyn BundleContext>,
    state: Mutex<BatchState>,
}

impl MutationEngine {
    #[must_use]
    pub fn new(
        client: Arc<dyn StoreClient>,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
        batcher: Arc<WriteBatcher>,
        throttler: Arc<AdaptiveThrottler>,
        context: Arc<dyn BundleContext>,
    ) -> Self {
        Self {
            client,
            project_id: project_id.into(),
            database_id: database_id.into(),
            batcher,
            throttler,
            context,
            state: Mutex::new(BatchState::default()),
        }
    }

    /// Feeds one mutation into the batch, flushing zero, one, or (rarely,
    /// when a dedup flush and a count flush both trigger) two batches.
    ///
    /// # Errors
    /// Returns [`ConfigError::IncompleteKey`] if `mutation`'s key is
    /// incomplete (checked before any RPC), or a [`ConnectorError::BundleFailed`]
    /// if a commit permanently fails or exhausts its retries.
    pub async fn process_mutation(
        &self,
        mutation: Mutation,
        window: Window,
        now_ms: i64,
    ) -> Result<Vec<WriteSuccessSummary>, ConnectorError> {
        let key = mutation.key().clone();
        if !key.is_complete() {
            return Err(ConfigError::IncompleteKey.into());
        }
        let size = mutation.serialized_size();
        let mut summaries = Vec::new();
        let mut state = self.state.lock().await;

        if state.keys.contains(&key) {
            debug!(?key, "dedup flush");
            if let Some(summary) = self.flush(now_ms, &mut state).await? {
                summaries.push(summary);
            }
        }

        if !state.pending.is_empty() && state.size_bytes + size >= BYTE_FLUSH_THRESHOLD {
            debug!(size_bytes = state.size_bytes, "byte-limit flush");
            if let Some(summary) = self.flush(now_ms, &mut state).await? {
                summaries.push(summary);
            }
        }

        state.pending.push((mutation, window));
        state.size_bytes += size;
        state.keys.insert(key);

        let target = self.batcher.next_batch_size(now_ms);
        if state.pending.len() >= target as usize {
            debug!(pending = state.pending.len(), target, "count flush");
            if let Some(summary) = self.flush(now_ms, &mut state).await? {
                summaries.push(summary);
            }
        }

        Ok(summaries)
    }

    /// Flushes any pending mutations. Every bundle must call this at
    /// completion (spec §3 "Bundle-end always flushes").
    pub async fn finish_bundle(
        &self,
        now_ms: i64,
    ) -> Result<Option<WriteSuccessSummary>, ConnectorError> {
        let mut state = self.state.lock().await;
        self.flush(now_ms, &mut state).await
    }

    async fn flush(
        &self,
        now_ms: i64,
        state: &mut BatchState,
    ) -> Result<Option<WriteSuccessSummary>, ConnectorError> {
        if state.pending.is_empty() {
            return Ok(None);
        }
        let mutations: Vec<Mutation> = state.pending.iter().map(|(m, _)| m.clone()).collect();
        let last_window = state.pending.last().expect("checked non-empty above").1;

        let response = self.commit_with_policy(mutations, now_ms).await.map_err(|err| {
            ConnectorError::BundleFailed(err)
        })?;

        let summary = WriteSuccessSummary {
            num_writes: u32::try_from(state.pending.len()).unwrap_or(u32::MAX),
            num_bytes: response.serialized_size_bytes,
            window: last_window,
        };
        *state = BatchState::default();
        Ok(Some(summary))
    }

    async fn commit_with_policy(
        &self,
        mutations: Vec<Mutation>,
        now_ms: i64,
    ) -> Result<storeio_wire::protocol::CommitResponse, StoreError> {
        let policy = RetryPolicy::spec_default();
        let mut attempt = 1u32;

        loop {
            while self.throttler.throttle_request(now_ms) {
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let target_latency_ms = TARGET_LATENCY_MS as u64;
                self.context.record_counter(metrics::THROTTLING_MSECS, target_latency_ms);
                tokio::time::sleep(std::time::Duration::from_millis(target_latency_ms)).await;
            }

            let request = CommitRequest {
                project_id: self.project_id.clone(),
                database_id: self.database_id.clone(),
                mode: storeio_wire::model::CommitMode::NonTransactional,
                mutations: mutations.clone(),
            };

            let start = Instant::now();
            let num_mutations = u32::try_from(mutations.len()).unwrap_or(u32::MAX);
            match self.client.commit(request).await {
                Ok(response) => {
                    #[allow(clippy::cast_precision_loss)]
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    self.batcher.add_request_latency(now_ms, elapsed_ms, num_mutations);
                    self.throttler.successful_request(now_ms);
                    self.context.record_counter(metrics::RPC_SUCCESSES, 1);
                    self.context.record_counter(metrics::ENTITIES_MUTATED, u64::from(num_mutations));
                    self.context.record_distribution(metrics::BATCH_SIZE, f64::from(num_mutations));
                    self.context.record_distribution(
                        metrics::LATENCY_MS_PER_MUTATION,
                        elapsed_ms / f64::from(num_mutations.max(1)),
                    );
                    return Ok(response);
                }
                Err(err) => {
                    #[allow(clippy::cast_precision_loss)]
                    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
                    self.context.record_counter(metrics::RPC_ERRORS, 1);

                    if !err.is_retryable() {
                        return Err(err);
                    }
                    // Open Question (spec §9): only DEADLINE_EXCEEDED feeds
                    // the batcher, so an oversized batch shrinks on timeout.
                    if err.code == StatusCode::DeadlineExceeded {
                        self.batcher.add_request_latency(now_ms, elapsed_ms, num_mutations);
                    }
                    if attempt > policy.max_retries {
                        return Err(err);
                    }
                    let delay = policy.delay_for_attempt(attempt);
                    #[allow(clippy::cast_possible_truncation)]
                    let delay_ms = delay.as_millis() as u64;
                    warn!(attempt, code = %err.code, delay_ms, "commit retry");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
