//! Split-count selection and splitting policy (spec §4.5.3, §4.5.4).

use std::sync::Arc;

use rand::seq::SliceRandom;
use storeio_wire::model::{PartitionId, Query};
use storeio_wire::protocol::SplitQueryRequest;
use storeio_wire::StoreClient;
use tracing::warn;

use super::estimate::EstimateError;

/// Fallback split count used when statistics are unavailable or the
/// splitter RPC fails.
pub const FALLBACK_SPLIT_COUNT: u32 = 12;
/// Ceiling on both user-supplied and estimated split counts.
pub const MAX_SPLIT_COUNT: u32 = 50_000;
const BYTES_PER_SPLIT: f64 = 64.0 * 1024.0 * 1024.0;

/// Chooses a split count from a user override, falling back to an
/// estimate-derived count and finally to [`FALLBACK_SPLIT_COUNT`].
#[must_use]
pub fn select_split_count(
    num_query_splits: i32,
    estimate: &Result<u64, EstimateError>,
) -> u32 {
    if num_query_splits > 0 {
        #[allow(clippy::cast_sign_loss)]
        return (num_query_splits as u32).min(MAX_SPLIT_COUNT);
    }
    match estimate {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(bytes) => {
            let n = (*bytes as f64 / BYTES_PER_SPLIT).round() as u32;
            n.clamp(12, MAX_SPLIT_COUNT)
        }
        Err(_) => FALLBACK_SPLIT_COUNT,
    }
}

/// Produces the set of per-split queries to read, shuffled to defeat
/// split-ordering worker skew (spec §4.5.4).
pub async fn plan_splits(
    client: &Arc<dyn StoreClient>,
    project_id: &str,
    database_id: &str,
    partition_id: &PartitionId,
    query: Query,
    split_count: u32,
) -> Vec<Query> {
    if query.limit.is_some() {
        return vec![query];
    }

    let request = SplitQueryRequest {
        project_id: project_id.to_string(),
        database_id: database_id.to_string(),
        partition_id: partition_id.clone(),
        query: query.clone(),
        #[allow(clippy::cast_possible_wrap)]
        num_splits: split_count as i32,
    };

    let mut splits = match client.split_query(request).await {
        Ok(response) if !response.splits.is_empty() => response.splits,
        Ok(_) => vec![query],
        Err(err) => {
            warn!(error = %err, "split_query failed, falling back to a single split");
            vec![query]
        }
    };
    splits.shuffle(&mut rand::thread_rng());
    splits
}
