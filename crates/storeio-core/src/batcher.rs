//! Target-latency-driven next-batch-size oracle (C3, spec §4.3).

use crate::moving_average::MovingAverage;

/// Initial batch size before any latency sample has been observed.
pub const START_BATCH_SIZE: u32 = 50;
/// Target per-commit latency the batcher aims for.
pub const TARGET_LATENCY_MS: f64 = 6_000.0;
/// Minimum next-batch-size.
pub const MIN_BATCH_SIZE: u32 = 5;
/// Maximum next-batch-size.
pub const MAX_BATCH_SIZE: u32 = 500;

/// Tracks milliseconds-per-mutation and derives a target batch size that
/// keeps commit latency near [`TARGET_LATENCY_MS`].
pub struct WriteBatcher {
    latency_per_mutation: MovingAverage,
}

impl Default for WriteBatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteBatcher {
    #[must_use]
    pub fn new() -> Self {
        Self { latency_per_mutation: MovingAverage::defaults() }
    }

    /// Records that a commit of `num_mutations` mutations took
    /// `total_latency_ms` end to end.
    ///
    /// # Panics
    /// Panics if `num_mutations` is zero.
    pub fn add_request_latency(&self, t_ms: i64, total_latency_ms: f64, num_mutations: u32) {
        assert!(num_mutations > 0, "num_mutations must be positive");
        self.latency_per_mutation.add(t_ms, total_latency_ms / f64::from(num_mutations));
    }

    /// Next target batch size, clamped to `[MIN_BATCH_SIZE, MAX_BATCH_SIZE]`.
    #[must_use]
    pub fn next_batch_size(&self, t_ms: i64) -> u32 {
        if !self.latency_per_mutation.has_value(t_ms) {
            return START_BATCH_SIZE;
        }
        let l = self.latency_per_mutation.get(t_ms).max(1.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let target = (TARGET_LATENCY_MS / l).round() as u32;
        target.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE)
    }
}
