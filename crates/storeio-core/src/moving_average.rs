//! Time-windowed rolling mean of a scalar signal (C1, spec §4.1).
//!
//! Grounded on the teacher's circuit breaker's fixed-size sample window
//! (`resilience::CircuitBreaker::calculate_failure_rate`), generalized
//! from a pass/fail ratio to an arbitrary scalar mean over a ring of
//! time buckets.

use parking_lot::Mutex;

/// Default sample period: 120 seconds.
pub const DEFAULT_SAMPLE_PERIOD_MS: u64 = 120_000;
/// Default sample interval (bucket width): 10 seconds.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 10_000;
/// Default minimum sample count per bucket for it to count as significant.
pub const DEFAULT_NUM_SIGNIFICANT_SAMPLES: u64 = 1;
/// Default minimum number of significant buckets required for `has_value`.
pub const DEFAULT_NUM_SIGNIFICANT_BUCKETS: usize = 1;

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    sum: f64,
    count: u64,
    /// Global bucket index (`t / interval_ms`) this bucket was last
    /// written for. `None` means never written.
    index: Option<i64>,
}

/// Rolling mean of a scalar `value(t)` over a configurable sample period,
/// subdivided into fixed-width sample intervals.
pub struct MovingAverage {
    interval_ms: u64,
    num_buckets: usize,
    num_significant_samples: u64,
    num_significant_buckets: usize,
    buckets: Mutex<Vec<Bucket>>,
}

impl MovingAverage {
    #[must_use]
    pub fn new(sample_period_ms: u64, sample_interval_ms: u64) -> Self {
        Self::with_significance(
            sample_period_ms,
            sample_interval_ms,
            DEFAULT_NUM_SIGNIFICANT_SAMPLES,
            DEFAULT_NUM_SIGNIFICANT_BUCKETS,
        )
    }

    #[must_use]
    pub fn with_significance(
        sample_period_ms: u64,
        sample_interval_ms: u64,
        num_significant_samples: u64,
        num_significant_buckets: usize,
    ) -> Self {
        assert!(sample_interval_ms > 0, "sample interval must be positive");
        let num_buckets = (sample_period_ms / sample_interval_ms).max(1) as usize;
        Self {
            interval_ms: sample_interval_ms,
            num_buckets,
            num_significant_samples,
            num_significant_buckets,
            buckets: Mutex::new(vec![Bucket::default(); num_buckets]),
        }
    }

    #[must_use]
    pub fn defaults() -> Self {
        Self::new(DEFAULT_SAMPLE_PERIOD_MS, DEFAULT_SAMPLE_INTERVAL_MS)
    }

    fn bucket_index(&self, t_ms: i64) -> i64 {
        t_ms.div_euclid(self.interval_ms as i64)
    }

    /// Records one sample `v` at time `t_ms`.
    pub fn add(&self, t_ms: i64, v: f64) {
        let idx = self.bucket_index(t_ms);
        let slot = idx.rem_euclid(self.num_buckets as i64) as usize;
        let mut buckets = self.buckets.lock();
        let bucket = &mut buckets[slot];
        if bucket.index != Some(idx) {
            *bucket = Bucket { sum: 0.0, count: 0, index: Some(idx) };
        }
        bucket.sum += v;
        bucket.count += 1;
    }

    /// True iff `bucket.index` falls within the period ending at `current_idx`.
    fn is_live(&self, bucket: &Bucket, current_idx: i64) -> bool {
        bucket
            .index
            .is_some_and(|idx| current_idx - idx >= 0 && current_idx - idx < self.num_buckets as i64)
    }

    /// Arithmetic mean over all buckets within the current period that
    /// have at least one sample. Callers must check [`Self::has_value`]
    /// first.
    #[must_use]
    pub fn get(&self, t_ms: i64) -> f64 {
        let current_idx = self.bucket_index(t_ms);
        let buckets = self.buckets.lock();
        let (sum, count) = buckets
            .iter()
            .filter(|b| self.is_live(b, current_idx) && b.count > 0)
            .fold((0.0, 0u64), |(sum, count), b| (sum + b.sum, count + b.count));
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    /// True iff enough live buckets have met the significance threshold.
    #[must_use]
    pub fn has_value(&self, t_ms: i64) -> bool {
        let current_idx = self.bucket_index(t_ms);
        let buckets = self.buckets.lock();
        let significant_buckets = buckets
            .iter()
            .filter(|b| self.is_live(b, current_idx) && b.count >= self.num_significant_samples)
            .count();
        significant_buckets >= self.num_significant_buckets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_samples_means_no_value() {
        let avg = MovingAverage::new(120_000, 10_000);
        assert!(!avg.has_value(0));
    }

    #[test]
    fn single_sample_is_its_own_mean() {
        let avg = MovingAverage::new(120_000, 10_000);
        avg.add(0, 42.0);
        assert!(avg.has_value(0));
        assert_eq!(avg.get(0), 42.0);
    }

    #[test]
    fn samples_in_the_same_bucket_average_together() {
        let avg = MovingAverage::new(120_000, 10_000);
        avg.add(1_000, 10.0);
        avg.add(2_000, 20.0);
        assert_eq!(avg.get(2_000), 15.0);
    }

    #[test]
    fn samples_across_buckets_average_over_the_whole_period() {
        let avg = MovingAverage::new(120_000, 10_000);
        avg.add(0, 10.0);
        avg.add(10_000, 30.0);
        assert_eq!(avg.get(10_000), 20.0);
    }

    #[test]
    fn a_bucket_resets_once_the_ring_wraps_around() {
        let avg = MovingAverage::new(120_000, 10_000);
        avg.add(0, 100.0);
        // 12 buckets of 10s; landing back on bucket 0 one period later.
        avg.add(120_000, 5.0);
        assert_eq!(avg.get(120_000), 5.0);
    }

    #[test]
    fn stale_buckets_fall_out_of_the_window_even_without_a_new_add() {
        let avg = MovingAverage::new(120_000, 10_000);
        avg.add(0, 100.0);
        avg.add(110_000, 1.0);
        // At t=120_000 the t=0 bucket (index 0) is outside [1, 12).
        assert_eq!(avg.get(120_000), 1.0);
    }

    #[test]
    fn has_value_requires_the_significant_bucket_count() {
        let avg = MovingAverage::with_significance(120_000, 10_000, 3, 2);
        avg.add(0, 1.0);
        avg.add(0, 1.0);
        avg.add(0, 1.0);
        // Only one bucket has 3 samples so far; need two.
        assert!(!avg.has_value(0));
        avg.add(10_000, 1.0);
        avg.add(10_000, 1.0);
        avg.add(10_000, 1.0);
        assert!(avg.has_value(10_000));
    }
}
