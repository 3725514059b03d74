//! Client-side adaptive load shedding driven by recent failure rate
//! (C2, spec §4.2).

use parking_lot::Mutex;
use rand::Rng;

/// Default window: 120 seconds.
pub const DEFAULT_WINDOW_MS: u64 = 120_000;
/// Default bucket granularity: 10 seconds.
pub const DEFAULT_BUCKET_MS: u64 = 10_000;
/// Default overload factor `K`.
pub const DEFAULT_OVERLOAD_FACTOR: f64 = 1.25;

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    requests: u64,
    successes: u64,
    index: Option<i64>,
}

/// Client-side throttle: probabilistically rejects requests as the
/// observed failure rate over the trailing window rises.
pub struct AdaptiveThrottler {
    bucket_ms: u64,
    num_buckets: usize,
    overload_factor: f64,
    buckets: Mutex<Vec<Bucket>>,
}

impl AdaptiveThrottler {
    #[must_use]
    pub fn new(window_ms: u64, bucket_ms: u64, overload_factor: f64) -> Self {
        assert!(bucket_ms > 0, "bucket width must be positive");
        #[allow(clippy::cast_possible_truncation)]
        let num_buckets = (window_ms / bucket_ms).max(1) as usize;
        Self {
            bucket_ms,
            num_buckets,
            overload_factor,
            buckets: Mutex::new(vec![Bucket::default(); num_buckets]),
        }
    }

    #[must_use]
    pub fn defaults() -> Self {
        Self::new(DEFAULT_WINDOW_MS, DEFAULT_BUCKET_MS, DEFAULT_OVERLOAD_FACTOR)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn bucket_index(&self, t_ms: i64) -> i64 {
        t_ms.div_euclid(self.bucket_ms as i64)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn is_live(&self, bucket: &Bucket, current_idx: i64) -> bool {
        bucket
            .index
            .is_some_and(|idx| current_idx - idx >= 0 && current_idx - idx < self.num_buckets as i64)
    }

    fn totals(&self, t_ms: i64) -> (u64, u64) {
        let current_idx = self.bucket_index(t_ms);
        let buckets = self.buckets.lock();
        buckets.iter().filter(|b| self.is_live(b, current_idx)).fold(
            (0u64, 0u64),
            |(r, s), b| (r + b.requests, s + b.successes),
        )
    }

    fn touch(buckets: &mut [Bucket], slot: usize, idx: i64) -> &mut Bucket {
        let bucket = &mut buckets[slot];
        if bucket.index != Some(idx) {
            *bucket = Bucket { requests: 0, successes: 0, index: Some(idx) };
        }
        bucket
    }

    /// Decides whether the caller should skip this attempt. Always
    /// counts as a decision point (`R` advances); returns `true` with
    /// probability `max(0, (R - K·S) / (R + 1))`.
    #[must_use]
    pub fn throttle_request(&self, t_ms: i64) -> bool {
        let (r, s) = self.totals(t_ms);
        #[allow(clippy::cast_precision_loss)]
        let p = (r as f64 - self.overload_factor * s as f64).max(0.0) / (r as f64 + 1.0);

        let idx = self.bucket_index(t_ms);
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let slot = idx.rem_euclid(self.num_buckets as i64) as usize;
        {
            let mut buckets = self.buckets.lock();
            Self::touch(&mut buckets, slot, idx).requests += 1;
        }

        rand::thread_rng().gen_bool(p.clamp(0.0, 1.0))
    }

    /// Records a successful RPC outcome.
    pub fn successful_request(&self, t_ms: i64) {
        let idx = self.bucket_index(t_ms);
        #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
        let slot = idx.rem_euclid(self.num_buckets as i64) as usize;
        let mut buckets = self.buckets.lock();
        Self::touch(&mut buckets, slot, idx).successes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_throttles_with_no_history() {
        let throttler = AdaptiveThrottler::defaults();
        assert!(!throttler.throttle_request(0));
    }

    #[test]
    fn sustained_failures_drive_probability_toward_one() {
        let throttler = AdaptiveThrottler::defaults();
        for _ in 0..200 {
            let _ = throttler.throttle_request(0);
        }
        let (r, s) = throttler.totals(0);
        assert!(r > 0);
        assert_eq!(s, 0);
        let p = (r as f64 - DEFAULT_OVERLOAD_FACTOR * s as f64).max(0.0) / (r as f64 + 1.0);
        assert!(p > 0.9, "p={p}");
    }

    #[test]
    fn sustained_successes_pull_probability_back_to_zero() {
        let throttler = AdaptiveThrottler::defaults();
        for i in 0..50 {
            let _ = throttler.throttle_request(i);
            throttler.successful_request(i);
        }
        let (r, s) = throttler.totals(49);
        let p = (r as f64 - DEFAULT_OVERLOAD_FACTOR * s as f64).max(0.0) / (r as f64 + 1.0);
        assert!(p < 0.1, "p={p}");
    }

    #[test]
    fn stale_history_falls_out_of_the_window() {
        let throttler = AdaptiveThrottler::defaults();
        for _ in 0..50 {
            let _ = throttler.throttle_request(0);
        }
        let (r_before, _) = throttler.totals(0);
        assert!(r_before > 0);
        let (r_after, s_after) = throttler.totals(1_000_000);
        assert_eq!(r_after, 0);
        assert_eq!(s_after, 0);
    }
}
