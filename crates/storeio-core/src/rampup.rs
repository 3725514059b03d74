//! Per-worker, time-indexed request-rate ceiling during pipeline warm-up
//! (C4, spec §4.4).
//!
//! Design Note §9 "Cycle between ramp-up and clock": `start` is an
//! explicit constructor parameter rather than a broadcast side input.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default worker-count hint used to scale the per-worker budget.
pub const DEFAULT_HINT_NUM_WORKERS: u32 = 500;

const BASE_RATE: f64 = 500.0;
const DOUBLING_PERIOD_SECS: f64 = 300.0;

/// Caps the rate at which mutations are admitted during warm-up, doubling
/// the per-worker allowance roughly every 5 minutes.
pub struct RampUpThrottle {
    start: Instant,
    hint_num_workers: u32,
    state: Mutex<(u64, u32)>,
}

impl RampUpThrottle {
    #[must_use]
    pub fn new(start: Instant, hint_num_workers: u32) -> Self {
        Self { start, hint_num_workers: hint_num_workers.max(1), state: Mutex::new((0, 0)) }
    }

    /// `max(1, floor(500 * 1.5^(s/300) / N))`, monotone non-decreasing in `s`.
    #[must_use]
    pub fn budget(&self, elapsed_secs: u64) -> u32 {
        #[allow(clippy::cast_precision_loss)]
        let exponent = elapsed_secs as f64 / DOUBLING_PERIOD_SECS;
        let raw = BASE_RATE * 1.5f64.powf(exponent) / f64::from(self.hint_num_workers);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let budget = raw.floor() as u32;
        budget.max(1)
    }

    /// Blocks until admitting this request would not exceed the current
    /// wall-second's budget, then admits it.
    pub async fn acquire(&self) {
        loop {
            let elapsed = Instant::now().saturating_duration_since(self.start);
            let elapsed_secs = elapsed.as_secs();
            let budget = self.budget(elapsed_secs);

            let admitted_now = {
                let mut state = self.state.lock();
                if state.0 != elapsed_secs {
                    *state = (elapsed_secs, 0);
                }
                if state.1 < budget {
                    state.1 += 1;
                    true
                } else {
                    false
                }
            };

            if admitted_now {
                return;
            }

            let next_boundary = Duration::from_secs(elapsed_secs + 1);
            let sleep_for = next_boundary.saturating_sub(elapsed).max(Duration::from_millis(1));
            tokio::time::sleep(sleep_for).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_never_drops_below_one() {
        let throttle = RampUpThrottle::new(Instant::now(), 10_000);
        assert_eq!(throttle.budget(0), 1);
    }

    #[test]
    fn budget_is_monotone_non_decreasing() {
        let throttle = RampUpThrottle::new(Instant::now(), DEFAULT_HINT_NUM_WORKERS);
        let mut previous = throttle.budget(0);
        for s in (0..3600).step_by(60) {
            let current = throttle.budget(s);
            assert!(current >= previous, "budget regressed at s={s}");
            previous = current;
        }
    }

    #[test]
    fn budget_scales_inversely_with_worker_hint() {
        let wide = RampUpThrottle::new(Instant::now(), 1);
        let narrow = RampUpThrottle::new(Instant::now(), 1000);
        assert!(wide.budget(300) > narrow.budget(300));
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_admits_up_to_budget_then_waits_for_the_next_second() {
        let start = Instant::now();
        let throttle = RampUpThrottle::new(start, 10_000);
        let budget = throttle.budget(0);

        for _ in 0..budget {
            throttle.acquire().await;
        }
        assert!(Instant::now().duration_since(start) < Duration::from_millis(100));

        throttle.acquire().await;
        assert!(Instant::now().duration_since(start) >= Duration::from_secs(1));
    }
}
