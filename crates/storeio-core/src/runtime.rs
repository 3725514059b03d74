//! Minimal pipeline-runtime contract the core depends on (spec §5, §6
//! "Pipeline-runtime contract consumed").
//!
//! The embedding pipeline SDK (bundle lifecycle, real windowing, side
//! inputs) is out of scope; these traits exist only so the core can be
//! compiled and tested without one.

use metrics::{counter, histogram};

/// An opaque, orderable timestamp-interval marker. Pipelines' windowing
/// semantics are out of scope; the core only needs to carry a window
/// through to attribute a `WriteSuccessSummary` to the batch's last
/// input window (spec §4.6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Window(pub i64);

impl Window {
    #[must_use]
    pub const fn at(timestamp_ms: i64) -> Self {
        Self(timestamp_ms)
    }
}

/// Counter/distribution registration, backed by the `metrics` crate's
/// global recorder (spec §4.6.4 instrumentation).
pub trait BundleContext: Send + Sync {
    fn record_counter(&self, name: &'static str, value: u64) {
        counter!(name).increment(value);
    }

    fn record_distribution(&self, name: &'static str, value: f64) {
        histogram!(name).record(value);
    }
}

/// The default runtime context: records straight into the `metrics`
/// global recorder with no additional bookkeeping.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsContext;

impl BundleContext for MetricsContext {}
