//! Metric name constants (spec §4.6.4).

pub const RPC_SUCCESSES: &str = "storeio_rpc_successes";
pub const RPC_ERRORS: &str = "storeio_rpc_errors";
pub const ENTITIES_MUTATED: &str = "storeio_entities_mutated";
pub const BATCH_SIZE: &str = "storeio_batch_size";
pub const LATENCY_MS_PER_MUTATION: &str = "storeio_latency_ms_per_mutation";
pub const THROTTLING_MSECS: &str = "storeio_throttling_msecs";
