//! Unified error types for the store connector crates.
//!
//! All other crates in this workspace depend on this one for error
//! handling, the same way every `fraiseql-*` crate depends on
//! `fraiseql-error`: one enum per concern, aggregated behind a
//! top-level `ConnectorError`.

mod config;
mod store;

pub use config::ConfigError;
pub use store::{StatusCode, StoreError};

/// Top-level error type returned by the connector's public surface.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A non-retryable (or retry-exhausted) store error that aborts the
    /// whole bundle, per spec §4.6.3 / §7.
    #[error("bundle aborted by store error: {0}")]
    BundleFailed(#[source] StoreError),

    #[error("statistics unavailable for kind {kind}")]
    StatisticsUnavailable { kind: String },
}

/// Result alias used throughout the workspace's public API.
pub type Result<T> = std::result::Result<T, ConnectorError>;
