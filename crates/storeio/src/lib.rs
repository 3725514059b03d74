//! Connector bridging a parallel batch/streaming pipeline to a remote
//! hierarchical key-value store ("the Store") over proto-based
//! `RunQuery`/`Commit` RPCs.
//!
//! The adaptive batching, throttling and query-planning core lives in
//! `storeio-core`; this crate is the public surface an embedding
//! pipeline runtime drives: [`config`] for the configuration surface,
//! [`read::read`]/[`read::read_gql`] for the `Read` transform, and
//! [`write::MutationSink`] for `Write`/`DeleteByEntity`/`DeleteByKey`.

pub mod config;
pub mod credentials;
pub mod logging;
pub mod read;
pub mod write;

pub use config::ConnectorConfig;
pub use credentials::Credentials;
pub use write::MutationSink;
