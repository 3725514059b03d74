//! The Store's RPC surface as a Rust trait, plus an HTTP/JSON transport.

use async_trait::async_trait;
use storeio_error::StoreError;

use crate::protocol::{
    CommitRequest, CommitResponse, RunQueryRequest, RunQueryResponse, SplitQueryRequest,
    SplitQueryResponse,
};

/// The Store's proto-based RPC surface (spec §6).
///
/// Implementations must map transport failures and the Store's error
/// envelope to a [`StoreError`] carrying the right `StatusCode` — the
/// planner and writer in `storeio-core` decide retry behavior purely
/// from that code.
#[async_trait]
pub trait StoreClient: Send + Sync {
    async fn run_query(&self, request: RunQueryRequest) -> Result<RunQueryResponse, StoreError>;

    async fn commit(&self, request: CommitRequest) -> Result<CommitResponse, StoreError>;

    async fn split_query(
        &self,
        request: SplitQueryRequest,
    ) -> Result<SplitQueryResponse, StoreError>;
}

mod http;

pub use http::{Credentials, HttpStoreClient};
