//! Wire types and transport for the Store's `RunQuery`/`Commit`/`SplitQuery`
//! RPC surface (spec §3, §6).
//!
//! This crate has no opinion on batching, throttling or retry scheduling —
//! that lives in `storeio-core`. It only knows how to represent and send
//! the Store's messages.

pub mod backoff;
pub mod client;
pub mod model;
pub mod protocol;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{Credentials, HttpStoreClient, StoreClient};
