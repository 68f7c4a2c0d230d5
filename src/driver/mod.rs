//! Driver contract for docmap
//!
//! The mapper core never talks to a database directly. Persistence
//! goes through the narrow `DocumentStore` contract below: one call
//! per operation, issued after validation/visibility resolution and
//! before the after-hooks. Connection lifecycle, retries, and index
//! creation are the driver's business, not the mapper's.

mod errors;
mod memory;

pub use errors::{DriverError, DriverResult};
pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};

use crate::populate::JoinStage;

/// Boxed future returned by driver calls.
pub type DriverFuture<'a, T> = Pin<Box<dyn Future<Output = DriverResult<T>> + Send + 'a>>;

/// A read request: filter, exclusion projection, joins, and a limit.
#[derive(Debug, Clone, Default)]
pub struct ReadQuery {
    /// Equality filter (top-level or dotted keys)
    pub filter: Value,
    /// Exclusion projection: dot-path → 0
    pub projection: Map<String, Value>,
    /// Join stages from population planning
    pub joins: Vec<JoinStage>,
    /// Maximum number of documents to return
    pub limit: Option<usize>,
}

/// The persistence contract consumed by the operations layer.
pub trait DocumentStore: Send + Sync {
    /// Insert documents, returning them as stored (ids assigned).
    fn insert<'a>(&'a self, collection: &'a str, documents: Vec<Value>)
        -> DriverFuture<'a, Vec<Value>>;

    /// Read documents matching a query.
    fn find<'a>(&'a self, collection: &'a str, query: ReadQuery) -> DriverFuture<'a, Vec<Value>>;

    /// Merge `changes` into every document matching `filter`; returns
    /// the matched count.
    fn update<'a>(&'a self, collection: &'a str, filter: Value, changes: Value)
        -> DriverFuture<'a, u64>;

    /// Delete documents matching `filter`; returns the removed count.
    fn remove<'a>(&'a self, collection: &'a str, filter: Value) -> DriverFuture<'a, u64>;
}
