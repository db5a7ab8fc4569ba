//! Vector-store contract shared by the index writer and retriever.
//!
//! Implementations index `(id, vector, text, metadata)` records and answer
//! nearest-neighbor queries by ascending cosine distance. Upsert is
//! idempotent by id; nothing here deletes records (compaction is a store
//! concern, not the pipeline's).

pub mod in_memory;
pub mod qdrant;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub use in_memory::InMemoryVectorStore;
pub use qdrant::QdrantStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("query error: {0}")]
    Query(String),
    #[error("count error: {0}")]
    Count(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One record persisted in a collection.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// One nearest-neighbor hit; `distance` is cosine distance in [0, 2].
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub distance: f32,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait VectorStore: Send + Sync {
    /// Create the collection with cosine metric if it does not exist.
    /// Idempotent.
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), StoreError>>;

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, StoreError>>;

    /// Insert-or-overwrite records keyed by id.
    fn upsert(
        &self,
        collection: &str,
        records: Vec<VectorRecord>,
    ) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Top-`k` nearest neighbors, ascending cosine distance. May return fewer
    /// than `k` hits when the collection is sparse.
    fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> BoxFuture<'_, Result<Vec<ScoredRecord>, StoreError>>;

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<usize, StoreError>>;
}
