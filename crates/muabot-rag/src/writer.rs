//! Offline index build: embed documents in batches and upsert them.

use std::sync::Arc;

use muabot_corpus::Document;
use muabot_embed::TextEmbedder;
use muabot_store::{VectorRecord, VectorStore};

use crate::error::RagError;

/// Batch size bounding peak memory and upsert payload.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Writes normalized documents into the vector store.
///
/// Embeddings are computed sequentially, one call per document, with no
/// intra-batch deduplication; each batch becomes exactly one upsert. Upsert
/// is idempotent by document id, so re-running over identical source data
/// overwrites instead of duplicating.
pub struct IndexWriter {
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
    batch_size: usize,
}

impl std::fmt::Debug for IndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexWriter")
            .field("collection", &self.collection)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl IndexWriter {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            store,
            collection: collection.into(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Write all documents, returning how many were committed.
    ///
    /// A failure aborts the current batch; earlier batches stay committed
    /// (there is no cross-batch transaction). The collection is created on
    /// first use with the dimensionality of the first embedding.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::BatchAborted`] naming the failing batch.
    pub async fn write(&self, documents: &[Document]) -> Result<usize, RagError> {
        let mut written = 0usize;

        for (index, batch) in documents.chunks(self.batch_size).enumerate() {
            let records = self
                .embed_batch(batch)
                .map_err(|e| RagError::BatchAborted {
                    index,
                    source: Box::new(e),
                })?;

            if index == 0 {
                let dimensions = records[0].vector.len() as u64;
                self.store
                    .ensure_collection(&self.collection, dimensions)
                    .await
                    .map_err(|e| RagError::BatchAborted {
                        index,
                        source: Box::new(e.into()),
                    })?;
            }

            self.store
                .upsert(&self.collection, records)
                .await
                .map_err(|e| RagError::BatchAborted {
                    index,
                    source: Box::new(e.into()),
                })?;

            written += batch.len();
            tracing::info!(
                batch = index,
                size = batch.len(),
                collection = %self.collection,
                "index batch committed"
            );
        }

        Ok(written)
    }

    fn embed_batch(&self, batch: &[Document]) -> Result<Vec<VectorRecord>, RagError> {
        batch
            .iter()
            .map(|doc| {
                let vector = self.embedder.embed(&doc.text)?;
                Ok(VectorRecord {
                    id: doc.id.clone(),
                    vector,
                    text: doc.text.clone(),
                    metadata: doc.metadata.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use muabot_embed::mock::StubEmbedder;
    use muabot_store::{InMemoryVectorStore, ScoredRecord, StoreError};

    type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

    /// Store wrapper counting upsert calls.
    struct CountingStore {
        inner: InMemoryVectorStore,
        upserts: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: InMemoryVectorStore::new(),
                upserts: AtomicUsize::new(0),
            }
        }
    }

    impl VectorStore for CountingStore {
        fn ensure_collection(
            &self,
            collection: &str,
            vector_size: u64,
        ) -> BoxFuture<'_, Result<(), StoreError>> {
            self.inner.ensure_collection(collection, vector_size)
        }

        fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
            self.inner.collection_exists(collection)
        }

        fn upsert(
            &self,
            collection: &str,
            records: Vec<VectorRecord>,
        ) -> BoxFuture<'_, Result<(), StoreError>> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            self.inner.upsert(collection, records)
        }

        fn query(
            &self,
            collection: &str,
            vector: Vec<f32>,
            k: usize,
        ) -> BoxFuture<'_, Result<Vec<ScoredRecord>, StoreError>> {
            self.inner.query(collection, vector, k)
        }

        fn count(&self, collection: &str) -> BoxFuture<'_, Result<usize, StoreError>> {
            self.inner.count(collection)
        }
    }

    fn documents(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| Document {
                id: format!("product_{i}"),
                text: format!("Sản phẩm: mặt hàng số {i}"),
                metadata: HashMap::from([("type".into(), serde_json::json!("product"))]),
            })
            .collect()
    }

    #[tokio::test]
    async fn hundred_documents_batch_fifty_issues_two_upserts() {
        let store = Arc::new(CountingStore::new());
        let writer = IndexWriter::new(
            Arc::new(StubEmbedder::new(16)),
            Arc::clone(&store) as Arc<dyn VectorStore>,
            "kb",
        );

        let written = writer.write(&documents(100)).await.unwrap();
        assert_eq!(written, 100);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 2);
        assert_eq!(store.inner.count("kb").await.unwrap(), 100);
    }

    #[tokio::test]
    async fn partial_last_batch() {
        let store = Arc::new(CountingStore::new());
        let writer = IndexWriter::new(
            Arc::new(StubEmbedder::new(16)),
            Arc::clone(&store) as Arc<dyn VectorStore>,
            "kb",
        )
        .with_batch_size(40);

        let written = writer.write(&documents(100)).await.unwrap();
        assert_eq!(written, 100);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn rewrite_is_idempotent() {
        let store = Arc::new(InMemoryVectorStore::new());
        let writer = IndexWriter::new(
            Arc::new(StubEmbedder::new(16)),
            Arc::clone(&store) as Arc<dyn VectorStore>,
            "kb",
        );

        let docs = documents(7);
        writer.write(&docs).await.unwrap();
        writer.write(&docs).await.unwrap();
        assert_eq!(store.count("kb").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn empty_input_writes_nothing() {
        let store = Arc::new(CountingStore::new());
        let writer = IndexWriter::new(
            Arc::new(StubEmbedder::new(16)),
            Arc::clone(&store) as Arc<dyn VectorStore>,
            "kb",
        );

        assert_eq!(writer.write(&[]).await.unwrap(), 0);
        assert_eq!(store.upserts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn embedding_failure_aborts_with_batch_index() {
        let store = Arc::new(InMemoryVectorStore::new());
        let writer = IndexWriter::new(
            Arc::new(StubEmbedder::failing()),
            store as Arc<dyn VectorStore>,
            "kb",
        );

        let err = writer.write(&documents(3)).await.unwrap_err();
        assert!(matches!(err, RagError::BatchAborted { index: 0, .. }));
    }

    #[tokio::test]
    async fn earlier_batches_stay_committed_on_failure() {
        struct FailSecondUpsert {
            inner: InMemoryVectorStore,
            upserts: AtomicUsize,
        }

        impl VectorStore for FailSecondUpsert {
            fn ensure_collection(
                &self,
                collection: &str,
                vector_size: u64,
            ) -> BoxFuture<'_, Result<(), StoreError>> {
                self.inner.ensure_collection(collection, vector_size)
            }

            fn collection_exists(
                &self,
                collection: &str,
            ) -> BoxFuture<'_, Result<bool, StoreError>> {
                self.inner.collection_exists(collection)
            }

            fn upsert(
                &self,
                collection: &str,
                records: Vec<VectorRecord>,
            ) -> BoxFuture<'_, Result<(), StoreError>> {
                if self.upserts.fetch_add(1, Ordering::SeqCst) >= 1 {
                    return Box::pin(async { Err(StoreError::Upsert("disk full".into())) });
                }
                self.inner.upsert(collection, records)
            }

            fn query(
                &self,
                collection: &str,
                vector: Vec<f32>,
                k: usize,
            ) -> BoxFuture<'_, Result<Vec<ScoredRecord>, StoreError>> {
                self.inner.query(collection, vector, k)
            }

            fn count(&self, collection: &str) -> BoxFuture<'_, Result<usize, StoreError>> {
                self.inner.count(collection)
            }
        }

        let store = Arc::new(FailSecondUpsert {
            inner: InMemoryVectorStore::new(),
            upserts: AtomicUsize::new(0),
        });
        let writer = IndexWriter::new(
            Arc::new(StubEmbedder::new(16)),
            Arc::clone(&store) as Arc<dyn VectorStore>,
            "kb",
        )
        .with_batch_size(2);

        let err = writer.write(&documents(4)).await.unwrap_err();
        assert!(matches!(err, RagError::BatchAborted { index: 1, .. }));
        // first batch committed
        assert_eq!(store.inner.count("kb").await.unwrap(), 2);
    }
}
