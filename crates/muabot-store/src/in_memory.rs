use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;

use crate::{ScoredRecord, StoreError, VectorRecord, VectorStore};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

struct StoredRecord {
    vector: Vec<f32>,
    text: String,
    metadata: HashMap<String, serde_json::Value>,
}

struct InMemoryCollection {
    vector_size: u64,
    records: HashMap<String, StoredRecord>,
}

/// Exact cosine-distance store held in process memory.
///
/// Used by tests and the non-persistent dev setup; semantics match the
/// Qdrant binding (idempotent upsert, ascending-distance query, vectors
/// checked against the collection's dimensionality).
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, InMemoryCollection>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryVectorStore").finish_non_exhaustive()
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

impl VectorStore for InMemoryVectorStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| StoreError::Collection(e.to_string()))?;
            cols.entry(collection).or_insert_with(|| InMemoryCollection {
                vector_size,
                records: HashMap::new(),
            });
            Ok(())
        })
    }

    fn collection_exists(&self, collection: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| StoreError::Collection(e.to_string()))?;
            Ok(cols.contains_key(&collection))
        })
    }

    fn upsert(
        &self,
        collection: &str,
        records: Vec<VectorRecord>,
    ) -> BoxFuture<'_, Result<(), StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let mut cols = self
                .collections
                .write()
                .map_err(|e| StoreError::Upsert(e.to_string()))?;
            let col = cols
                .get_mut(&collection)
                .ok_or_else(|| StoreError::Upsert(format!("collection {collection} not found")))?;
            for r in records {
                if r.vector.len() as u64 != col.vector_size {
                    return Err(StoreError::Upsert(format!(
                        "vector for {} has {} dimension(s), collection {collection} expects {}",
                        r.id,
                        r.vector.len(),
                        col.vector_size
                    )));
                }
                col.records.insert(
                    r.id,
                    StoredRecord {
                        vector: r.vector,
                        text: r.text,
                        metadata: r.metadata,
                    },
                );
            }
            Ok(())
        })
    }

    fn query(
        &self,
        collection: &str,
        vector: Vec<f32>,
        k: usize,
    ) -> BoxFuture<'_, Result<Vec<ScoredRecord>, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| StoreError::Query(e.to_string()))?;
            let col = cols
                .get(&collection)
                .ok_or_else(|| StoreError::Query(format!("collection {collection} not found")))?;
            if vector.len() as u64 != col.vector_size {
                return Err(StoreError::Query(format!(
                    "query vector has {} dimension(s), collection {collection} expects {}",
                    vector.len(),
                    col.vector_size
                )));
            }

            let mut scored: Vec<ScoredRecord> = col
                .records
                .iter()
                .map(|(id, r)| ScoredRecord {
                    id: id.clone(),
                    text: r.text.clone(),
                    metadata: r.metadata.clone(),
                    distance: cosine_distance(&vector, &r.vector),
                })
                .collect();

            scored.sort_by(|a, b| {
                a.distance
                    .partial_cmp(&b.distance)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            scored.truncate(k);
            Ok(scored)
        })
    }

    fn count(&self, collection: &str) -> BoxFuture<'_, Result<usize, StoreError>> {
        let collection = collection.to_owned();
        Box::pin(async move {
            let cols = self
                .collections
                .read()
                .map_err(|e| StoreError::Count(e.to_string()))?;
            let col = cols
                .get(&collection)
                .ok_or_else(|| StoreError::Count(format!("collection {collection} not found")))?;
            Ok(col.records.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, vector: Vec<f32>, text: &str) -> VectorRecord {
        VectorRecord {
            id: id.into(),
            vector,
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn ensure_collection_and_exists() {
        let store = InMemoryVectorStore::new();
        assert!(!store.collection_exists("test").await.unwrap());
        store.ensure_collection("test", 3).await.unwrap();
        assert!(store.collection_exists("test").await.unwrap());
    }

    #[tokio::test]
    async fn ensure_collection_idempotent() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store
            .upsert("test", vec![record("a", vec![1.0, 0.0, 0.0], "alpha")])
            .await
            .unwrap();
        store.ensure_collection("test", 3).await.unwrap();
        assert_eq!(store.count("test").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_and_query_ascending_distance() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();

        store
            .upsert(
                "test",
                vec![
                    record("a", vec![1.0, 0.0, 0.0], "alpha"),
                    record("b", vec![0.0, 1.0, 0.0], "beta"),
                    record("c", vec![0.9, 0.1, 0.0], "gamma"),
                ],
            )
            .await
            .unwrap();

        let results = store.query("test", vec![1.0, 0.0, 0.0], 3).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "a");
        assert!(results[0].distance.abs() < f32::EPSILON);
        assert!(results[0].distance <= results[1].distance);
        assert!(results[1].distance <= results[2].distance);
    }

    #[tokio::test]
    async fn query_truncates_to_k() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert(
                "test",
                vec![
                    record("a", vec![1.0, 0.0], "a"),
                    record("b", vec![0.0, 1.0], "b"),
                ],
            )
            .await
            .unwrap();

        let results = store.query("test", vec![1.0, 0.0], 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn query_sparse_returns_fewer_than_k() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert("test", vec![record("a", vec![1.0, 0.0], "a")])
            .await
            .unwrap();

        let results = store.query("test", vec![1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn upsert_same_id_overwrites() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 2).await.unwrap();
        store
            .upsert("test", vec![record("a", vec![1.0, 0.0], "old")])
            .await
            .unwrap();
        store
            .upsert("test", vec![record("a", vec![0.0, 1.0], "new")])
            .await
            .unwrap();

        assert_eq!(store.count("test").await.unwrap(), 1);
        let results = store.query("test", vec![0.0, 1.0], 1).await.unwrap();
        assert_eq!(results[0].text, "new");
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        let result = store
            .upsert("test", vec![record("a", vec![1.0], "one-dimensional")])
            .await;
        assert!(matches!(result, Err(StoreError::Upsert(_))));
        assert_eq!(store.count("test").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_rejects_wrong_dimension() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("test", 3).await.unwrap();
        store
            .upsert("test", vec![record("a", vec![1.0, 0.0, 0.0], "alpha")])
            .await
            .unwrap();
        let result = store.query("test", vec![1.0, 0.0], 1).await;
        assert!(matches!(result, Err(StoreError::Query(_))));
    }

    #[tokio::test]
    async fn query_missing_collection_errors() {
        let store = InMemoryVectorStore::new();
        let result = store.query("missing", vec![1.0], 1).await;
        assert!(matches!(result, Err(StoreError::Query(_))));
    }

    #[test]
    fn cosine_distance_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_distance_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_distance_zero_vector() {
        assert!((cosine_distance(&[0.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryVectorStore::new();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("InMemoryVectorStore"));
    }
}
