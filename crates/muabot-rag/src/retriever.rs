//! Query-time nearest-neighbor retrieval.

use std::collections::HashMap;
use std::sync::Arc;

use muabot_embed::TextEmbedder;
use muabot_store::VectorStore;

use crate::error::RagError;

/// One retrieved document; `distance` is cosine distance, ascending rank.
#[derive(Debug, Clone)]
pub struct Retrieved {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, serde_json::Value>,
    pub distance: f32,
}

/// Embeds a query with the same backend used at index-build time and runs a
/// top-k similarity search. Store rank order is preserved; a sparse index
/// returning fewer than `k` hits is not an error.
pub struct Retriever {
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl Retriever {
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
        }
    }

    /// Retrieve the top `k` documents for `query`.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidQuery`] for an empty query,
    /// [`RagError::IndexUnavailable`] when the collection does not exist,
    /// and store/embedding failures otherwise.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Retrieved>, RagError> {
        let (results, _) = self.retrieve_with_vector(query, k).await?;
        Ok(results)
    }

    /// Same as [`Self::retrieve`], also returning the query embedding.
    ///
    /// # Errors
    ///
    /// See [`Self::retrieve`].
    pub async fn retrieve_with_vector(
        &self,
        query: &str,
        k: usize,
    ) -> Result<(Vec<Retrieved>, Vec<f32>), RagError> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidQuery);
        }
        if !self.store.collection_exists(&self.collection).await? {
            return Err(RagError::IndexUnavailable);
        }

        let vector = self.embedder.embed(query)?;
        let hits = self
            .store
            .query(&self.collection, vector.clone(), k)
            .await?;

        tracing::debug!(
            collection = %self.collection,
            k,
            hits = hits.len(),
            "retrieval complete"
        );

        let results = hits
            .into_iter()
            .map(|hit| Retrieved {
                id: hit.id,
                text: hit.text,
                metadata: hit.metadata,
                distance: hit.distance,
            })
            .collect();
        Ok((results, vector))
    }
}
