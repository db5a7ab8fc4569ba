//! The knowledge-base service: one façade over embedding, indexing,
//! retrieval, and composition.

use std::collections::HashMap;
use std::sync::Arc;

use muabot_corpus::Document;
use muabot_embed::TextEmbedder;
use muabot_store::VectorStore;

use crate::composer::{ChatReply, CitedSource, Composer};
use crate::error::RagError;
use crate::retriever::{Retrieved, Retriever};
use crate::writer::IndexWriter;

/// Documents consulted per chat turn.
pub const CHAT_TOP_K: usize = 3;

/// Conversation id used when the caller supplies none.
pub const DEFAULT_CONVERSATION_ID: &str = "default";

/// Query result set plus the embedding the query was matched with.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub results: Vec<Retrieved>,
    pub query_vector: Vec<f32>,
}

/// One chat turn: the composed reply, its sources, and the conversation id
/// it is attributed to.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    pub sources: Vec<CitedSource>,
    pub conversation_id: String,
}

/// Health snapshot of the backing collection.
#[derive(Debug, Clone)]
pub struct CollectionStatus {
    pub name: String,
    pub document_count: usize,
    pub status: &'static str,
}

/// Ties the pipeline stages together over one collection.
///
/// All operations share the same embedder, so index-time and query-time
/// vectors always come from the same backend.
pub struct KnowledgeService {
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn VectorStore>,
    collection: String,
    writer: IndexWriter,
    retriever: Retriever,
    composer: Composer,
}

impl std::fmt::Debug for KnowledgeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeService")
            .field("collection", &self.collection)
            .field("embedder", &self.embedder.name())
            .finish_non_exhaustive()
    }
}

impl KnowledgeService {
    #[must_use]
    pub fn new(
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Self {
        let collection = collection.into();
        Self {
            writer: IndexWriter::new(
                Arc::clone(&embedder),
                Arc::clone(&store),
                collection.clone(),
            ),
            retriever: Retriever::new(
                Arc::clone(&embedder),
                Arc::clone(&store),
                collection.clone(),
            ),
            composer: Composer::default(),
            embedder,
            store,
            collection,
        }
    }

    #[must_use]
    pub fn with_composer(mut self, composer: Composer) -> Self {
        self.composer = composer;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.writer = IndexWriter::new(
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
            self.collection.clone(),
        )
        .with_batch_size(batch_size);
        self
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed a single text with the active backend.
    ///
    /// # Errors
    ///
    /// Propagates backend inference failures.
    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>, RagError> {
        Ok(self.embedder.embed(text)?)
    }

    /// Index the given documents, returning how many were written.
    ///
    /// # Errors
    ///
    /// See [`IndexWriter::write`].
    pub async fn index(&self, documents: &[Document]) -> Result<usize, RagError> {
        self.writer.write(documents).await
    }

    /// Index ad-hoc texts. Positions without a caller-supplied id get a
    /// sequential `doc_{i}` id.
    ///
    /// # Errors
    ///
    /// See [`IndexWriter::write`].
    pub async fn add_documents(
        &self,
        texts: &[String],
        metadata: Option<&[HashMap<String, serde_json::Value>]>,
        ids: Option<&[String]>,
    ) -> Result<usize, RagError> {
        let documents: Vec<Document> = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Document {
                id: ids
                    .and_then(|ids| ids.get(i))
                    .cloned()
                    .unwrap_or_else(|| format!("doc_{i}")),
                text: text.clone(),
                metadata: metadata
                    .and_then(|m| m.get(i))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect();
        self.index(&documents).await
    }

    /// Top-k similarity search, also exposing the query embedding.
    ///
    /// # Errors
    ///
    /// See [`Retriever::retrieve`].
    pub async fn query(&self, query: &str, k: usize) -> Result<QueryOutcome, RagError> {
        let (results, query_vector) = self.retriever.retrieve_with_vector(query, k).await?;
        Ok(QueryOutcome {
            results,
            query_vector,
        })
    }

    /// One chat turn: retrieve [`CHAT_TOP_K`] documents and compose a reply.
    ///
    /// # Errors
    ///
    /// See [`Retriever::retrieve`].
    pub async fn chat(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatOutcome, RagError> {
        let retrieved = self.retriever.retrieve(message, CHAT_TOP_K).await?;
        let ChatReply { response, sources } = self.composer.compose(message, &retrieved);

        let conversation_id = conversation_id
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_CONVERSATION_ID)
            .to_owned();

        tracing::info!(
            conversation = %conversation_id,
            sources = sources.len(),
            "chat turn composed"
        );

        Ok(ChatOutcome {
            response,
            sources,
            conversation_id,
        })
    }

    /// Collection health: name, document count, and a fixed `"active"` flag.
    ///
    /// # Errors
    ///
    /// [`RagError::IndexUnavailable`] when the collection has never been
    /// created; store failures otherwise.
    pub async fn collection_status(&self) -> Result<CollectionStatus, RagError> {
        if !self.store.collection_exists(&self.collection).await? {
            return Err(RagError::IndexUnavailable);
        }
        let document_count = self.store.count(&self.collection).await?;
        Ok(CollectionStatus {
            name: self.collection.clone(),
            document_count,
            status: "active",
        })
    }
}
