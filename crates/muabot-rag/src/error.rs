use muabot_embed::EmbedError;
use muabot_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum RagError {
    #[error("query must not be empty")]
    InvalidQuery,

    #[error("vector index is not initialized")]
    IndexUnavailable,

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbedError),

    #[error("vector store error: {0}")]
    Store(#[from] StoreError),

    #[error("index batch {index} aborted: {source}")]
    BatchAborted {
        index: usize,
        #[source]
        source: Box<RagError>,
    },
}

pub type Result<T> = std::result::Result<T, RagError>;
