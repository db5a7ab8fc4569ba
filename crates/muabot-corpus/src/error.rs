use crate::SourceKind;

#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("malformed {kind} record: missing or invalid field `{field}`")]
    MalformedRecord {
        kind: SourceKind,
        field: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record source error: {0}")]
    Source(String),
}
