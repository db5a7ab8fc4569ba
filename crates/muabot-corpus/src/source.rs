//! Data-access contract for the fetchable record kinds.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::builder::RawCorpus;
use crate::error::CorpusError;
use crate::{RawRecord, SourceKind};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches raw records for one source kind, preserving the system of
/// record's ordering. FAQs are seeded in-crate and are not fetchable.
pub trait RecordSource: Send + Sync {
    fn fetch(&self, kind: SourceKind) -> BoxFuture<'_, Result<Vec<RawRecord>, CorpusError>>;
}

/// Fetch every fetchable kind from `source` into a [`RawCorpus`].
///
/// # Errors
///
/// Propagates the first fetch failure.
pub async fn fetch_corpus(source: &dyn RecordSource) -> Result<RawCorpus, CorpusError> {
    Ok(RawCorpus {
        products: source.fetch(SourceKind::Product).await?,
        reviews: source.fetch(SourceKind::Review).await?,
        comments: source.fetch(SourceKind::Comment).await?,
    })
}

/// Record source reading a JSON fixture of the form
/// `{ "products": [...], "reviews": [...], "comments": [...] }`.
///
/// Lets the offline index build run without a live relational database.
#[derive(Debug, Clone)]
pub struct JsonRecordSource {
    path: PathBuf,
}

impl JsonRecordSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<RawCorpus, CorpusError> {
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonRecordSource {
    fn fetch(&self, kind: SourceKind) -> BoxFuture<'_, Result<Vec<RawRecord>, CorpusError>> {
        Box::pin(async move {
            let corpus = self.load()?;
            Ok(match kind {
                SourceKind::Product => corpus.products,
                SourceKind::Review => corpus.reviews,
                SourceKind::Comment => corpus.comments,
                SourceKind::Faq => Vec::new(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn fetches_each_kind() {
        let file = fixture(
            r#"{
                "products": [{"id": 1, "productName": "Táo"}],
                "reviews": [],
                "comments": [{"id": 2, "productId": 1, "text": "ok"}]
            }"#,
        );
        let source = JsonRecordSource::new(file.path());

        let products = source.fetch(SourceKind::Product).await.unwrap();
        assert_eq!(products.len(), 1);
        let comments = source.fetch(SourceKind::Comment).await.unwrap();
        assert_eq!(comments.len(), 1);
        let faqs = source.fetch(SourceKind::Faq).await.unwrap();
        assert!(faqs.is_empty());
    }

    #[tokio::test]
    async fn missing_sections_default_to_empty() {
        let file = fixture(r#"{"products": []}"#);
        let source = JsonRecordSource::new(file.path());
        let corpus = fetch_corpus(&source).await.unwrap();
        assert!(corpus.reviews.is_empty());
        assert!(corpus.comments.is_empty());
    }

    #[tokio::test]
    async fn invalid_json_errors() {
        let file = fixture("not json");
        let source = JsonRecordSource::new(file.path());
        assert!(matches!(
            source.fetch(SourceKind::Product).await,
            Err(CorpusError::Json(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_errors() {
        let source = JsonRecordSource::new("/nonexistent/records.json");
        assert!(matches!(
            source.fetch(SourceKind::Product).await,
            Err(CorpusError::Io(_))
        ));
    }
}
