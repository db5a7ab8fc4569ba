//! Turns raw shop records (products, reviews, comments, FAQs) into
//! normalized documents ready for embedding.
//!
//! Normalization is pure and deterministic: the same record always yields a
//! byte-identical text and metadata, and the document id `{kind}_{key}` is
//! the idempotent upsert key for the vector index.

pub mod builder;
pub mod error;
pub mod faq;
pub mod normalize;
pub mod source;

use std::collections::HashMap;

pub use builder::{RawCorpus, build_corpus};
pub use error::CorpusError;
pub use faq::{FaqEntry, seed_faqs};
pub use normalize::normalize;
pub use source::{JsonRecordSource, RecordSource, fetch_corpus};

/// One fetched row, keyed as the system of record spells its columns.
pub type RawRecord = HashMap<String, serde_json::Value>;

/// The four kinds of source records feeding the knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Product,
    Review,
    Comment,
    Faq,
}

impl SourceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Review => "review",
            Self::Comment => "comment",
            Self::Faq => "faq",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized document: embedding/display text plus tracing metadata.
///
/// `metadata` always carries `"type"` and enough identifying fields to trace
/// a retrieved document back to its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_display() {
        assert_eq!(SourceKind::Product.to_string(), "product");
        assert_eq!(SourceKind::Faq.to_string(), "faq");
    }
}
