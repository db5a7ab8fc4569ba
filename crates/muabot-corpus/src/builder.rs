//! Corpus assembly: raw records in, ordered documents out.

use crate::error::CorpusError;
use crate::normalize::{faq_document, normalize};
use crate::{Document, RawRecord, SourceKind, faq};

/// Already-fetched raw records, one list per fetched kind.
///
/// FAQs are not part of the fetch contract; the builder appends the seed set
/// itself.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct RawCorpus {
    #[serde(default)]
    pub products: Vec<RawRecord>,
    #[serde(default)]
    pub reviews: Vec<RawRecord>,
    #[serde(default)]
    pub comments: Vec<RawRecord>,
}

/// Normalize a whole corpus in deterministic order: products, reviews,
/// comments, then the seeded FAQs, preserving fetch order within each kind.
///
/// Malformed records are skipped with a warning; in strict mode the first
/// malformed record aborts the build. Pure apart from logging — no I/O.
///
/// # Errors
///
/// Returns [`CorpusError::MalformedRecord`] only in strict mode.
pub fn build_corpus(corpus: &RawCorpus, strict: bool) -> Result<Vec<Document>, CorpusError> {
    let kinds = [
        (SourceKind::Product, &corpus.products),
        (SourceKind::Review, &corpus.reviews),
        (SourceKind::Comment, &corpus.comments),
    ];

    let total = corpus.products.len() + corpus.reviews.len() + corpus.comments.len();
    let mut documents = Vec::with_capacity(total + faq::seed_faqs().len());

    for (kind, records) in kinds {
        for record in records.iter() {
            match normalize(kind, record) {
                Ok(doc) => documents.push(doc),
                Err(e) if strict => return Err(e),
                Err(e) => {
                    tracing::warn!(kind = %kind, error = %e, "skipping malformed record");
                }
            }
        }
    }

    for (index, entry) in faq::seed_faqs().iter().enumerate() {
        documents.push(faq_document(index, entry));
    }

    tracing::info!(
        products = corpus.products.len(),
        reviews = corpus.reviews.len(),
        comments = corpus.comments.len(),
        faqs = faq::seed_faqs().len(),
        documents = documents.len(),
        "corpus built"
    );

    Ok(documents)
}
