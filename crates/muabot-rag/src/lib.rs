//! Retrieval-augmented answering over the shop knowledge base.
//!
//! The pipeline has a strict one-way data flow: normalized documents are
//! embedded and upserted by the [`IndexWriter`]; at query time the
//! [`Retriever`] embeds the question with the same backend and runs a top-k
//! cosine search; the [`Composer`] then selects a reply with deterministic
//! keyword rules. No text is ever generated.
//!
//! [`KnowledgeService`] wires the stages together over one collection.

mod composer;
mod error;
mod intent;
mod retriever;
mod service;
mod writer;

pub use composer::{
    AVAILABILITY_REPLY, ChatReply, CitedSource, Composer, MAX_SOURCES, NO_CONTEXT_REPLY,
    NO_DESCRIPTION_REPLY, PRICE_FALLBACK, PRICE_PREFIX, UNCLEAR_REPLY,
};
pub use error::{RagError, Result};
pub use intent::{Intent, IntentRule, IntentRules};
pub use retriever::{Retrieved, Retriever};
pub use service::{
    CHAT_TOP_K, ChatOutcome, CollectionStatus, DEFAULT_CONVERSATION_ID, KnowledgeService,
    QueryOutcome,
};
pub use writer::{DEFAULT_BATCH_SIZE, IndexWriter};
