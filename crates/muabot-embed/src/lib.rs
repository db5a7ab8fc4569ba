//! Embedding backends for the knowledge base, with load-time fallback.
//!
//! Backends are attempted in order once at startup; the first that loads
//! becomes the active backend for the lifetime of the process. There is no
//! per-call fallback.

pub mod error;
mod hub;
#[cfg(feature = "mock")]
pub mod mock;
pub mod phobert;
pub mod sbert;

use std::sync::Arc;

pub use candle_core::Device;
pub use error::EmbedError;
pub use phobert::PhobertEmbedder;
pub use sbert::SbertEmbedder;

/// Sentence-embedding model tuned for Vietnamese.
pub const DEFAULT_PRIMARY_REPO: &str = "keepitreal/vietnamese-sbert";
/// General-purpose encoder used when the primary fails to load.
pub const DEFAULT_FALLBACK_REPO: &str = "vinai/phobert-base-v2";

/// A loaded embedding backend: text in, fixed-length vector out.
///
/// The dimensionality is backend-defined and must stay constant for the
/// lifetime of a given vector-store collection; mixing dimensionalities is a
/// fatal misconfiguration.
pub trait TextEmbedder: Send + Sync {
    /// Embed a single text into a fixed-length vector.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or the model forward pass fails.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    fn name(&self) -> &'static str;
}

/// Backend selection for [`load_embedder`].
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EmbedConfig {
    pub primary_repo: String,
    pub fallback_repo: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            primary_repo: DEFAULT_PRIMARY_REPO.into(),
            fallback_repo: DEFAULT_FALLBACK_REPO.into(),
        }
    }
}

type Factory<'a> = Box<dyn Fn() -> Result<Arc<dyn TextEmbedder>, EmbedError> + 'a>;

/// Load the first embedding backend that initializes successfully.
///
/// Candidates are tried in order: the sentence-embedding primary, then the
/// mean-pooled PhoBERT fallback. Load failures are logged and the next
/// candidate is attempted; a backend that loaded never falls back per call.
///
/// # Errors
///
/// Returns [`EmbedError::Unavailable`] if no backend could be loaded.
pub fn load_embedder(config: &EmbedConfig) -> Result<Arc<dyn TextEmbedder>, EmbedError> {
    let device = Device::Cpu;
    let candidates: Vec<(&str, Factory<'_>)> = vec![
        (
            "sentence-bert",
            Box::new(|| {
                Ok(Arc::new(SbertEmbedder::load(&config.primary_repo, &device)?)
                    as Arc<dyn TextEmbedder>)
            }),
        ),
        (
            "phobert-mean-pool",
            Box::new(|| {
                Ok(
                    Arc::new(PhobertEmbedder::load(&config.fallback_repo, &device)?)
                        as Arc<dyn TextEmbedder>,
                )
            }),
        ),
    ];

    for (name, factory) in candidates {
        match factory() {
            Ok(embedder) => {
                tracing::info!(backend = name, "embedding backend loaded");
                return Ok(embedder);
            }
            Err(e) => {
                tracing::warn!(backend = name, error = %e, "embedding backend failed to load");
            }
        }
    }

    Err(EmbedError::Unavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_repos() {
        let cfg = EmbedConfig::default();
        assert_eq!(cfg.primary_repo, DEFAULT_PRIMARY_REPO);
        assert_eq!(cfg.fallback_repo, DEFAULT_FALLBACK_REPO);
    }

    #[test]
    fn unavailable_display() {
        let e = EmbedError::Unavailable;
        assert_eq!(e.to_string(), "no embedding backend could be loaded");
    }

    #[test]
    fn config_deserializes() {
        let cfg: EmbedConfig = serde_json::from_value(serde_json::json!({
            "primary_repo": "a/b",
            "fallback_repo": "c/d",
        }))
        .unwrap();
        assert_eq!(cfg.primary_repo, "a/b");
        assert_eq!(cfg.fallback_repo, "c/d");
    }
}
