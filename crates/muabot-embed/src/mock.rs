//! Test-only stub embedder.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::TextEmbedder;
use crate::error::EmbedError;

/// Deterministic hashed bag-of-words embedder for tests.
///
/// Each whitespace token is hashed into one dimension, so texts sharing words
/// land close under cosine distance. Vectors are L2-normalized.
#[derive(Debug, Clone)]
pub struct StubEmbedder {
    pub dimension: usize,
    pub fail: bool,
}

impl Default for StubEmbedder {
    fn default() -> Self {
        Self {
            dimension: 32,
            fail: false,
        }
    }
}

impl StubEmbedder {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl TextEmbedder for StubEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if self.fail {
            return Err(EmbedError::Inference("stub embedder failure".into()));
        }
        let mut vector = vec![0.0f32; self.dimension];
        for token in text.to_lowercase().split_whitespace() {
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let h = hasher.finish();
            #[expect(clippy::cast_possible_truncation)]
            let idx = (h as usize) % self.dimension;
            vector[idx] += 1.0;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        Ok(vector)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
