use std::sync::Arc;

use candle_core::{Device, Tensor};
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;

use crate::error::EmbedError;
use crate::{TextEmbedder, hub};

/// Primary backend: a sentence-transformers style BERT checkpoint tuned for
/// Vietnamese. Single forward pass, sequence-mean pooling, unit-length
/// output.
#[derive(Clone)]
pub struct SbertEmbedder {
    model: Arc<BertModel>,
    tokenizer: Tokenizer,
    device: Device,
}

impl std::fmt::Debug for SbertEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SbertEmbedder")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl SbertEmbedder {
    /// Pull the checkpoint from the hub and build the encoder.
    ///
    /// Sentence-transformers repos always ship `model.safetensors`, so no
    /// pickle fallback is needed here.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::ModelLoad`] when any checkpoint file cannot be
    /// fetched or parsed.
    pub fn load(repo_id: &str, device: &Device) -> Result<Self, EmbedError> {
        let repo = hub::model_repo(repo_id)?;
        let config: BertConfig = hub::read_config(&hub::fetch(&repo, repo_id, "config.json")?)?;
        let tokenizer = hub::load_tokenizer(&hub::fetch(&repo, repo_id, "tokenizer.json")?)?;
        let vb = hub::mmap_weights(hub::fetch(&repo, repo_id, "model.safetensors")?, device)?;
        let model = BertModel::load(vb, &config)?;

        Ok(Self {
            model: Arc::new(model),
            tokenizer,
            device: device.clone(),
        })
    }

    fn embed_sync(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbedError::Inference(format!("tokenization failed: {e}")))?;

        let ids = encoding.get_ids();
        let type_ids = vec![0u32; ids.len()];
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::new(type_ids.as_slice(), &self.device)?.unsqueeze(0)?;

        let hidden = self.model.forward(&input_ids, &token_type_ids, None)?;
        // every position counts equally; the tokenizer emits no padding for
        // a single sequence
        let pooled = hidden.mean(1)?;
        hub::unit_row(&pooled)
    }
}

impl TextEmbedder for SbertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.embed_sync(text)
    }

    fn name(&self) -> &'static str {
        "sentence-bert"
    }
}
