use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XlmRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;

use crate::error::EmbedError;
use crate::{TextEmbedder, hub};

/// Token budget for the fallback encoder; longer inputs are truncated, never chunked.
const MAX_TOKENS: usize = 256;

/// PhoBERT fallback backend.
///
/// A plain XLM-RoBERTa encoder without sentence-embedding fine-tuning; raw
/// token representations are mean-pooled across the attention mask to form a
/// single sentence vector.
#[derive(Clone)]
pub struct PhobertEmbedder {
    model: Arc<XLMRobertaModel>,
    tokenizer: Tokenizer,
    device: Device,
}

impl std::fmt::Debug for PhobertEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhobertEmbedder")
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl PhobertEmbedder {
    /// Pull a PhoBERT checkpoint from the hub and build the encoder.
    ///
    /// Prefers `model.safetensors`; older checkpoints ship only
    /// `pytorch_model.bin`, which is read through candle's pickle loader.
    ///
    /// # Errors
    ///
    /// Returns [`EmbedError::ModelLoad`] when any checkpoint file cannot be
    /// fetched or parsed.
    pub fn load(repo_id: &str, device: &Device) -> Result<Self, EmbedError> {
        let repo = hub::model_repo(repo_id)?;
        let config: XlmRobertaConfig =
            hub::read_config(&hub::fetch(&repo, repo_id, "config.json")?)?;
        let tokenizer = hub::load_tokenizer(&hub::fetch(&repo, repo_id, "tokenizer.json")?)?;

        let vb = match repo.get("model.safetensors") {
            Ok(weights_path) => hub::mmap_weights(weights_path, device)?,
            Err(_) => {
                let weights_path = hub::fetch(&repo, repo_id, "pytorch_model.bin")?;
                let tensors = candle_core::pickle::read_all(&weights_path)?;
                VarBuilder::from_tensors(tensors.into_iter().collect(), DType::F32, device)
            }
        };

        let model = XLMRobertaModel::new(&config, vb)?;

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

        let mut token_ids = encoding.get_ids().to_vec();
        let mut attention = encoding.get_attention_mask().to_vec();
        token_ids.truncate(MAX_TOKENS);
        attention.truncate(MAX_TOKENS);

        let seq_len = token_ids.len();
        let input_ids = Tensor::new(token_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(attention.as_slice(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = Tensor::zeros((1, seq_len), DType::U32, &self.device)?;

        let hidden = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;

        // only attended positions contribute to the pooled vector
        let mask = attention_mask.to_dtype(hidden.dtype())?;
        let mask = mask.unsqueeze(2)?.broadcast_as(hidden.shape())?;
        let summed = (&hidden * &mask)?.sum(1)?;
        let counts = mask.sum(1)?;
        let pooled = summed.broadcast_div(&counts)?;

        hub::unit_row(&pooled)
    }
}

impl TextEmbedder for PhobertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        self.embed_sync(text)
    }

    fn name(&self) -> &'static str {
        "phobert-mean-pool"
    }
}
