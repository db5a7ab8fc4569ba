//! Checkpoint plumbing shared by the embedding backends: HuggingFace Hub
//! downloads, config/tokenizer parsing, weight mapping, output normalization.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use hf_hub::api::sync::ApiRepo;
use tokenizers::Tokenizer;

use crate::error::EmbedError;

pub(crate) fn model_repo(repo_id: &str) -> Result<ApiRepo, EmbedError> {
    let api = hf_hub::api::sync::Api::new()
        .map_err(|e| EmbedError::ModelLoad(format!("hub client unavailable: {e}")))?;
    Ok(api.model(repo_id.to_owned()))
}

pub(crate) fn fetch(repo: &ApiRepo, repo_id: &str, file: &str) -> Result<PathBuf, EmbedError> {
    repo.get(file)
        .map_err(|e| EmbedError::ModelLoad(format!("{repo_id} is missing {file}: {e}")))
}

pub(crate) fn read_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EmbedError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| EmbedError::ModelLoad(format!("unreadable model config: {e}")))?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn load_tokenizer(path: &Path) -> Result<Tokenizer, EmbedError> {
    Tokenizer::from_file(path)
        .map_err(|e| EmbedError::ModelLoad(format!("broken tokenizer file: {e}")))
}

pub(crate) fn mmap_weights(
    path: PathBuf,
    device: &Device,
) -> Result<VarBuilder<'static>, EmbedError> {
    // SAFETY: the checkpoint sits in the hub cache and nothing rewrites it
    // while mapped
    let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[path], DType::F32, device)? };
    Ok(vb)
}

/// Scale a `[1, dim]` pooled tensor to unit length and move it to the host.
pub(crate) fn unit_row(pooled: &Tensor) -> Result<Vec<f32>, EmbedError> {
    let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
    let unit = pooled.broadcast_div(&norm)?.squeeze(0)?;
    unit.to_vec1::<f32>().map_err(EmbedError::Candle)
}
