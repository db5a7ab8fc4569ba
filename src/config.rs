use std::path::Path;

use anyhow::Context;
use muabot_embed::EmbedConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub qdrant: QdrantConfig,
    #[serde(default)]
    pub embed: EmbedConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub collection: String,
    pub batch_size: usize,
    pub records_path: String,
    /// Abort the corpus build on the first malformed record instead of
    /// skipping it.
    pub strict: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct QdrantConfig {
    pub url: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            collection: "ecommerce_knowledge".into(),
            batch_size: muabot_rag::DEFAULT_BATCH_SIZE,
            records_path: "./data/records.json".into(),
            strict: false,
        }
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".into(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("MUABOT_QDRANT_URL") {
            self.qdrant.url = v;
        }
        if let Ok(v) = std::env::var("MUABOT_COLLECTION") {
            self.index.collection = v;
        }
        if let Ok(v) = std::env::var("MUABOT_RECORDS_PATH") {
            self.index.records_path = v;
        }
        if let Ok(v) = std::env::var("MUABOT_EMBED_PRIMARY") {
            self.embed.primary_repo = v;
        }
        if let Ok(v) = std::env::var("MUABOT_EMBED_FALLBACK") {
            self.embed.fallback_repo = v;
        }
    }

    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            qdrant: QdrantConfig::default(),
            embed: EmbedConfig::default(),
        }
    }
}
