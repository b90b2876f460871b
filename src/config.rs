//! TOML configuration parsing and validation.
//!
//! Every external endpoint and model name is read from here and handed to
//! client constructors explicitly; nothing is held in process-wide state.
//!
//! ```toml
//! [store]
//! dir = "./data/embeddings"
//!
//! [embedding]
//! provider = "ollama"
//! model = "nomic-embed-text"
//!
//! [generation]
//! provider = "ollama"
//! model = "llama3.2"
//!
//! [retrieval]
//! top_k = 5
//!
//! [server]
//! bind = "127.0.0.1:8001"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Directory holding `*_embeddings.json` collection files.
    pub dir: PathBuf,
    /// Where `POST /upload` saves incoming files before ingestion.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn upload_dir(&self) -> PathBuf {
        match &self.upload_dir {
            Some(dir) => dir.clone(),
            None => self
                .dir
                .parent()
                .map(|p| p.join("upload"))
                .unwrap_or_else(|| PathBuf::from("upload")),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts the ingestion path makes for a failed row.
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            timeout_secs: default_embedding_timeout_secs(),
            max_retries: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_embedding_timeout_secs() -> u64 {
    30
}
fn default_generation_timeout_secs() -> u64 {
    60
}
fn default_top_k() -> usize {
    5
}
fn default_bind() -> String {
    "127.0.0.1:8001".to_string()
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn base_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }
}

impl Config {
    /// Configuration with both model providers disabled and the given store.
    pub fn minimal(store_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig {
                dir: store_dir.into(),
                upload_dir: None,
            },
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            retrieval: RetrievalConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            anyhow::bail!("retrieval.top_k must be >= 1");
        }

        for (section, provider, model, timeout) in [
            (
                "embedding",
                &self.embedding.provider,
                &self.embedding.model,
                self.embedding.timeout_secs,
            ),
            (
                "generation",
                &self.generation.provider,
                &self.generation.model,
                self.generation.timeout_secs,
            ),
        ] {
            match provider.as_str() {
                "disabled" => continue,
                "ollama" => {}
                other => anyhow::bail!(
                    "Unknown {} provider: '{}'. Must be disabled or ollama.",
                    section,
                    other
                ),
            }
            if model.as_deref().map_or(true, str::is_empty) {
                anyhow::bail!(
                    "{}.model must be specified when provider is '{}'",
                    section,
                    provider
                );
            }
            if timeout == 0 {
                anyhow::bail!("{}.timeout_secs must be > 0", section);
            }
        }

        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    config.validate()?;

    Ok(config)
}
