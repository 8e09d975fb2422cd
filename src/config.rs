use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub docs: DocsConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocsConfig {
    /// Directory of documents to ingest (recursively).
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Directory holding the persisted chunk blob.
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    crate::chunk::DEFAULT_CHUNK_SIZE
}
fn default_overlap() -> usize {
    crate::chunk::DEFAULT_OVERLAP
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Maximum characters per context snippet emitted for a source.
    #[serde(default = "default_max_snippet_chars")]
    pub max_snippet_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_snippet_chars: default_max_snippet_chars(),
        }
    }
}

fn default_max_snippet_chars() -> usize {
    1500
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Providers tried in order until one succeeds.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_providers() -> Vec<String> {
    vec!["fireworks".to_string()]
}
fn default_model() -> String {
    "accounts/sentientfoundation/models/dobby-unhinged-llama-3-3-70b-new".to_string()
}
fn default_timeout_secs() -> u64 {
    90
}
fn default_max_tokens() -> u32 {
    4096
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

fn default_bind() -> String {
    "127.0.0.1:5001".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }

    // The chunker only pulls a split back to a newline past 40% of the
    // window, so any overlap below that bound guarantees forward progress.
    if config.chunking.overlap * 5 >= config.chunking.chunk_size * 2 {
        anyhow::bail!("chunking.overlap must be less than 40% of chunking.chunk_size");
    }

    if config.retrieval.max_snippet_chars == 0 {
        anyhow::bail!("retrieval.max_snippet_chars must be > 0");
    }

    if config.llm.providers.is_empty() {
        anyhow::bail!("llm.providers must name at least one provider");
    }
    for provider in &config.llm.providers {
        match provider.as_str() {
            "fireworks" => {}
            other => anyhow::bail!("Unknown llm provider: '{}'. Must be fireworks.", other),
        }
    }

    if config.llm.timeout_secs == 0 {
        anyhow::bail!("llm.timeout_secs must be > 0");
    }

    Ok(config)
}
