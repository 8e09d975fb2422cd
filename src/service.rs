//! The query-serving service object.
//!
//! [`Companion`] owns the chunk store and configuration and exposes the
//! query boundary: every `ask` call syncs the store against the docs
//! directory, reconciles document sources into a bounded context, composes
//! the prompt, and runs the provider chain. Initialization order is fixed:
//! construct the store, run the startup sync, then serve queries.
//!
//! Callers always receive a user-safe string — internal errors are logged
//! server-side and translated, never propagated raw.

use std::sync::Mutex;
use tracing::{info, warn};

use crate::config::Config;
use crate::ingest;
use crate::llm;
use crate::models::SyncReport;
use crate::prompt;
use crate::reason;
use crate::store::ChunkStore;

pub const MSG_EMPTY_MESSAGE: &str = "Please send a non-empty message.";
pub const MSG_MISSING_API_KEY: &str = "Please provide your Fireworks AI API key.";
pub const MSG_EMPTY_KNOWLEDGE_BASE: &str = "The knowledge base is empty. Please add documents.";
pub const MSG_GENERIC_FAILURE: &str =
    "Sorry, I encountered an error while answering. Please try again.";

pub struct Companion {
    config: Config,
    // Store mutations are an atomic read-modify-persist cycle; a single
    // writer lock keeps concurrent requests from interleaving rewrites.
    store: Mutex<ChunkStore>,
}

impl Companion {
    /// Opens the store and runs the startup sync before serving anything.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let mut store = ChunkStore::open(&config.store.dir)?;
        let report = ingest::sync(&config.docs.dir, &mut store, &config.chunking)?;
        if !report.is_empty() {
            info!(
                "startup sync: added {}, removed {}",
                report.added.len(),
                report.removed.len()
            );
        }
        Ok(Self {
            config,
            store: Mutex::new(store),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Re-syncs the store against the docs directory.
    pub fn sync(&self) -> anyhow::Result<SyncReport> {
        let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        ingest::sync(&self.config.docs.dir, &mut store, &self.config.chunking)
    }

    /// Current `(records, sources)` counts.
    pub fn stats(&self) -> (usize, usize) {
        let store = self.store.lock().unwrap_or_else(|e| e.into_inner());
        (store.len(), store.source_count())
    }

    /// Answers one user question. Never returns an error: every failure mode
    /// maps to a fixed user-facing message.
    pub async fn ask(&self, message: &str, project: Option<&str>, api_key: &str) -> String {
        let message = message.trim();
        if message.is_empty() {
            return MSG_EMPTY_MESSAGE.to_string();
        }
        if api_key.trim().is_empty() {
            return MSG_MISSING_API_KEY.to_string();
        }

        // Sync first so answers reflect the directory's current state. A
        // failed sync still leaves a usable (possibly stale) store.
        let context_blocks = {
            let mut store = self.store.lock().unwrap_or_else(|e| e.into_inner());
            if let Err(e) = ingest::sync(&self.config.docs.dir, &mut store, &self.config.chunking)
            {
                warn!("pre-query sync failed; answering from existing store: {}", e);
            }

            if store.is_empty() {
                return MSG_EMPTY_KNOWLEDGE_BASE.to_string();
            }

            reason::build_context(
                store.records(),
                message,
                project,
                self.config.retrieval.max_snippet_chars,
            )
        };

        let final_prompt = prompt::compose(message, &context_blocks, project);

        match llm::generate_answer(&self.config.llm, &final_prompt, api_key).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("llm call failed: {}", e);
                MSG_GENERIC_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ChunkingConfig, DocsConfig, LlmConfig, RetrievalConfig, ServerConfig, StoreConfig};
    use std::path::Path;

    fn test_config(root: &Path) -> Config {
        Config {
            docs: DocsConfig {
                dir: root.join("docs"),
            },
            store: StoreConfig {
                dir: root.join("store"),
            },
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            server: ServerConfig::default(),
        }
    }

    #[tokio::test]
    async fn empty_message_short_circuits() {
        let tmp = tempfile::tempdir().unwrap();
        let companion = Companion::new(test_config(tmp.path())).unwrap();
        assert_eq!(companion.ask("   ", None, "key").await, MSG_EMPTY_MESSAGE);
    }

    #[tokio::test]
    async fn missing_api_key_short_circuits() {
        let tmp = tempfile::tempdir().unwrap();
        let companion = Companion::new(test_config(tmp.path())).unwrap();
        assert_eq!(
            companion.ask("hello", None, "").await,
            MSG_MISSING_API_KEY
        );
    }

    #[tokio::test]
    async fn empty_store_yields_fixed_response() {
        let tmp = tempfile::tempdir().unwrap();
        // Docs dir exists but is empty, so the store stays empty.
        std::fs::create_dir_all(tmp.path().join("docs")).unwrap();
        let companion = Companion::new(test_config(tmp.path())).unwrap();
        assert_eq!(
            companion.ask("anything", None, "key").await,
            MSG_EMPTY_KNOWLEDGE_BASE
        );
    }

    #[test]
    fn startup_sync_ingests_existing_docs() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("guide.txt"), "1. do the thing\n2. done").unwrap();

        let companion = Companion::new(test_config(tmp.path())).unwrap();
        let (records, sources) = companion.stats();
        assert_eq!(sources, 1);
        assert!(records >= 1);
    }

    #[test]
    fn sync_picks_up_new_files() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("a.txt"), "first doc").unwrap();

        let companion = Companion::new(test_config(tmp.path())).unwrap();
        std::fs::write(docs.join("b.txt"), "second doc").unwrap();

        let report = companion.sync().unwrap();
        assert_eq!(report.added.len(), 1);
        let (_, sources) = companion.stats();
        assert_eq!(sources, 2);
    }
}
