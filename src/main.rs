//! # Doc Companion CLI (`docq`)
//!
//! The `docq` binary drives the document ingestion pipeline and answers
//! questions against the ingested knowledge base.
//!
//! ## Usage
//!
//! ```bash
//! docq --config ./config/docq.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docq sync` | Sync the chunk store against the docs directory |
//! | `docq ask "<question>"` | Answer a question using the document base |
//! | `docq status` | Show store record and source counts |
//! | `docq serve` | Start the HTTP query endpoint |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use doc_companion::config;
use doc_companion::ingest;
use doc_companion::server;
use doc_companion::service::Companion;
use doc_companion::store::ChunkStore;

/// Doc Companion — a document-grounded question answering assistant.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file naming the docs directory, chunk store location, chunking and
/// retrieval parameters, and the model provider chain.
#[derive(Parser)]
#[command(
    name = "docq",
    about = "Doc Companion — a document-grounded question answering assistant",
    version,
    long_about = "Doc Companion ingests a directory of documents (PDF, DOCX, plain text, Markdown) \
    into a persistent chunk store, keeps it in sync via content fingerprints, and answers questions \
    by reconciling competing document sources into a bounded model context."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/docq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Sync the chunk store against the docs directory.
    ///
    /// An empty store is rebuilt from scratch; otherwise only files whose
    /// content fingerprint changed are re-ingested and deleted files are
    /// dropped. Running sync twice on an unchanged directory is a no-op.
    Sync {
        /// Clear the store and re-ingest everything from scratch.
        #[arg(long)]
        rebuild: bool,
    },

    /// Answer a question using the ingested documents.
    ///
    /// Syncs the store, reconciles document sources into a ranked context,
    /// and sends the composed prompt to the configured model provider.
    Ask {
        /// The user question.
        message: String,

        /// Scope the question to a project (woven into the prompt header).
        #[arg(long)]
        project: Option<String>,

        /// Model API key. Falls back to the FIREWORKS_API_KEY environment
        /// variable when omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Show chunk store record and source counts.
    Status,

    /// Start the HTTP query endpoint.
    ///
    /// Serves `POST /send_message` and `GET /health` on the configured bind
    /// address.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Sync { rebuild } => {
            let mut store = ChunkStore::open(&cfg.store.dir)?;
            let report = if rebuild {
                ingest::rebuild(&cfg.docs.dir, &mut store, &cfg.chunking)?
            } else {
                ingest::sync(&cfg.docs.dir, &mut store, &cfg.chunking)?
            };
            println!("sync {}", cfg.docs.dir.display());
            println!("  added: {} source(s)", report.added.len());
            for source in &report.added {
                println!("    + {}", source);
            }
            println!("  removed: {} source(s)", report.removed.len());
            for source in &report.removed {
                println!("    - {}", source);
            }
            println!("  store: {} record(s), {} source(s)", store.len(), store.source_count());
            println!("ok");
        }
        Commands::Ask {
            message,
            project,
            api_key,
        } => {
            let api_key = api_key
                .or_else(|| std::env::var("FIREWORKS_API_KEY").ok())
                .unwrap_or_default();
            let companion = Companion::new(cfg)?;
            let answer = companion.ask(&message, project.as_deref(), &api_key).await;
            println!("{}", answer);
        }
        Commands::Status => {
            let store = ChunkStore::open(&cfg.store.dir)?;
            println!("store {}", cfg.store.dir.display());
            println!("  records: {}", store.len());
            println!("  sources: {}", store.source_count());
        }
        Commands::Serve => {
            let companion = Arc::new(Companion::new(cfg)?);
            server::run_server(companion).await?;
        }
    }

    Ok(())
}
