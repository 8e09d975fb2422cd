//! # Doc Companion
//!
//! A document-grounded question answering assistant.
//!
//! Doc Companion ingests a directory of heterogeneous documents (PDF, DOCX,
//! plain text, Markdown) into a persistent chunk store, keeps that store in
//! sync with the directory via content fingerprints, and on each query runs
//! a source-reconciliation pass that ranks competing document sources by
//! heuristic authoritativeness signals before composing a bounded context
//! for an external language model.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌────────────┐
//! │ docs dir  │──▶│ Extract + Chunk  │──▶│ ChunkStore │
//! │ pdf/docx/ │   │ + Fingerprint    │   │ (JSON blob)│
//! │ txt/md    │   └──────────────────┘   └─────┬──────┘
//! └───────────┘                                │
//!                         ┌────────────────────┤
//!                         ▼                    ▼
//!                  ┌─────────────┐      ┌────────────┐
//!                  │ Reconcile + │─────▶│ LLM call   │
//!                  │ Compose     │      │ (Fireworks)│
//!                  └─────────────┘      └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docq sync                       # ingest the docs directory
//! docq ask "how do I get testnet tokens"
//! docq status                     # store record/source counts
//! docq serve                      # start the HTTP query endpoint
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`extract`] | Per-format text extraction |
//! | [`chunk`] | Overlapping boundary-aware chunking |
//! | [`fingerprint`] | Content hashing for change detection |
//! | [`store`] | Persistent chunk store |
//! | [`ingest`] | Directory-to-store sync coordination |
//! | [`reason`] | Source reconciliation and ranking |
//! | [`prompt`] | Final prompt composition |
//! | [`llm`] | Model provider chain |
//! | [`service`] | Query-serving service object |
//! | [`server`] | HTTP query endpoint |

pub mod chunk;
pub mod config;
pub mod extract;
pub mod fingerprint;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod reason;
pub mod server;
pub mod service;
pub mod store;
