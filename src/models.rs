//! Core data types used throughout Doc Companion.
//!
//! These types represent the chunk records that flow through the ingestion
//! pipeline and the per-query aggregates produced during source
//! reconciliation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One stored chunk of an ingested document.
///
/// `content_hash` is the SHA-256 of the *file's* raw bytes at ingestion time,
/// shared identically by every chunk derived from that file. It is a
/// per-source fingerprint used for change detection, not a per-chunk hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Path of the file this chunk came from; the unit of add/remove.
    pub source: String,
    /// The chunk text itself.
    pub text: String,
    /// Coarse category label derived from the filename stem.
    pub project_tag: String,
    /// SHA-256 hex digest of the source file's bytes.
    pub content_hash: String,
}

/// Result of one ingestion sync: which source paths were (re)ingested and
/// which were dropped from the store.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ephemeral per-source aggregate computed fresh on every query.
///
/// Holds the source's concatenated chunk text plus the heuristic signals the
/// reconciliation engine scores on. Never cached.
#[derive(Debug, Clone)]
pub struct SourceSignal {
    /// All of the source's chunk texts, joined with a blank line, in store order.
    pub text: String,
    /// Matches of procedural cues (numbered steps, "how to", URLs, ...).
    pub procedural_score: usize,
    /// Matches of positive status claims ("is live", "public mainnet", ...).
    pub positive_claims: usize,
    /// Matches of negative status claims ("coming soon", "paused", ...).
    pub negative_claims: usize,
    /// Length of the whitespace-collapsed text.
    pub length: usize,
}
