//! Ingestion coordination.
//!
//! Walks the document directory, diffs it against the chunk store by content
//! fingerprint, and drives add/remove operations so the store converges on
//! the directory's current state. Re-running [`sync`] against an unchanged
//! directory is a no-op; per-file failures are logged and skipped without
//! aborting the batch.

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::chunk::split_text;
use crate::config::ChunkingConfig;
use crate::extract::extract_text;
use crate::fingerprint::fingerprint_file;
use crate::models::{ChunkRecord, SyncReport};
use crate::store::ChunkStore;

/// Derives the project tag from a filename: the stem up to the first `_`,
/// space or `-`, lower-cased. `fogo_testnet-guide.txt` tags as `fogo`.
pub fn project_tag(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    stem.split(['_', ' ', '-'])
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

fn supported_globset() -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in ["**/*.pdf", "**/*.docx", "**/*.txt", "**/*.md"] {
        // Static patterns; construction cannot fail.
        if let Ok(glob) = Glob::new(pattern) {
            builder.add(glob);
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Recursively enumerates supported document files under `docs_dir`, in
/// deterministic path order.
fn discover_files(docs_dir: &Path) -> Vec<PathBuf> {
    let include = supported_globset();
    let mut files = Vec::new();
    for entry in WalkDir::new(docs_dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable directory entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(docs_dir).unwrap_or(entry.path());
        if include.is_match(relative.to_string_lossy().as_ref()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files
}

/// Extracts, chunks, fingerprints and tags a single file. An empty vec means
/// the file had no usable text content.
fn ingest_file(path: &Path, chunking: &ChunkingConfig) -> Result<Vec<ChunkRecord>> {
    let text = extract_text(path)?;
    let chunks = split_text(&text, chunking.chunk_size, chunking.overlap);
    if chunks.is_empty() {
        return Ok(Vec::new());
    }

    let content_hash = fingerprint_file(path)?;
    let source = path.display().to_string();
    let tag = path
        .file_name()
        .map(|n| project_tag(&n.to_string_lossy()))
        .unwrap_or_default();

    Ok(chunks
        .into_iter()
        .map(|text| ChunkRecord {
            source: source.clone(),
            text,
            project_tag: tag.clone(),
            content_hash: content_hash.clone(),
        })
        .collect())
}

/// Brings the store in line with `docs_dir`.
///
/// An empty store triggers a full rebuild; otherwise the directory is diffed
/// against the store's recorded fingerprints and only changed sources are
/// re-ingested. A missing `docs_dir` yields an empty report, not an error.
pub fn sync(docs_dir: &Path, store: &mut ChunkStore, chunking: &ChunkingConfig) -> Result<SyncReport> {
    if !docs_dir.exists() {
        warn!(
            "docs directory '{}' not found; skipping sync",
            docs_dir.display()
        );
        return Ok(SyncReport::default());
    }

    if store.is_empty() {
        return full_rebuild(docs_dir, store, chunking);
    }
    incremental_sync(docs_dir, store, chunking)
}

/// Clears the store and re-ingests everything, regardless of current state.
pub fn rebuild(docs_dir: &Path, store: &mut ChunkStore, chunking: &ChunkingConfig) -> Result<SyncReport> {
    if !docs_dir.exists() {
        warn!(
            "docs directory '{}' not found; skipping rebuild",
            docs_dir.display()
        );
        return Ok(SyncReport::default());
    }
    store.clear()?;
    full_rebuild(docs_dir, store, chunking)
}

fn full_rebuild(
    docs_dir: &Path,
    store: &mut ChunkStore,
    chunking: &ChunkingConfig,
) -> Result<SyncReport> {
    info!("chunk store is empty; performing initial ingestion");
    let mut report = SyncReport::default();
    let mut batch = Vec::new();

    for path in discover_files(docs_dir) {
        match ingest_file(&path, chunking) {
            Ok(records) if records.is_empty() => {
                info!("no text extracted from {}; skipping", path.display());
            }
            Ok(records) => {
                report.added.insert(path.display().to_string());
                batch.extend(records);
            }
            Err(e) => {
                warn!("failed to process {}: {}", path.display(), e);
            }
        }
    }

    store.add(batch)?;
    Ok(report)
}

fn incremental_sync(
    docs_dir: &Path,
    store: &mut ChunkStore,
    chunking: &ChunkingConfig,
) -> Result<SyncReport> {
    let recorded = store.source_hashes();

    // Ephemeral snapshot of what is on disk right now.
    let mut snapshot: HashMap<String, String> = HashMap::new();
    let mut unreadable: HashSet<String> = HashSet::new();
    for path in discover_files(docs_dir) {
        let source = path.display().to_string();
        match fingerprint_file(&path) {
            Ok(hash) => {
                snapshot.insert(source, hash);
            }
            Err(e) => {
                // Leave the source untouched this round rather than treating
                // a transient read failure as a deletion.
                warn!("could not fingerprint {}: {}", source, e);
                unreadable.insert(source);
            }
        }
    }

    let changed: Vec<String> = {
        let mut changed: Vec<String> = snapshot
            .iter()
            .filter(|(source, hash)| recorded.get(*source) != Some(*hash))
            .map(|(source, _)| source.clone())
            .collect();
        changed.sort();
        changed
    };

    let removed: HashSet<String> = recorded
        .keys()
        .filter(|source| !snapshot.contains_key(*source) && !unreadable.contains(*source))
        .cloned()
        .collect();

    let mut report = SyncReport::default();
    if changed.is_empty() && removed.is_empty() {
        return Ok(report);
    }

    info!(
        "changes detected: {} changed, {} removed; syncing chunk store",
        changed.len(),
        removed.len()
    );

    if !removed.is_empty() {
        store.remove_by_sources(&removed)?;
        report.removed.extend(removed);
    }

    for source in changed {
        // A modified file's old records must not linger under the stale hash.
        let stale: HashSet<String> = HashSet::from([source.clone()]);
        store.remove_by_sources(&stale)?;

        match ingest_file(Path::new(&source), chunking) {
            Ok(records) if records.is_empty() => {
                info!("no text extracted from {}; skipping", source);
            }
            Ok(records) => {
                store.add(records)?;
                report.added.insert(source);
            }
            Err(e) => {
                warn!("failed to process {}: {}", source, e);
            }
        }
    }

    Ok(report)
}
