//! Persistent chunk store.
//!
//! An ordered, append/remove-capable collection of [`ChunkRecord`]s persisted
//! as a single JSON blob. The whole blob is loaded into memory on open and
//! rewritten wholesale after every mutation; the disk write is always the
//! final step of a mutation, so a crash mid-operation loses that mutation but
//! never corrupts the on-disk state.
//!
//! A store that fails to load (missing, corrupt, unreadable) degrades to an
//! empty store instead of failing construction, at the cost of silently
//! losing prior state.

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::ChunkRecord;

const STORE_FILE: &str = "chunks.json";

pub struct ChunkStore {
    path: PathBuf,
    records: Vec<ChunkRecord>,
}

impl ChunkStore {
    /// Opens (or creates) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create store directory {}", dir.display()))?;
        let path = dir.join(STORE_FILE);
        let records = if path.exists() {
            Self::load(&path)
        } else {
            Vec::new()
        };
        Ok(Self { path, records })
    }

    fn load(path: &Path) -> Vec<ChunkRecord> {
        let result = std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(anyhow::Error::from));
        match result {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "could not load chunk store at {}; starting empty (it will be rebuilt): {}",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[ChunkRecord] {
        &self.records
    }

    /// Drops every record. Persists immediately.
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.persist()
    }

    /// Appends records and persists. No-op (no disk write) on empty input.
    pub fn add(&mut self, records: Vec<ChunkRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        self.records.extend(records);
        self.persist()
    }

    /// Removes every record whose `source` is in the set. Returns the number
    /// of records dropped. No-op without a disk write when the set or the
    /// store is empty, or when nothing matched.
    pub fn remove_by_sources(&mut self, sources: &HashSet<String>) -> Result<usize> {
        if sources.is_empty() || self.records.is_empty() {
            return Ok(0);
        }
        let before = self.records.len();
        self.records.retain(|r| !sources.contains(&r.source));
        let removed = before - self.records.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    /// The recorded `source -> content_hash` mapping. Every record of a
    /// source carries the same hash, so any one record per source suffices.
    pub fn source_hashes(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for record in &self.records {
            map.entry(record.source.clone())
                .or_insert_with(|| record.content_hash.clone());
        }
        map
    }

    /// Number of distinct sources currently stored.
    pub fn source_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.source.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    fn persist(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.records).context("failed to serialize chunk store")?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("failed to write chunk store {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, text: &str, hash: &str) -> ChunkRecord {
        ChunkRecord {
            source: source.to_string(),
            text: text.to_string(),
            project_tag: "test".to_string(),
            content_hash: hash.to_string(),
        }
    }

    #[test]
    fn starts_empty_without_blob() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChunkStore::open(dir.path()).unwrap();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn add_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ChunkStore::open(dir.path()).unwrap();
            store
                .add(vec![record("a.txt", "alpha", "h1"), record("a.txt", "beta", "h1")])
                .unwrap();
        }
        let store = ChunkStore::open(dir.path()).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].text, "alpha");
        assert_eq!(store.records()[1].text, "beta");
    }

    #[test]
    fn add_empty_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();
        store.add(Vec::new()).unwrap();
        assert!(!dir.path().join(STORE_FILE).exists());
    }

    #[test]
    fn remove_by_sources_drops_all_matching() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();
        store
            .add(vec![
                record("a.txt", "one", "h1"),
                record("b.txt", "two", "h2"),
                record("a.txt", "three", "h1"),
            ])
            .unwrap();

        let removed = store
            .remove_by_sources(&HashSet::from(["a.txt".to_string()]))
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].source, "b.txt");
    }

    #[test]
    fn remove_with_empty_set_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();
        store.add(vec![record("a.txt", "one", "h1")]).unwrap();
        let removed = store.remove_by_sources(&HashSet::new()).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn corrupt_blob_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), b"{{{ not json").unwrap();
        let store = ChunkStore::open(dir.path()).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn source_hashes_takes_one_record_per_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();
        store
            .add(vec![
                record("a.txt", "one", "h1"),
                record("a.txt", "two", "h1"),
                record("b.txt", "three", "h2"),
            ])
            .unwrap();
        let hashes = store.source_hashes();
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes["a.txt"], "h1");
        assert_eq!(hashes["b.txt"], "h2");
        assert_eq!(store.source_count(), 2);
    }

    #[test]
    fn duplicates_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ChunkStore::open(dir.path()).unwrap();
        store.add(vec![record("a.txt", "same", "h1")]).unwrap();
        store.add(vec![record("a.txt", "same", "h1")]).unwrap();
        assert_eq!(store.len(), 2);
    }
}
