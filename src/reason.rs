//! Source reconciliation engine.
//!
//! Documents in a knowledge base routinely disagree: an old announcement says
//! a network is "coming soon" while a newer runbook walks through using it.
//! Rather than embedding-based similarity, this module scores each source on
//! lexical signals — procedural cues, positive and negative status claims,
//! and substantive length — and orders context for the model so concrete
//! how-to material outranks short or merely promotional text, and explicit
//! "not yet available" language actively demotes a source.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::{ChunkRecord, SourceSignal};

/// Procedure-like content: numbered or bulleted steps, how-to phrasing,
/// commands, URLs, and chain-specific operational terms.
const STEP_PATTERNS: &[&str] = &[
    r"^\s*\d+\.",
    r"^\s*step\b",
    r"^\s*-\s",
    r"\bhow to\b",
    r"\binstructions?\b",
    r"\bexample\b",
    r"\bcommand\b",
    r"\bcurl\b",
    r"\brpc\b",
    r"\bendpoint\b",
    r"https?://",
    r"\bfaucet\b",
    r"\bgeth\b",
    r"\bsolana\b",
    r"\btransfer\b",
    r"\bwallet\b",
];

const POSITIVE_STATUS_PATTERNS: &[&str] = &[
    r"\bis\s+live\b",
    r"\bis\s+launched\b",
    r"\bis\s+available\b",
    r"\bis\s+open\b",
    r"\bis\s+active\b",
    r"\bnow\s+live\b",
    r"\bgo\s+live\b",
    r"\bpublic\s+mainnet\b",
];

const NEGATIVE_STATUS_PATTERNS: &[&str] = &[
    r"\bnot\s+live\b",
    r"\bnot\s+yet\b",
    r"\bcoming\s+soon\b",
    r"\bplanned\b",
    r"\bpermissioned\b",
    r"\bprivate\b",
    r"\brestricted\b",
    r"\bclosed\b",
    r"\bpaused\b",
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            // Case-insensitive, multiline; patterns are fixed literals above.
            Regex::new(&format!("(?im){}", p)).unwrap_or_else(|e| panic!("bad pattern {}: {}", p, e))
        })
        .collect()
}

static STEP_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(STEP_PATTERNS));
static POSITIVE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(POSITIVE_STATUS_PATTERNS));
static NEGATIVE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(NEGATIVE_STATUS_PATTERNS));

fn count_matches(regexes: &[Regex], text: &str) -> usize {
    regexes.iter().map(|re| re.find_iter(text).count()).sum()
}

fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Buckets chunk records by source (first-seen order) and derives each
/// source's signals from its concatenated text. Records with an empty source
/// or empty text are discarded.
pub fn analyze_documents(records: &[ChunkRecord]) -> Vec<(String, SourceSignal)> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&str>> = HashMap::new();
    for record in records {
        if record.source.is_empty() || record.text.is_empty() {
            continue;
        }
        buckets
            .entry(record.source.clone())
            .or_insert_with(|| {
                order.push(record.source.clone());
                Vec::new()
            })
            .push(&record.text);
    }

    order
        .into_iter()
        .map(|source| {
            let combined = buckets[&source].join("\n\n");
            let signal = SourceSignal {
                procedural_score: count_matches(&STEP_RES, &combined),
                positive_claims: count_matches(&POSITIVE_RES, &combined),
                negative_claims: count_matches(&NEGATIVE_RES, &combined),
                length: normalize_text(&combined).chars().count(),
                text: combined,
            };
            (source, signal)
        })
        .collect()
}

fn score(signal: &SourceSignal) -> f64 {
    signal.procedural_score as f64 * 10.0 + signal.length as f64 / 1000.0
        + signal.positive_claims as f64 * 5.0
        - signal.negative_claims as f64 * 2.0
}

/// Orders sources by descending authoritativeness score. The sort is stable:
/// ties keep their grouping order, no hidden secondary key.
pub fn rank_sources(signals: &[(String, SourceSignal)]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..signals.len()).collect();
    indices.sort_by(|&a, &b| {
        score(&signals[b].1)
            .partial_cmp(&score(&signals[a].1))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices
}

/// Builds the ordered, size-bounded context blocks for a query.
///
/// Block 0 is a reconciliation summary naming the top-ranked source; the
/// remaining blocks are `Source:`-headed snippets of each source's text in
/// ranked order, walked forward as non-overlapping sequential slices of at
/// most `max_snippet_chars` characters. Returns an empty vec when no records
/// are groupable — the caller treats that as "no context available".
///
/// `project_filter` is accepted for forward compatibility but does not
/// currently constrain grouping.
pub fn build_context(
    records: &[ChunkRecord],
    query: &str,
    project_filter: Option<&str>,
    max_snippet_chars: usize,
) -> Vec<String> {
    debug!(?project_filter, "building reconciliation context");

    let signals = analyze_documents(records);
    if signals.is_empty() {
        return Vec::new();
    }

    let ranked = rank_sources(&signals);
    let (top_source, top_signal) = &signals[ranked[0]];

    let mut blocks = Vec::new();
    let summary = format!(
        "RECONCILIATION SUMMARY (from Documents):\n\
         - Query: {}\n\
         - Top authoritative document: {}\n\
         \x20 (Procedural Score: {}, Length: {})\n\
         - Rule: Preferring documents with concrete instructions for 'how-to' guidance.",
        query, top_source, top_signal.procedural_score, top_signal.length
    );
    blocks.push(summary);

    for &idx in &ranked {
        let (source, signal) = &signals[idx];
        let text = signal.text.trim();
        if text.is_empty() {
            continue;
        }
        let chars: Vec<char> = text.chars().collect();
        let mut start = 0usize;
        while start < chars.len() {
            let end = (start + max_snippet_chars).min(chars.len());
            let snippet: String = chars[start..end].iter().collect();
            blocks.push(format!("Source: {}\n\n{}", source, snippet));
            start = end;
        }
    }

    blocks
}
