//! Boundary-aware overlapping text chunker.
//!
//! Splits extracted document text into windows of at most `chunk_size`
//! characters. When a window contains a newline past 40% of the window, the
//! split is pulled back to that newline so chunks prefer ending on clean line
//! breaks without becoming pathologically small. Consecutive chunks overlap
//! by `overlap` characters so content spanning a boundary is not lost.
//!
//! All offsets are in characters, not bytes; inputs are arbitrary UTF-8.

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap carried into the next window.
pub const DEFAULT_OVERLAP: usize = 150;

/// Splits `text` into overlapping chunks.
///
/// Returns an empty vec when the input normalizes to whitespace-only text
/// (the caller treats that as "no content to ingest", not an error). Input
/// no longer than `chunk_size` comes back as a single chunk.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.replace("\r\n", "\n");
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len <= chunk_size {
        return vec![text];
    }

    // Minimum newline offset for the pull-back to fire.
    let min_break = (chunk_size as f64 * 0.4) as usize;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < len {
        // `end` deliberately runs past `len` on the final window: the next
        // start is computed from it, which is what terminates the loop.
        let mut end = start + chunk_size;
        let mut window = &chars[start..end.min(len)];

        if let Some(last_nl) = window.iter().rposition(|&c| c == '\n') {
            if last_nl > min_break {
                end = start + last_nl;
                window = &chars[start..end];
            }
        }

        let chunk: String = window.iter().collect();
        chunks.push(chunk.trim().to_string());

        start = end.saturating_sub(overlap);
    }
    chunks
}
