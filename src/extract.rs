//! Per-format text extraction for ingested documents.
//!
//! Dispatches on the file extension (case-insensitive) and returns plain
//! UTF-8 text. The ingestion coordinator catches extraction errors per file
//! and continues with the rest of the batch.

use std::io::Read;
use std::path::Path;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extraction error. Never panics on malformed input; the caller skips the
/// offending file and moves on.
#[derive(Debug)]
pub enum ExtractError {
    /// Extension is not one of `.pdf`, `.docx`, `.txt`, `.md`.
    Unsupported(String),
    Pdf(String),
    Docx(String),
    Io(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Unsupported(path) => {
                write!(f, "unsupported file type: {}", path)
            }
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Docx(e) => write!(f, "DOCX extraction failed: {}", e),
            ExtractError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {}

/// Extracts plain text from a document on disk, dispatching on its extension.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => extract_pdf(path),
        "docx" => extract_docx(path),
        "txt" | "md" => extract_plain(path),
        _ => Err(ExtractError::Unsupported(path.display().to_string())),
    }
}

fn extract_pdf(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Io(e.to_string()))?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Plain text / Markdown: permissive decoding. Invalid byte sequences are
/// replaced rather than failing the whole file.
fn extract_plain(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Io(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|e| ExtractError::Io(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.as_slice()))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut doc_xml = Vec::new();
    {
        let entry = archive
            .by_name("word/document.xml")
            .map_err(|e| ExtractError::Docx(e.to_string()))?;
        entry
            .take(MAX_XML_ENTRY_BYTES)
            .read_to_end(&mut doc_xml)
            .map_err(|e| ExtractError::Docx(e.to_string()))?;
        if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
            return Err(ExtractError::Docx(
                "word/document.xml exceeds size limit".to_string(),
            ));
        }
    }
    extract_docx_paragraphs(&doc_xml)
}

/// Walks `word/document.xml` collecting `<w:t>` runs per `<w:p>` paragraph.
/// Paragraphs are joined with a newline; empty paragraphs are skipped.
fn extract_docx_paragraphs(xml: &[u8]) -> Result<String, ExtractError> {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        current.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                if e.local_name().as_ref() == b"p" {
                    if !current.is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    Ok(paragraphs.join("\n"))
}
