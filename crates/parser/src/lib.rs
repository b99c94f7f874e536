//! Text extraction from uploaded documents
//!
//! Supported formats are a fixed registry of (extension, extractor) pairs.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use summarist_common::{Result, SummaristError};
use tracing::debug;

/// Largest document accepted for parsing (10 MiB)
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

type Extractor = fn(&[u8]) -> Result<String>;

const EXTRACTORS: &[(&str, Extractor)] = &[
    (".pdf", extract_pdf),
    (".docx", extract_docx),
    (".txt", extract_txt),
];

/// Extracts plain text from PDF, DOCX and TXT uploads
#[derive(Debug, Clone, Copy, Default)]
pub struct FileParser;

impl FileParser {
    pub fn new() -> Self {
        Self
    }

    /// Extensions this parser accepts, in registry order
    pub fn supported_extensions(&self) -> impl Iterator<Item = &'static str> {
        EXTRACTORS.iter().map(|(ext, _)| *ext)
    }

    /// Detect the file type from `filename` and extract its text
    pub fn parse(&self, content: &[u8], filename: &str) -> Result<String> {
        if content.is_empty() {
            return Err(SummaristError::user_input(format!(
                "{} is empty - nothing to summarize.",
                filename
            )));
        }

        let extension = extension_of(filename);
        let extractor = EXTRACTORS
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, extractor)| *extractor)
            .ok_or_else(|| {
                let supported: Vec<&str> = self.supported_extensions().collect();
                SummaristError::user_input(format!(
                    "Unsupported file type: '{}'. Supported types: {}",
                    extension,
                    supported.join(", ")
                ))
            })?;

        debug!("Parsing {} ({} bytes)", filename, content.len());
        extractor(content)
    }
}

/// Lowercased extension including the leading dot, or "" when there is none
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

fn extract_txt(content: &[u8]) -> Result<String> {
    Ok(String::from_utf8_lossy(content).into_owned())
}

fn extract_pdf(content: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed documents
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(content)
    }))
    .map_err(|_| SummaristError::user_input("Could not read PDF: malformed document"))?
    .map_err(|e| SummaristError::user_input(format!("Could not read PDF: {}", e)))?;

    Ok(pages.join("\n"))
}

fn extract_docx(content: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(content))
        .map_err(|e| SummaristError::user_input(format!("Could not read DOCX: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| SummaristError::user_input(format!("Could not read DOCX: {}", e)))?
        .read_to_string(&mut xml)?;

    docx_paragraphs(&xml).map(|paragraphs| paragraphs.join("\n"))
}

/// Paragraph texts of a WordprocessingML body, in document order
///
/// Only top-level body paragraphs count. Paragraphs nested inside text boxes
/// or their fallback copies are skipped along with their text.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            SummaristError::user_input(format!(
                "Could not read DOCX: malformed XML at byte {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(tag) => match tag.name().as_ref() {
                b"w:p" => depth += 1,
                b"w:r" if depth == 1 => in_run = true,
                b"w:t" if depth == 1 && in_run => in_text = true,
                _ => {}
            },
            Event::End(tag) => match tag.name().as_ref() {
                b"w:p" => {
                    if depth == 1 {
                        paragraphs.push(std::mem::take(&mut current));
                        in_run = false;
                    }
                    depth = depth.saturating_sub(1);
                }
                b"w:r" if depth == 1 => in_run = false,
                b"w:t" if depth == 1 => in_text = false,
                _ => {}
            },
            Event::Empty(tag) => match tag.name().as_ref() {
                b"w:p" if depth == 0 => paragraphs.push(String::new()),
                b"w:tab" if depth == 1 && in_run => current.push('\t'),
                b"w:br" | b"w:cr" if depth == 1 && in_run => current.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text => {
                let text = text.unescape().map_err(|e| {
                    SummaristError::user_input(format!("Could not read DOCX: {}", e))
                })?;
                current.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
