//! One-shot PDF loading into normalized session text.
//!
//! [`DocumentContent::load`] reads the configured PDF, pulls the text out of
//! every page with `lopdf`, joins the pages in order and normalizes the
//! result.  Any failure here is fatal to startup; callers are expected to
//! abort rather than retry.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::normalize::normalize;

// ---------------------------------------------------------------------------
// DocumentError
// ---------------------------------------------------------------------------

/// Reasons the source document could not be loaded.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file does not exist or could not be read.
    #[error("cannot read document {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not a PDF that `lopdf` can parse.
    #[error("cannot parse PDF: {0}")]
    Parse(#[from] lopdf::Error),

    /// The PDF parsed but contains no page objects.
    #[error("document has no pages")]
    NoPages,
}

// ---------------------------------------------------------------------------
// DocumentContent
// ---------------------------------------------------------------------------

/// Normalized full text of the session's source document.
///
/// Built once at startup and shared read-only (`Arc<DocumentContent>`) with
/// every pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentContent {
    text: String,
    source: PathBuf,
    page_count: usize,
}

impl DocumentContent {
    /// Read, extract and normalize the PDF at `path`.
    ///
    /// # Errors
    ///
    /// [`DocumentError::Read`] when the file is missing or unreadable,
    /// [`DocumentError::Parse`] / [`DocumentError::NoPages`] when it is not a
    /// usable PDF.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let pages = extract_pages(&bytes)?;
        let content = Self::from_pages(path, &pages);

        log::info!(
            "document: loaded {} ({} pages, {} chars)",
            path.display(),
            content.page_count,
            content.text.chars().count()
        );
        Ok(content)
    }

    /// Build content from already-extracted page texts.
    ///
    /// Pages are joined with a newline so the last word of one page never
    /// fuses with the first word of the next; normalization turns the join
    /// into a single space.
    pub fn from_pages(source: impl Into<PathBuf>, pages: &[String]) -> Self {
        Self {
            text: normalize(&pages.join("\n")),
            source: source.into(),
            page_count: pages.len(),
        }
    }

    /// Wrap text that is already normalized (or will be used as-is).
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: PathBuf::new(),
            page_count: 1,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// `true` when extraction produced no text at all (e.g. a scanned PDF).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Extract raw text for every page of the PDF in `bytes`, in page order.
///
/// A page whose text cannot be decoded contributes an empty string and a
/// warning instead of failing the whole document.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, DocumentError> {
    let doc = lopdf::Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(DocumentError::NoPages);
    }

    let texts = pages
        .keys()
        .map(|&number| match doc.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("document: page {number} has no extractable text: {e}");
                String::new()
            }
        })
        .collect();

    Ok(texts)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
