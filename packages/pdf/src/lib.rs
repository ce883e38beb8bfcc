#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page-by-page PDF text reading.
//!
//! Convalidation reports are digital PDFs with an embedded text layer. This
//! crate parses one with [`pdf_extract`] and exposes its pages through the
//! [`PageSource`] trait. Opening a document only parses its object tree;
//! each page's text is extracted when [`PageSource::page_text`] asks for
//! it, so a scan that stops after the first few pages never decodes the
//! rest.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use pdf_extract::{Document, PlainTextOutput};

/// Errors raised while reading a document's text.
///
/// Every variant means the document as a whole is unreadable; callers never
/// receive partial text alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// The file could not be read from disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF parsing or page text extraction failed (malformed, unsupported,
    /// or password-protected document).
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The document has no pages, or none of the scanned pages produced any
    /// text (image-only documents end up here).
    #[error("PDF has no extractable text: {}", path.display())]
    NoText {
        /// Path of the offending document.
        path: PathBuf,
    },

    /// A page index past the end of the document was requested.
    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange {
        /// Zero-based page index that was requested.
        index: usize,
        /// Number of pages in the document.
        count: usize,
    },
}

/// Ordered access to the text of a document's pages.
pub trait PageSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text of the zero-based page `index`. Pages without text yield an
    /// empty string.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError::PageOutOfRange`] if `index >= page_count()`, or
    /// whatever error the underlying source raises while reading the page.
    fn page_text(&self, index: usize) -> Result<String, PdfError>;
}

impl PageSource for [String] {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        self.get(index).cloned().ok_or(PdfError::PageOutOfRange {
            index,
            count: self.len(),
        })
    }
}

impl PageSource for Vec<String> {
    fn page_count(&self) -> usize {
        self.as_slice().page_count()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        self.as_slice().page_text(index)
    }
}

/// A parsed PDF whose page texts are extracted on demand.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    path: PathBuf,
    document: Document,
    /// One-based page numbers in page order.
    page_numbers: Vec<u32>,
}

impl PdfDocument {
    /// Reads and parses the PDF at `path`.
    ///
    /// # Errors
    ///
    /// * [`PdfError::Io`] if the file cannot be read
    /// * [`PdfError::Extraction`] if the PDF cannot be parsed or decrypted
    /// * [`PdfError::NoText`] if the document has no pages
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let bytes = std::fs::read(path)?;

        log::debug!("Read {} bytes from {}", bytes.len(), path.display());

        Self::from_bytes(path, &bytes)
    }

    /// Parses a PDF already loaded into memory. `path` is only used for
    /// diagnostics.
    ///
    /// Encrypted documents are decrypted with the empty password, which
    /// covers reports that are only protected against editing.
    ///
    /// # Errors
    ///
    /// * [`PdfError::Extraction`] if the PDF cannot be parsed or decrypted
    /// * [`PdfError::NoText`] if the document has no pages
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, PdfError> {
        let document = guarded("PDF parsing", || {
            let mut document = Document::load_mem(bytes)?;
            if document.is_encrypted() {
                document.decrypt("")?;
            }
            Ok::<_, pdf_extract::Error>(document)
        })?;

        let page_numbers: Vec<u32> = document.get_pages().into_keys().collect();
        if page_numbers.is_empty() {
            return Err(PdfError::NoText {
                path: path.to_path_buf(),
            });
        }

        log::debug!("Parsed {} page(s) from {}", page_numbers.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_numbers,
        })
    }

    /// Path the document was read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extracts every page and concatenates the texts, in page order,
    /// separated by a newline.
    ///
    /// # Errors
    ///
    /// Returns the first page extraction error.
    pub fn text(&self) -> Result<String, PdfError> {
        let pages = (0..self.page_count())
            .map(|index| self.page_text(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages.join("\n"))
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        let page_number = *self
            .page_numbers
            .get(index)
            .ok_or(PdfError::PageOutOfRange {
                index,
                count: self.page_numbers.len(),
            })?;

        let text = guarded("page text extraction", || {
            let mut text = String::new();
            pdf_extract::output_doc_page(
                &self.document,
                &mut PlainTextOutput::new(&mut text),
                page_number,
            )?;
            Ok::<_, pdf_extract::OutputError>(text)
        })
        .map_err(|e| match e {
            PdfError::Extraction(msg) => PdfError::Extraction(format!(
                "{} page {page_number}: {msg}",
                self.path.display()
            )),
            other => other,
        })?;

        log::trace!("{}: extracted page {page_number}", self.path.display());

        Ok(normalize_line_endings(&text))
    }
}

/// Runs a [`pdf_extract`] operation, converting both its errors and its
/// panics (which it raises on some malformed input) into
/// [`PdfError::Extraction`].
fn guarded<T, E: std::fmt::Display>(
    what: &str,
    op: impl FnOnce() -> Result<T, E>,
) -> Result<T, PdfError> {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(PdfError::Extraction(format!("{what} failed: {e}"))),
        Err(_) => Err(PdfError::Extraction(format!(
            "{what} panicked (malformed document)"
        ))),
    }
}

/// Rewrites `\r\n` and lone `\r` line endings as `\n`.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
