//! Early-exit page scanning.
//!
//! Header fields sit near the start of a report; later pages are course
//! detail with a higher chance of false matches. The scanner reads at most
//! [`ScanConfig::max_pages`] pages and stops as soon as
//! [`ScanConfig::min_fields`] fields are resolved. A field resolved on one
//! page is never re-attempted on a later page. If none of the pages read
//! has any text, the document is reported as unreadable.

use std::path::Path;

use conva_extract_models::{HeaderField, HeaderRecord, ScanConfig};
use conva_extract_pdf::{PageSource, PdfError};
use strum::IntoEnumIterator as _;

use crate::extractor::extract_field_with;
use crate::patterns::{self, PatternTable};

/// Scans `source` page by page with the built-in pattern table.
///
/// # Errors
///
/// Returns [`PdfError`] if reading one of the scanned pages fails, and
/// [`PdfError::NoText`] if none of them has any text.
pub fn scan<S: PageSource + ?Sized>(
    source: &S,
    config: &ScanConfig,
    path: &Path,
) -> Result<HeaderRecord, PdfError> {
    scan_with(patterns::builtin(), source, config, path)
}

/// Scans `source` page by page with `table`.
///
/// # Errors
///
/// Returns [`PdfError`] if reading one of the scanned pages fails, and
/// [`PdfError::NoText`] if none of them has any text.
pub fn scan_with<S: PageSource + ?Sized>(
    table: &PatternTable,
    source: &S,
    config: &ScanConfig,
    path: &Path,
) -> Result<HeaderRecord, PdfError> {
    let mut record = HeaderRecord::new(path);
    let limit = source.page_count().min(config.max_pages);
    let mut any_text = false;

    for index in 0..limit {
        let text = source.page_text(index)?;
        if text.trim().is_empty() {
            log::debug!("{}: page {} is blank", record.source_filename(), index + 1);
            continue;
        }
        any_text = true;

        for field in HeaderField::iter() {
            if record.is_resolved(field) {
                continue;
            }
            if let Some(value) = extract_field_with(table, field, &text) {
                log::trace!(
                    "{}: {field} = {value:?} (page {})",
                    record.source_filename(),
                    index + 1
                );
                record.set(field, Some(value));
            }
        }

        let resolved = record.resolved_count();
        if resolved >= config.min_fields {
            log::debug!(
                "{}: {resolved}/{} fields after page {}, stopping",
                record.source_filename(),
                HeaderField::COUNT,
                index + 1
            );
            break;
        }
    }

    if !any_text {
        return Err(PdfError::NoText {
            path: path.to_path_buf(),
        });
    }

    Ok(record)
}
