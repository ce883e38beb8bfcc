//! Field extraction over document text.
//!
//! [`extract_first`] is the single generic matcher: it walks a field's
//! candidate rules in order and returns the first non-empty capture,
//! whitespace-normalized. Field-specific cleanup lives in
//! [`crate::postprocess`].

use std::path::Path;

use conva_extract_models::{HeaderField, HeaderRecord};
use strum::IntoEnumIterator as _;

use crate::patterns::{self, PatternRule, PatternTable};
use crate::postprocess;

/// Collapses every whitespace run (including newlines) to a single space
/// and trims both ends.
#[must_use]
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the normalized capture of the first rule in `rules` that matches
/// `text` with a non-empty capture group.
#[must_use]
pub fn extract_first(rules: &[PatternRule], text: &str) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = normalize_whitespace(rule.capture(text)?);
        (!value.is_empty()).then_some(value)
    })
}

/// Extracts and cleans `field` from `text` using `table`.
#[must_use]
pub fn extract_field_with(table: &PatternTable, field: HeaderField, text: &str) -> Option<String> {
    let value = extract_first(table.rules(field), text)?;
    postprocess::apply(field, value)
}

/// Extracts and cleans `field` from `text` using the built-in table.
#[must_use]
pub fn extract_field(field: HeaderField, text: &str) -> Option<String> {
    extract_field_with(patterns::builtin(), field, text)
}

/// Extracts every header field from the full text of the document at
/// `path`, without any page limit.
#[must_use]
pub fn extract_from_text(text: &str, path: &Path) -> HeaderRecord {
    let mut record = HeaderRecord::new(path);

    for field in HeaderField::iter() {
        let value = extract_field(field, text);
        log::trace!("{}: {field} = {value:?}", record.source_filename());
        record.set(field, value);
    }

    record
}
