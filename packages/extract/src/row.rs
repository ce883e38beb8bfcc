//! Maps header records onto the fixed export column order.

use conva_extract_models::{HeaderField, HeaderRecord};
use strum::IntoEnumIterator as _;

/// Number of export columns: every header field plus the source filename.
pub const COLUMN_COUNT: usize = HeaderField::COUNT + 1;

/// Export column headers, in order.
pub const COLUMNS: [&str; COLUMN_COUNT] = [
    "Name",
    "Code",
    "Program",
    "Campus",
    "Study-Plan",
    "Date",
    "Version-Tag",
    "Credit-Total",
    "Remarks",
    "Source-Filename",
];

/// Position of the source filename column.
const FILENAME_COLUMN: usize = HeaderField::COUNT;

/// One row of the result table.
///
/// Absent values are kept as `None` and rendered as empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    cells: [Option<String>; COLUMN_COUNT],
    error: bool,
}

impl ResultRow {
    /// Builds the row for a successfully extracted document.
    #[must_use]
    pub fn from_header(record: &HeaderRecord) -> Self {
        let mut cells: [Option<String>; COLUMN_COUNT] = Default::default();
        for field in HeaderField::iter() {
            cells[field.index()] = record.get(field).map(ToOwned::to_owned);
        }
        cells[FILENAME_COLUMN] = Some(record.source_filename().to_string());

        Self {
            cells,
            error: false,
        }
    }

    /// Builds the placeholder row for a document whose extraction failed:
    /// every data column is empty and the remarks column holds the error.
    #[must_use]
    pub fn error(filename: &str, error: &dyn std::fmt::Display) -> Self {
        let mut cells: [Option<String>; COLUMN_COUNT] = Default::default();
        cells[HeaderField::Remarks.index()] = Some(format!("ERROR: {error}"));
        cells[FILENAME_COLUMN] = Some(filename.to_owned());

        Self { cells, error: true }
    }

    /// Returns `true` for placeholder rows built by [`Self::error`].
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error
    }

    /// Value of the column for `field`.
    #[must_use]
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.cells[field.index()].as_deref()
    }

    /// Source filename column.
    #[must_use]
    pub fn source_filename(&self) -> Option<&str> {
        self.cells[FILENAME_COLUMN].as_deref()
    }

    /// All cells in column order.
    #[must_use]
    pub const fn cells(&self) -> &[Option<String>; COLUMN_COUNT] {
        &self.cells
    }

    /// Cell text in column order, with absent values as empty strings.
    #[must_use]
    pub fn to_record(&self) -> [&str; COLUMN_COUNT] {
        self.cells
            .each_ref()
            .map(|cell| cell.as_deref().unwrap_or_default())
    }
}
