#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Header record, scan configuration, and batch result types.
//!
//! A convalidation report carries a small header block (student name,
//! student code, program, campus, study plan, date, version tag, credit
//! total, remarks). This crate defines the shared shape of that header and
//! of the bookkeeping produced while processing a batch of reports.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Default maximum number of pages scanned per document.
pub const DEFAULT_MAX_PAGES: usize = 4;

/// Default number of resolved fields after which page scanning stops.
pub const DEFAULT_MIN_FIELDS: usize = 7;

/// Default number of files between two progress notifications.
pub const DEFAULT_PROGRESS_STRIDE: usize = 10;

/// One extractable header field, in export column order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HeaderField {
    /// Student surnames and given names
    Name,
    /// Student code (`N` followed by digits)
    Code,
    /// Program (career) the student is transferring into
    Program,
    /// Campus name
    Campus,
    /// Numeric study-plan code
    StudyPlan,
    /// Report date (`d/m/yyyy`)
    Date,
    /// Version tag of the tool that produced the report
    VersionTag,
    /// Total of validated credits
    CreditTotal,
    /// Package-validation remark
    Remarks,
}

impl HeaderField {
    /// Number of extractable fields.
    pub const COUNT: usize = 9;

    /// Human-readable column header used in exports.
    #[must_use]
    pub const fn column_label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Code => "Code",
            Self::Program => "Program",
            Self::Campus => "Campus",
            Self::StudyPlan => "Study-Plan",
            Self::Date => "Date",
            Self::VersionTag => "Version-Tag",
            Self::CreditTotal => "Credit-Total",
            Self::Remarks => "Remarks",
        }
    }

    /// Zero-based position of this field in the export column order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Header fields extracted from a single document.
///
/// Every field is optional: a document may be only partially extractable
/// without the whole document failing. Values are filled in through
/// [`Self::set`] while the document is scanned and read back with
/// [`Self::get`]; the scanner hands the finished record out by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRecord {
    name: Option<String>,
    code: Option<String>,
    program: Option<String>,
    campus: Option<String>,
    study_plan: Option<String>,
    date: Option<String>,
    version_tag: Option<String>,
    credit_total: Option<String>,
    remarks: Option<String>,
    source_filename: String,
    source_path: PathBuf,
}

impl HeaderRecord {
    /// Creates an empty record for the document at `path`.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            source_filename: source_filename(path),
            source_path: path.to_path_buf(),
            ..Self::default()
        }
    }

    /// File name component of [`Self::source_path`].
    #[must_use]
    pub fn source_filename(&self) -> &str {
        &self.source_filename
    }

    /// Path the document was read from.
    #[must_use]
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Returns the value of `field`, if it was extracted.
    #[must_use]
    pub fn get(&self, field: HeaderField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Stores `value` for `field`.
    pub fn set(&mut self, field: HeaderField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    /// Returns `true` if `field` has a value.
    #[must_use]
    pub fn is_resolved(&self, field: HeaderField) -> bool {
        self.slot(field).is_some()
    }

    /// Number of fields that have a value.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        use strum::IntoEnumIterator as _;

        HeaderField::iter().filter(|&f| self.is_resolved(f)).count()
    }

    const fn slot(&self, field: HeaderField) -> &Option<String> {
        match field {
            HeaderField::Name => &self.name,
            HeaderField::Code => &self.code,
            HeaderField::Program => &self.program,
            HeaderField::Campus => &self.campus,
            HeaderField::StudyPlan => &self.study_plan,
            HeaderField::Date => &self.date,
            HeaderField::VersionTag => &self.version_tag,
            HeaderField::CreditTotal => &self.credit_total,
            HeaderField::Remarks => &self.remarks,
        }
    }

    const fn slot_mut(&mut self, field: HeaderField) -> &mut Option<String> {
        match field {
            HeaderField::Name => &mut self.name,
            HeaderField::Code => &mut self.code,
            HeaderField::Program => &mut self.program,
            HeaderField::Campus => &mut self.campus,
            HeaderField::StudyPlan => &mut self.study_plan,
            HeaderField::Date => &mut self.date,
            HeaderField::VersionTag => &mut self.version_tag,
            HeaderField::CreditTotal => &mut self.credit_total,
            HeaderField::Remarks => &mut self.remarks,
        }
    }
}

/// Returns the file name component of `path`, falling back to the full
/// path when there is none.
#[must_use]
pub fn source_filename(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Bounds on per-document page scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum number of pages read from the start of a document.
    pub max_pages: usize,
    /// Scanning stops once at least this many fields are resolved.
    pub min_fields: usize,
}

impl ScanConfig {
    /// Creates a scan configuration, clamping `max_pages` to at least one
    /// page and `min_fields` to `1..=HeaderField::COUNT`.
    #[must_use]
    pub fn new(max_pages: usize, min_fields: usize) -> Self {
        Self {
            max_pages: max_pages.max(1),
            min_fields: min_fields.clamp(1, HeaderField::COUNT),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            min_fields: DEFAULT_MIN_FIELDS,
        }
    }
}

/// Lifecycle of a batch run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchState {
    /// No batch has been started, or the last one was cleared.
    #[default]
    Idle,
    /// A batch is being processed.
    Running,
    /// Every submitted file was processed.
    Completed,
    /// The batch stopped early at a file boundary on request.
    Cancelled,
    /// The batch aborted on a failure outside any single file.
    Failed,
}

impl BatchState {
    /// Returns `true` for states a batch can end in.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Running tally of a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    /// Number of files submitted.
    pub total: usize,
    /// Number of files processed so far (successes plus errors).
    pub processed: usize,
    /// Files whose header was extracted.
    pub ok: usize,
    /// Files replaced by an error row.
    pub errors: usize,
}

impl BatchCounts {
    /// Creates a zeroed tally for `total` submitted files.
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            ok: 0,
            errors: 0,
        }
    }

    /// Fraction of submitted files processed (0.0 - 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.processed as f64 / self.total as f64
    }
}

/// Outcome of a finished batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Terminal state the run ended in.
    pub state: BatchState,
    /// Final tally.
    pub counts: BatchCounts,
    /// Single human-readable status line.
    pub message: String,
}

impl BatchSummary {
    /// Summary for a run that processed every file.
    #[must_use]
    pub fn completed(counts: BatchCounts) -> Self {
        Self {
            state: BatchState::Completed,
            message: format!(
                "Done | PDFs: {} | OK: {} | Errors: {}",
                counts.total, counts.ok, counts.errors
            ),
            counts,
        }
    }

    /// Summary for a run that stopped on a cancellation request.
    #[must_use]
    pub fn cancelled(counts: BatchCounts) -> Self {
        Self {
            state: BatchState::Cancelled,
            message: format!(
                "Cancelled | Processed: {} | OK: {} | Errors: {}",
                counts.processed, counts.ok, counts.errors
            ),
            counts,
        }
    }

    /// Summary for a run aborted by a failure outside any single file.
    #[must_use]
    pub fn failed(counts: BatchCounts, reason: &str) -> Self {
        Self {
            state: BatchState::Failed,
            message: format!("Critical error: {reason}"),
            counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator as _;

    #[test]
    fn fields_iterate_in_column_order() {
        let labels: Vec<&str> = HeaderField::iter().map(HeaderField::column_label).collect();
        assert_eq!(
            labels,
            vec![
                "Name",
                "Code",
                "Program",
                "Campus",
                "Study-Plan",
                "Date",
                "Version-Tag",
                "Credit-Total",
                "Remarks",
            ]
        );
        assert_eq!(HeaderField::iter().count(), HeaderField::COUNT);
    }

    #[test]
    fn field_index_matches_iteration_position() {
        for (i, field) in HeaderField::iter().enumerate() {
            assert_eq!(field.index(), i);
        }
    }

    #[test]
    fn field_names_are_snake_case() {
        assert_eq!(HeaderField::StudyPlan.to_string(), "study_plan");
        assert_eq!(
            "credit_total".parse::<HeaderField>().unwrap(),
            HeaderField::CreditTotal
        );
    }

    #[test]
    fn record_takes_filename_from_path() {
        let record = HeaderRecord::new(Path::new("/tmp/reports/alumno.pdf"));
        assert_eq!(record.source_filename(), "alumno.pdf");
        assert_eq!(record.source_path(), Path::new("/tmp/reports/alumno.pdf"));
        assert_eq!(record.resolved_count(), 0);
    }

    #[test]
    fn record_get_and_set_by_field() {
        let mut record = HeaderRecord::new(Path::new("a.pdf"));
        record.set(HeaderField::Campus, Some("Lima Norte".to_string()));
        record.set(HeaderField::CreditTotal, Some("42".to_string()));

        assert_eq!(record.get(HeaderField::Campus), Some("Lima Norte"));
        assert!(record.is_resolved(HeaderField::CreditTotal));
        assert_eq!(record.get(HeaderField::Name), None);
        assert_eq!(record.resolved_count(), 2);
    }

    #[test]
    fn record_serializes_with_snake_case_keys() {
        let mut record = HeaderRecord::new(Path::new("a.pdf"));
        record.set(HeaderField::StudyPlan, Some("2019".to_string()));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["study_plan"], "2019");
        assert_eq!(json["source_filename"], "a.pdf");
        assert!(json["name"].is_null());
    }

    #[test]
    fn scan_config_defaults() {
        let config = ScanConfig::default();
        assert_eq!(config.max_pages, 4);
        assert_eq!(config.min_fields, 7);
    }

    #[test]
    fn scan_config_clamps_bounds() {
        let config = ScanConfig::new(0, 50);
        assert_eq!(config.max_pages, 1);
        assert_eq!(config.min_fields, HeaderField::COUNT);

        let config = ScanConfig::new(2, 0);
        assert_eq!(config.min_fields, 1);
    }

    #[test]
    fn summary_messages_report_counts() {
        let counts = BatchCounts {
            total: 5,
            processed: 5,
            ok: 4,
            errors: 1,
        };
        let summary = BatchSummary::completed(counts);
        assert_eq!(summary.state, BatchState::Completed);
        assert_eq!(summary.message, "Done | PDFs: 5 | OK: 4 | Errors: 1");

        let counts = BatchCounts {
            total: 5,
            processed: 2,
            ok: 2,
            errors: 0,
        };
        let summary = BatchSummary::cancelled(counts);
        assert_eq!(summary.state, BatchState::Cancelled);
        assert_eq!(summary.message, "Cancelled | Processed: 2 | OK: 2 | Errors: 0");
    }

    #[test]
    fn terminal_states() {
        assert!(!BatchState::Idle.is_terminal());
        assert!(!BatchState::Running.is_terminal());
        assert!(BatchState::Completed.is_terminal());
        assert!(BatchState::Cancelled.is_terminal());
        assert!(BatchState::Failed.is_terminal());
    }

    #[test]
    fn fraction_of_empty_batch_is_complete() {
        assert!((BatchCounts::new(0).fraction() - 1.0).abs() < f64::EPSILON);
        let counts = BatchCounts {
            total: 4,
            processed: 1,
            ok: 1,
            errors: 0,
        };
        assert!((counts.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
