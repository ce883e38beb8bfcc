//! CSV export of the result table.
//!
//! Files start with a UTF-8 byte-order mark so spreadsheet applications on
//! Windows decode accented values as UTF-8 rather than the local code page.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use crate::row::{COLUMNS, ResultRow};

/// File name of the export written beside the running program.
pub const DEFAULT_EXPORT_FILENAME: &str = "conva_results.csv";

/// UTF-8 byte-order mark written before the header line.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors raised while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// There are no rows to export; nothing was written.
    #[error("No data to export")]
    NoData,

    /// Creating the output directory or file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing a CSV record failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes `rows` to `path` as CSV with a byte-order mark and a header line,
/// replacing any existing file. Returns the number of data rows written.
///
/// # Errors
///
/// * [`ExportError::NoData`] if `rows` is empty (no file is touched)
/// * [`ExportError::Io`] / [`ExportError::Csv`] if writing fails
pub fn write_rows(rows: &[ResultRow], path: &Path) -> Result<usize, ExportError> {
    if rows.is_empty() {
        return Err(ExportError::NoData);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record(row.to_record())?;
    }
    writer.flush()?;

    log::info!("Exported {} row(s) to {}", rows.len(), path.display());

    Ok(rows.len())
}

/// Default export location: [`DEFAULT_EXPORT_FILENAME`] in the directory of
/// the running executable, or the working directory if that cannot be
/// resolved.
#[must_use]
pub fn default_export_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_EXPORT_FILENAME)
}
