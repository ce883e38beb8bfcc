#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Header extraction for convalidation reports.
//!
//! Text from the first pages of a PDF is matched against an ordered table of
//! regex patterns per header field. Pages are scanned one at a time and
//! scanning stops as soon as enough fields are resolved. Many files can be
//! processed as a cancellable batch whose rows accumulate in a [`Session`]
//! and can be exported to CSV.

pub mod batch;
pub mod config;
pub mod export;
pub mod extractor;
pub mod patterns;
pub mod postprocess;
pub mod progress;
pub mod row;
pub mod scanner;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_pdf;

use std::path::Path;

pub use batch::{BatchError, BatchOptions, CancelToken, DocumentExtractor, PdfExtractor};
pub use config::{Config, ConfigError};
pub use export::ExportError;
pub use row::{COLUMNS, ResultRow};
pub use session::{Session, SessionError};

use conva_extract_models::{HeaderRecord, ScanConfig};
use conva_extract_pdf::{PdfDocument, PdfError};

/// Reads the PDF at `path` and extracts its header, scanning at most
/// `config.max_pages` pages.
///
/// # Errors
///
/// Returns [`PdfError`] if the file cannot be read or holds no text.
pub fn extract_file(path: &Path, config: &ScanConfig) -> Result<HeaderRecord, PdfError> {
    let document = PdfDocument::open(path)?;
    let record = scanner::scan(&document, config, path)?;

    log::debug!(
        "{}: resolved {}/{} field(s)",
        record.source_filename(),
        record.resolved_count(),
        conva_extract_models::HeaderField::COUNT
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use conva_extract_models::HeaderField;

    use super::*;
    use crate::test_pdf::write_text_pdf;

    #[test]
    fn extracts_name_and_code_from_a_real_pdf() {
        let path = write_text_pdf(
            "juan_perez.pdf",
            &[vec![
                "Apellidos y Nombres: Juan Perez Garcia ID Estudiante: N12345678",
                "Campus: Lima Norte",
                "Plan de Estudios: 2019",
            ]],
        );

        let record = extract_file(&path, &ScanConfig::default()).unwrap();

        assert_eq!(record.get(HeaderField::Name), Some("Juan Perez Garcia"));
        assert_eq!(record.get(HeaderField::Code), Some("N12345678"));
        assert_eq!(record.get(HeaderField::Campus), Some("Lima Norte"));
        assert_eq!(record.get(HeaderField::StudyPlan), Some("2019"));
        assert_eq!(record.source_filename(), "juan_perez.pdf");
    }

    #[test]
    fn program_modality_is_stripped_after_pdf_extraction() {
        let path = write_text_pdf(
            "modalidad.pdf",
            &[vec!["Carrera UPN: Ingenieria Civil Modalidad: Presencial"]],
        );

        let record = extract_file(&path, &ScanConfig::default()).unwrap();

        assert_eq!(record.get(HeaderField::Program), Some("Ingenieria Civil"));
    }

    #[test]
    fn fields_past_the_page_cap_are_not_read() {
        let mut pages = vec![vec!["Campus: Lima"]];
        pages.extend(std::iter::repeat_n(vec!["Detalle de cursos"], 28));
        pages.push(vec!["Apellidos y Nombres: Pagina Treinta"]);
        let path = write_text_pdf("treinta.pdf", &pages);

        let record = extract_file(&path, &ScanConfig::default()).unwrap();
        assert_eq!(record.get(HeaderField::Campus), Some("Lima"));
        assert!(!record.is_resolved(HeaderField::Name));

        let record = extract_file(&path, &ScanConfig::new(30, 7)).unwrap();
        assert_eq!(record.get(HeaderField::Name), Some("Pagina Treinta"));
    }

    #[test]
    fn pdf_without_text_is_unreadable() {
        let path = write_text_pdf("sin_texto.pdf", &[vec![], vec![]]);
        let err = extract_file(&path, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, PdfError::NoText { .. }));
    }
}
