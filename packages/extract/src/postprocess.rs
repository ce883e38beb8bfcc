//! Per-field cleanup applied after a pattern captures a value.

use std::sync::LazyLock;

use conva_extract_models::HeaderField;
use regex::Regex;

use crate::extractor::normalize_whitespace;

/// Sub-labels that can trail the student's name on the same line. The name
/// ends where the first of them begins.
static NAME_CUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+(?:ID\s*Estudiante|C[óo]digo)\s*:").expect("valid regex")
});

/// Trailing "Modalidad: ..." clause printed after the program name.
static PROGRAM_MODALITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+Modalidad:.*$").expect("valid regex"));

/// Applies the cleanup rule for `field` to an already whitespace-normalized
/// capture. Returns `None` if nothing is left.
#[must_use]
pub fn apply(field: HeaderField, value: String) -> Option<String> {
    let cleaned = match field {
        HeaderField::Name => clean_name(&value),
        HeaderField::Program => clean_program(&value),
        _ => value,
    };

    (!cleaned.is_empty()).then_some(cleaned)
}

/// Truncates a name at an embedded `ID Estudiante:` / `Código:` sub-label.
#[must_use]
pub fn clean_name(raw: &str) -> String {
    let end = NAME_CUT_RE.find(raw).map_or(raw.len(), |m| m.start());
    normalize_whitespace(&raw[..end])
}

/// Strips a trailing `Modalidad:` clause from a program name.
#[must_use]
pub fn clean_program(raw: &str) -> String {
    normalize_whitespace(&PROGRAM_MODALITY_RE.replace(raw, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_truncates_at_student_id_label() {
        assert_eq!(
            clean_name("Juan Perez Garcia ID Estudiante: N12345678"),
            "Juan Perez Garcia"
        );
    }

    #[test]
    fn name_truncates_at_code_label_any_case() {
        assert_eq!(clean_name("ROSA QUISPE CODIGO: N001"), "ROSA QUISPE");
        assert_eq!(clean_name("Rosa Quispe código: N001"), "Rosa Quispe");
        assert_eq!(clean_name("Rosa Quispe ID ESTUDIANTE: N001"), "Rosa Quispe");
    }

    #[test]
    fn name_cuts_at_earliest_label() {
        assert_eq!(
            clean_name("Ana Torres Código: N1 ID Estudiante: N2"),
            "Ana Torres"
        );
    }

    #[test]
    fn name_without_label_is_unchanged() {
        assert_eq!(clean_name("Luis Alberto Rojas"), "Luis Alberto Rojas");
    }

    #[test]
    fn program_drops_modality_clause() {
        assert_eq!(
            clean_program("Ingeniería Industrial Modalidad: Working Adult"),
            "Ingeniería Industrial"
        );
        assert_eq!(
            clean_program("Derecho MODALIDAD: Presencial"),
            "Derecho"
        );
    }

    #[test]
    fn program_without_modality_is_unchanged() {
        assert_eq!(clean_program("Arquitectura"), "Arquitectura");
    }

    #[test]
    fn label_at_start_is_not_a_cut_point() {
        assert_eq!(clean_name("ID Estudiante: N123"), "ID Estudiante: N123");
    }

    #[test]
    fn empty_result_is_absent() {
        assert_eq!(apply(HeaderField::Name, String::new()), None);
        assert_eq!(
            apply(HeaderField::Program, " Modalidad: Presencial".to_string()),
            None
        );
    }

    #[test]
    fn other_fields_pass_through() {
        assert_eq!(
            apply(HeaderField::Campus, "Lima Centro".to_string()),
            Some("Lima Centro".to_string())
        );
    }
}
