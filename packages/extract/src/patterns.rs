//! Ordered candidate regexes for every header field.
//!
//! Each field maps to a list of [`PatternRule`]s tried in order; the first
//! rule that matches with its capture group present wins. Patterns are
//! case-insensitive and compiled once per process.

use std::sync::LazyLock;

use conva_extract_models::HeaderField;
use regex::{Regex, RegexBuilder};

/// A candidate regex plus the capture group holding the field value.
#[derive(Debug, Clone)]
pub struct PatternRule {
    regex: Regex,
    group: usize,
}

impl PatternRule {
    /// Compiles `pattern` case-insensitively, capturing `group`.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern fails to compile.
    pub fn new(pattern: &str, group: usize) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex, group })
    }

    /// The compiled regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Index of the capture group holding the value.
    #[must_use]
    pub const fn group(&self) -> usize {
        self.group
    }

    /// Returns the raw captured text if the rule matches `text` and its
    /// capture group participated in the match.
    #[must_use]
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(self.group))
            .map(|m| m.as_str())
    }
}

/// Ordered field → candidate rules mapping.
#[derive(Debug, Clone)]
pub struct PatternTable {
    rules: [Vec<PatternRule>; HeaderField::COUNT],
}

impl PatternTable {
    /// Builds a table from `(field, [(pattern, group)])` entries. Fields
    /// without an entry get no rules and never resolve.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if any pattern fails to compile.
    pub fn from_entries(entries: &[(HeaderField, &[(&str, usize)])]) -> Result<Self, regex::Error> {
        let mut rules: [Vec<PatternRule>; HeaderField::COUNT] = Default::default();

        for (field, patterns) in entries {
            for &(pattern, group) in *patterns {
                rules[field.index()].push(PatternRule::new(pattern, group)?);
            }
        }

        Ok(Self { rules })
    }

    /// Candidate rules for `field`, in precedence order.
    #[must_use]
    pub fn rules(&self, field: HeaderField) -> &[PatternRule] {
        &self.rules[field.index()]
    }
}

/// Built-in patterns for the convalidation report header.
const BUILTIN_ENTRIES: &[(HeaderField, &[(&str, usize)])] = &[
    (
        HeaderField::Name,
        &[(r"Apellidos\s+y\s+Nombres:\s*([^\n]+)", 1)],
    ),
    (
        HeaderField::Code,
        &[
            (r"\bID\s*Estudiante:\s*(N\d+)", 1),
            (r"\bCódigo:\s*(N\d+)", 1),
        ],
    ),
    (
        HeaderField::Program,
        &[
            (r"Carrera\s+en\s+UPN:\s*([^\n]+)", 1),
            (r"Carrera\s+UPN:\s*([^\n]+)", 1),
        ],
    ),
    (HeaderField::Campus, &[(r"Campus:\s*([^\n]+)", 1)]),
    (
        HeaderField::StudyPlan,
        &[(r"Plan\s+de\s+Estudios:\s*([0-9]+)", 1)],
    ),
    (
        HeaderField::Date,
        &[(r"\bFecha:\s*([0-9]{1,2}/[0-9]{1,2}/[0-9]{4})", 1)],
    ),
    (
        HeaderField::VersionTag,
        &[
            (r"Versión\s+ExcelConva:\s*([0-9.]+)", 1),
            (r"Versión\s+Conva2025G\s*:\s*([0-9.]+)", 1),
            // May be free text such as "Manual".
            (r"Versión\s+Conva\s*:\s*([^\n]+)", 1),
        ],
    ),
    (
        HeaderField::CreditTotal,
        &[
            (r"TOTAL\s+DE\s+CRÉDITOS\s*(?:o\s*Total\s*[:])?\s*([0-9]+)", 1),
            (r"\bTotal\s+([0-9]+)\b", 1),
        ],
    ),
    (
        HeaderField::Remarks,
        &[
            (r"(Convalidación\s+por\s+paquete\s*\([^)]+\))", 1),
            (r"(Convalidación\s+por\s+paquete)", 1),
        ],
    ),
];

static BUILTIN: LazyLock<PatternTable> = LazyLock::new(|| {
    PatternTable::from_entries(BUILTIN_ENTRIES).expect("valid built-in header patterns")
});

/// The process-wide built-in pattern table.
#[must_use]
pub fn builtin() -> &'static PatternTable {
    &BUILTIN
}
