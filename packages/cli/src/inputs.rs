//! Resolves command-line inputs to the list of PDFs to process.

use std::path::{Path, PathBuf};

/// Returns `true` if `path` has a `.pdf` extension (any case).
#[must_use]
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Lists the PDF files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be read.
pub fn pdfs_in_dir(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// Expands `inputs` in order: directories become their sorted PDFs and
/// files are kept as given.
///
/// # Errors
///
/// Returns an I/O error if a directory cannot be read.
pub fn expand(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = pdfs_in_dir(input)?;
            if found.is_empty() {
                log::warn!("No PDF files in {}", input.display());
            }
            paths.extend(found);
        } else {
            paths.push(input.clone());
        }
    }
    Ok(paths)
}
