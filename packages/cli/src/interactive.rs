//! Interactive menu for selecting PDFs, reviewing results, and exporting.
//!
//! The menu loops until the user quits. Results accumulate across batches
//! in one [`Session`] until cleared.

use std::path::PathBuf;
use std::sync::Arc;

use conva_extract::{Config, ResultRow, Session, SessionError};
use conva_extract_models::{HeaderField, source_filename};
use dialoguer::console::style;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use indicatif::MultiProgress;

/// Actions available in the main menu.
enum Action {
    SelectPdfs,
    ShowResults,
    Export,
    OpenExport,
    Clear,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::SelectPdfs,
        Self::ShowResults,
        Self::Export,
        Self::OpenExport,
        Self::Clear,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::SelectPdfs => "Select PDFs",
            Self::ShowResults => "Show results",
            Self::Export => "Export to CSV",
            Self::OpenExport => "Open exported file",
            Self::Clear => "Clear results",
            Self::Quit => "Quit",
        }
    }
}

/// Runs the interactive menu loop.
///
/// # Errors
///
/// Returns an error if a prompt fails or the result list becomes unusable.
pub async fn run(multi: &MultiProgress, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let session = Arc::new(Session::new());
    let export_path = config.export_path();

    println!("Convalidation Header Extractor");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        println!(
            "{}",
            style(format!(
                "Rows: {} | State: {}",
                session.len()?,
                session.state()
            ))
            .dim()
        );

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match Action::ALL[idx] {
            Action::SelectPdfs => select_and_process(&session, multi, config).await?,
            Action::ShowResults => print_table(&session.snapshot()?),
            Action::Export => {
                crate::export(&session, &export_path);
            }
            Action::OpenExport => {
                if let Err(e) = crate::open::open_path(&export_path) {
                    println!("{}", style(e).red());
                }
            }
            Action::Clear => clear(&session)?,
            Action::Quit => break,
        }

        println!();
    }

    Ok(())
}

/// Prompts for a directory, lets the user pick PDFs from it, and processes
/// the selection.
async fn select_and_process(
    session: &Arc<Session>,
    multi: &MultiProgress,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir: String = Input::new()
        .with_prompt("Directory containing PDFs")
        .default(".".to_string())
        .interact_text()?;
    let dir = PathBuf::from(dir.trim());

    let pdfs = match crate::inputs::pdfs_in_dir(&dir) {
        Ok(pdfs) => pdfs,
        Err(e) => {
            println!("{}", style(format!("Cannot read {}: {e}", dir.display())).red());
            return Ok(());
        }
    };
    if pdfs.is_empty() {
        println!("No PDF files in {}.", dir.display());
        return Ok(());
    }

    let names: Vec<String> = pdfs.iter().map(|p| source_filename(p)).collect();
    let all = vec![true; names.len()];
    let selected = MultiSelect::new()
        .with_prompt("Select PDFs (space=toggle, a=all, enter=confirm)")
        .items(&names)
        .defaults(&all)
        .max_length(20)
        .interact()?;

    if selected.is_empty() {
        println!("No PDFs selected.");
        return Ok(());
    }

    let paths: Vec<PathBuf> = selected.iter().map(|&i| pdfs[i].clone()).collect();

    let outcome = crate::run_batch(
        session,
        paths,
        config.scan_config(),
        config.batch_options(),
        multi,
    )
    .await?;
    crate::print_status(outcome.as_ref());

    Ok(())
}

fn clear(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    if session.is_empty()? {
        println!("Nothing to clear.");
        return Ok(());
    }

    let confirmed = Confirm::new()
        .with_prompt(format!("Discard {} row(s)?", session.len()?))
        .default(false)
        .interact()?;
    if !confirmed {
        return Ok(());
    }

    match session.clear() {
        Ok(()) => println!("Results cleared."),
        Err(SessionError::BatchInProgress) => {
            println!("{}", style("A batch is still running").yellow());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Columns shown in the results table, with their widths.
const TABLE_COLUMNS: &[(HeaderField, usize)] = &[
    (HeaderField::Name, 28),
    (HeaderField::Code, 12),
    (HeaderField::Program, 24),
    (HeaderField::Date, 10),
    (HeaderField::CreditTotal, 6),
    (HeaderField::Remarks, 28),
];

/// Prints a compact, truncated table of the result rows.
fn print_table(rows: &[ResultRow]) {
    if rows.is_empty() {
        println!("No results yet.");
        return;
    }

    let mut header = String::new();
    for &(field, width) in TABLE_COLUMNS {
        header.push_str(&format!("{:<width$} ", truncate(field.column_label(), width)));
    }
    header.push_str("File");
    println!("{}", style(header).bold());

    for row in rows {
        let mut line = String::new();
        for &(field, width) in TABLE_COLUMNS {
            let cell = truncate(row.get(field).unwrap_or("-"), width);
            line.push_str(&format!("{cell:<width$} "));
        }
        line.push_str(row.source_filename().unwrap_or("-"));

        if row.is_error() {
            println!("{}", style(line).red());
        } else {
            println!("{line}");
        }
    }

    println!("{} row(s)", rows.len());
}

/// Cuts `value` to at most `width` characters, marking the cut with `~`.
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
