#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for convalidation header extraction.
//!
//! With a subcommand it runs non-interactively (`extract`, `batch`,
//! `columns`). Without one it starts a `dialoguer` menu for selecting PDFs,
//! reviewing results, and exporting them.
//!
//! Uses `indicatif-log-bridge` (via [`progress::init_logger`]) to route `log`
//! output through `indicatif::MultiProgress` so that log lines and the batch
//! progress bar never fight for the terminal.

mod inputs;
mod interactive;
mod open;
mod progress;

use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use conva_extract::{
    BatchOptions, COLUMNS, Config, ExportError, PdfExtractor, Session, SessionError,
};
use conva_extract::progress::{BatchObserver, LogObserver};
use conva_extract_models::{BatchState, BatchSummary, HeaderRecord, ScanConfig};
use dialoguer::console::style;
use indicatif::MultiProgress;
use strum::IntoEnumIterator as _;

use crate::progress::IndicatifObserver;

/// Delay between attempts to deliver a Ctrl-C that arrived before the batch
/// started.
const CANCEL_RETRY: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "conva_extract", about = "Convalidation report header extractor")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the header of a single PDF and print it
    Extract {
        /// PDF to read
        file: PathBuf,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        scan: ScanArgs,
    },
    /// Process PDFs (or directories of PDFs) and export the results as CSV
    Batch {
        /// PDF files and/or directories. Directories expand to the PDFs
        /// directly inside them, sorted by name.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// CSV destination (defaults to `conva_results.csv` beside the
        /// executable)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        scan: ScanArgs,
        /// Files between two progress updates
        #[arg(long)]
        stride: Option<usize>,
        /// Open the CSV with the default application once written
        #[arg(long)]
        open: bool,
    },
    /// Print the export column order
    Columns,
}

/// Page-scan overrides shared by `extract` and `batch`.
#[derive(Args)]
struct ScanArgs {
    /// Maximum number of pages read per PDF
    #[arg(long)]
    max_pages: Option<usize>,
    /// Stop scanning once this many fields are found
    #[arg(long)]
    min_fields: Option<usize>,
}

impl ScanArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(max_pages) = self.max_pages {
            config.scan.max_pages = max_pages;
        }
        if let Some(min_fields) = self.min_fields {
            config.scan.min_fields = min_fields;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = progress::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let Some(command) = cli.command else {
        return interactive::run(&multi, &config).await;
    };

    match command {
        Commands::Extract { file, json, scan } => {
            scan.apply(&mut config);
            let scan_config = config.scan_config();
            let record = tokio::task::spawn_blocking(move || {
                conva_extract::extract_file(&file, &scan_config)
            })
            .await??;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
        }
        Commands::Batch {
            paths,
            output,
            scan,
            stride,
            open,
        } => {
            scan.apply(&mut config);
            if let Some(stride) = stride {
                config.batch.progress_stride = stride;
            }

            let paths = inputs::expand(&paths)?;
            if paths.is_empty() {
                println!("No PDF files found.");
                return Ok(());
            }

            let session = Arc::new(Session::new());
            let outcome = run_batch(
                &session,
                paths,
                config.scan_config(),
                config.batch_options(),
                &multi,
            )
            .await?;
            print_status(outcome.as_ref());

            let output = output.unwrap_or_else(|| config.export_path());
            if export(&session, &output) && open {
                open::open_path(&output)?;
            }

            if let Err(e) = outcome {
                return Err(e.into());
            }
        }
        Commands::Columns => {
            for column in COLUMNS {
                println!("{column}");
            }
        }
    }

    Ok(())
}

/// Ctrl-C handling while a batch runs.
#[derive(Debug, Default)]
struct Interrupts {
    presses: u32,
    /// A cancellation was requested before the batch reached `Running`.
    pending: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Cancel after the file in flight.
    Cancel,
    /// Quit without waiting for the worker.
    Exit,
}

impl Interrupts {
    const fn press(&mut self) -> Interrupt {
        self.presses += 1;
        if self.presses > 1 {
            Interrupt::Exit
        } else {
            self.pending = true;
            Interrupt::Cancel
        }
    }

    /// Hands a pending cancellation to the session. Keeps it pending until
    /// the session has a running batch to cancel.
    fn deliver(&mut self, session: &Session) {
        if self.pending && session.request_cancel() {
            self.pending = false;
        }
    }
}

/// Runs a batch on a blocking worker while listening for Ctrl-C. The first
/// press cancels the batch after the file in flight; a second one exits.
/// Progress goes to a bar on a terminal and to the log otherwise.
///
/// The outer error is a worker join failure. The inner result is the
/// batch outcome.
pub(crate) async fn run_batch(
    session: &Arc<Session>,
    paths: Vec<PathBuf>,
    scan: ScanConfig,
    options: BatchOptions,
    multi: &MultiProgress,
) -> Result<Result<BatchSummary, SessionError>, tokio::task::JoinError> {
    let observer: Box<dyn BatchObserver> = if std::io::stderr().is_terminal() {
        Box::new(IndicatifObserver::new(multi))
    } else {
        Box::new(LogObserver)
    };
    let mut worker = {
        let session = Arc::clone(session);
        tokio::task::spawn_blocking(move || {
            session.run_batch(&paths, &PdfExtractor::new(scan), &options, observer.as_ref())
        })
    };

    let mut interrupts = Interrupts::default();
    loop {
        tokio::select! {
            joined = &mut worker => return joined,
            Ok(()) = tokio::signal::ctrl_c() => match interrupts.press() {
                Interrupt::Cancel => {
                    log::warn!("Interrupted, cancelling after the current PDF (Ctrl-C again to quit)...");
                    interrupts.deliver(session);
                }
                Interrupt::Exit => {
                    log::error!("Interrupted again, exiting");
                    std::process::exit(130);
                }
            },
            () = tokio::time::sleep(CANCEL_RETRY), if interrupts.pending => {
                interrupts.deliver(session);
            }
        }
    }
}

/// Prints the one-line outcome of a batch.
pub(crate) fn print_status(outcome: Result<&BatchSummary, &SessionError>) {
    match outcome {
        Ok(summary) => match summary.state {
            BatchState::Completed if summary.counts.errors == 0 => {
                println!("{}", style(&summary.message).green());
            }
            _ => println!("{}", style(&summary.message).yellow()),
        },
        Err(e) => println!("{}", style(e).red()),
    }
}

/// Exports the session rows to `path`, printing the outcome. Returns `true`
/// if a file was written.
pub(crate) fn export(session: &Session, path: &std::path::Path) -> bool {
    match session.export(path) {
        Ok(count) => {
            println!(
                "{}",
                style(format!("Exported {count} row(s) to {}", path.display())).green()
            );
            true
        }
        Err(SessionError::Export(ExportError::NoData)) => {
            println!("{}", style("No data to export").yellow());
            false
        }
        Err(e) => {
            println!("{}", style(format!("Export failed: {e}")).red());
            false
        }
    }
}

fn print_record(record: &HeaderRecord) {
    println!("{:<16}{}", "File", record.source_filename());
    for field in conva_extract_models::HeaderField::iter() {
        println!(
            "{:<16}{}",
            field.column_label(),
            record.get(field).unwrap_or("-")
        );
    }
}
