//! `indicatif`-backed batch progress and logger setup.
//!
//! [`init_logger`] wraps `pretty_env_logger` in `indicatif-log-bridge` so
//! that `log::info!` and friends are suspended while the batch bar redraws.

use std::time::Duration;

use conva_extract::progress::BatchObserver;
use conva_extract_models::{BatchCounts, BatchSummary};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Renders batch notifications as an `indicatif` bar.
///
/// The bar starts as a spinner and switches to a full bar once the batch
/// reports its total.
pub struct IndicatifObserver {
    bar: ProgressBar,
    bar_style: ProgressStyle,
}

impl IndicatifObserver {
    #[must_use]
    pub fn new(multi: &MultiProgress) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.yellow} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message("Preparing...");

        let bar_style = ProgressStyle::with_template(
            "  {msg} {wide_bar:.yellow/dim} {pos}/{len} {percent}% [{eta}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");

        Self { bar, bar_style }
    }
}

impl BatchObserver for IndicatifObserver {
    fn started(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(self.bar_style.clone());
        self.bar.set_message(format!("Processing {total} PDF(s)..."));
    }

    fn progress(&self, counts: &BatchCounts, current_file: &str) {
        self.bar.set_position(counts.processed as u64);
        self.bar.set_message(format!(
            "OK: {} | Errors: {} | {current_file}",
            counts.ok, counts.errors
        ));
    }

    fn done(&self, summary: &BatchSummary) {
        self.bar.finish_with_message(summary.message.clone());
    }

    fn failed(&self, summary: &BatchSummary) {
        self.bar.abandon_with_message(summary.message.clone());
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] that all progress bars must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // already set in tests

    log::set_max_level(level);

    multi
}
