//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di conversione.
//!
//! ## Responsabilità:
//! - Spinner con `indicatif` durante la scansione delle directory
//! - Progress bar durante la conversione
//! - Tracking degli esiti per file (convertiti, saltati, falliti per fase)
//! - Riepilogo finale con byte risparmiati e percentuale di riduzione
//!
//! Spinner e barra sono nascosti quando `visible` è false (stderr non è un
//! terminale, test), le statistiche vengono sempre raccolte.
//!
//! Mentre una barra visibile è attiva, i log di `tracing` passano da
//! [`ProgressLogWriter`], che sospende la barra per scrivere ogni riga.
//!
//! ## Esempio:
//! ```ignore
//! let progress = ProgressManager::new(files.len() as u64, config.show_progress);
//! let mut stats = ConversionStats::new();
//!
//! // Per ogni file processato:
//! stats.record(&outcome);
//! progress.update("photo.png");
//!
//! // Alla fine:
//! progress.finish(&stats.format_summary());
//! ```

use crate::file_manager::FileManager;
use crate::pipeline::{ConversionOutcome, FailureStage};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

/// The visible bar currently drawn on the terminal, if any
static ACTIVE_BAR: Mutex<Option<ProgressBar>> = Mutex::new(None);

fn set_active_bar(bar: Option<ProgressBar>) {
    if let Ok(mut active) = ACTIVE_BAR.lock() {
        *active = bar;
    }
}

fn active_bar() -> Option<ProgressBar> {
    ACTIVE_BAR.lock().ok().and_then(|active| active.clone())
}

/// Log writer for `tracing_subscriber` that keeps lines from tearing the
/// progress bar: each write happens while the active bar is suspended.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressLogWriter;

impl Write for ProgressLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match active_bar() {
            Some(bar) => bar.suspend(|| io::stdout().write_all(buf))?,
            None => io::stdout().write_all(buf)?,
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

impl<'a> MakeWriter<'a> for ProgressLogWriter {
    type Writer = ProgressLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }
}

/// Manages progress reporting for a conversion run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
    /// Set when the bar is drawn and registered for [`ProgressLogWriter`]
    visible: bool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
                visible: false,
            };
        }

        let bar = ProgressBar::new(total_files);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(100));
        set_active_bar(Some(bar.clone()));

        Self { bar, visible: true }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        if self.visible {
            set_active_bar(None);
        }
        self.bar.finish_with_message(message.to_string());
    }

    /// Remove the bar from the terminal
    pub fn finish_and_clear(&self) {
        if self.visible {
            set_active_bar(None);
        }
        self.bar.finish_and_clear();
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(message: &str, visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
                visible: false,
            };
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        set_active_bar(Some(spinner.clone()));

        Self {
            bar: spinner,
            visible: true,
        }
    }
}

/// Statistics tracker for conversion results
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConversionStats {
    pub files_seen: usize,
    pub converted: usize,
    pub skipped: usize,
    pub read_failed: usize,
    pub write_failed: usize,
    pub delete_failed: usize,
    pub total_original_size: u64,
    pub total_output_size: u64,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: &ConversionOutcome) {
        self.files_seen += 1;
        match outcome {
            ConversionOutcome::Converted {
                original_size,
                output_size,
                ..
            } => {
                self.converted += 1;
                self.total_original_size += original_size;
                self.total_output_size += output_size;
            }
            ConversionOutcome::Skipped { .. } => self.skipped += 1,
            ConversionOutcome::Failed { stage, .. } => match stage {
                FailureStage::Read => self.read_failed += 1,
                FailureStage::Write => self.write_failed += 1,
                FailureStage::Delete => self.delete_failed += 1,
            },
        }
    }

    pub fn failed(&self) -> usize {
        self.read_failed + self.write_failed + self.delete_failed
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_original_size.saturating_sub(self.total_output_size)
    }

    pub fn overall_reduction_percent(&self) -> f64 {
        FileManager::calculate_reduction(self.total_original_size, self.total_output_size).max(0.0)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Converted: {} | Skipped: {} | Failed: {} | Total saved: {} ({:.2}%)",
            self.converted,
            self.skipped,
            self.failed(),
            FileManager::format_size(self.bytes_saved()),
            self.overall_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn converted(original_size: u64, output_size: u64) -> ConversionOutcome {
        ConversionOutcome::Converted {
            source: PathBuf::from("/p/a.png"),
            target: PathBuf::from("/p/a.webp"),
            quality: 80,
            resized: None,
            original_size,
            output_size,
        }
    }

    fn failed(stage: FailureStage) -> ConversionOutcome {
        ConversionOutcome::Failed {
            path: PathBuf::from("/p/b.jpg"),
            stage,
            error: "boom".to_string(),
        }
    }

    #[test]
    fn test_stats_record_each_outcome() {
        let mut stats = ConversionStats::new();
        stats.record(&converted(1000, 400));
        stats.record(&converted(1000, 600));
        stats.record(&ConversionOutcome::Skipped {
            path: PathBuf::from("/p/c.txt"),
        });
        stats.record(&failed(FailureStage::Read));
        stats.record(&failed(FailureStage::Write));
        stats.record(&failed(FailureStage::Delete));

        assert_eq!(stats.files_seen, 6);
        assert_eq!(stats.converted, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.failed(), 3);
        assert_eq!(stats.bytes_saved(), 1000);
        assert_eq!(stats.overall_reduction_percent(), 50.0);
    }

    #[test]
    fn test_stats_larger_output_saves_nothing() {
        let mut stats = ConversionStats::new();
        stats.record(&converted(100, 300));
        assert_eq!(stats.bytes_saved(), 0);
        assert_eq!(stats.overall_reduction_percent(), 0.0);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = ConversionStats::new();
        stats.record(&converted(2048, 1024));
        stats.record(&failed(FailureStage::Read));
        assert_eq!(
            stats.format_summary(),
            "Converted: 1 | Skipped: 0 | Failed: 1 | Total saved: 1.00 KB (50.00%)"
        );
    }

    #[test]
    fn test_hidden_progress_manager() {
        let progress = ProgressManager::new(3, false);
        progress.update("a.png");
        progress.finish("done");
        ProgressManager::spinner("Scanning", false).finish_and_clear();
    }

    #[test]
    fn test_log_writer_reports_full_writes() {
        let mut writer = ProgressLogWriter.make_writer();
        assert_eq!(writer.write(b"").unwrap(), 0);
        writer.flush().unwrap();
    }

    #[test]
    fn test_visible_bar_is_active_until_finished() {
        let progress = ProgressManager::new(2, true);
        assert!(active_bar().is_some());

        progress.update("a.png");
        progress.finish("done");
        assert!(active_bar().is_none());
    }
}
