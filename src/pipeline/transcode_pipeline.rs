//! # Transcode Pipeline Orchestrator
//!
//! Orchestratore principale: enumera l'albero, verifica il motore di
//! conversione e delega ogni file a [`FileTask`].
//!
//! Con `workers == 1` i file sono elaborati in sequenza e l'ordine dei log
//! segue l'ordine di enumerazione. Con più worker i file sono elaborati in
//! parallelo (semaforo + `tokio::spawn`), i log possono intercalarsi e le
//! statistiche vengono aggregate dopo la fine di tutti i task.

use crate::{
    config::Config,
    engine::ImageEngine,
    error::ConvertError,
    file_manager::FileManager,
    pipeline::file_task::FileTask,
    progress::{ConversionStats, ProgressManager},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Orchestratore della conversione
pub struct TranscodePipeline {
    config: Arc<Config>,
    engine: Arc<dyn ImageEngine>,
}

impl TranscodePipeline {
    /// Crea la pipeline, validando la configurazione
    pub fn new(config: Config, engine: Arc<dyn ImageEngine>) -> Result<Self, ConvertError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            engine,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Esegue l'intero processo: enumerazione, conversione, riepilogo
    pub async fn run(&self) -> Result<ConversionStats, ConvertError> {
        let start_time = Instant::now();
        let root = &self.config.root_dir;

        info!("Scanning {} for images to convert", root.display());
        let spinner = ProgressManager::spinner("Scanning directories...", self.config.show_progress);
        let files = FileManager::enumerate(root, self.config.scan_concurrency).await;
        spinner.finish_and_clear();
        let files = files?;

        if files.is_empty() {
            info!("ℹ️ No files to convert in {}", root.display());
            return Ok(ConversionStats::new());
        }

        self.engine.validate().await?;
        self.log_configuration(&files);

        let stats = self.process_files(files).await?;

        info!("🎉 All supported images processed. {}", stats.format_summary());
        self.log_final_stats(&stats, start_time.elapsed().as_secs_f64());

        Ok(stats)
    }

    /// Converte i file dati con la qualità configurata
    pub async fn process_files(&self, files: Vec<PathBuf>) -> Result<ConversionStats, ConvertError> {
        let progress = ProgressManager::new(files.len() as u64, self.config.show_progress);
        let task = FileTask::new(self.config.clone(), self.engine.clone());

        let stats = if self.config.workers <= 1 {
            Ok(Self::process_sequentially(&task, files, &progress).await)
        } else {
            self.process_concurrently(task, files, &progress).await
        };

        match &stats {
            Ok(stats) => progress.finish(&stats.format_summary()),
            Err(_) => progress.finish_and_clear(),
        }
        stats
    }

    async fn process_sequentially(
        task: &FileTask,
        files: Vec<PathBuf>,
        progress: &ProgressManager,
    ) -> ConversionStats {
        let mut stats = ConversionStats::new();
        for file in files {
            let outcome = task.process(&file).await;
            stats.record(&outcome);
            progress.update(&display_name(&file));
        }
        stats
    }

    async fn process_concurrently(
        &self,
        task: FileTask,
        files: Vec<PathBuf>,
        progress: &ProgressManager,
    ) -> Result<ConversionStats, ConvertError> {
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = Vec::with_capacity(files.len());

        for file in files {
            let permit = semaphore.clone().acquire_owned().await?;
            let task = task.clone();
            let progress = progress.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = task.process(&file).await;
                progress.update(&display_name(&file));
                outcome
            }));
        }

        // Join every task before reporting the first failure
        let mut stats = ConversionStats::new();
        let mut first_error = None;
        for handle in tasks {
            match handle.await {
                Ok(outcome) => stats.record(&outcome),
                Err(e) => {
                    error!("❌ Conversion task failed: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(stats),
        }
    }

    fn log_configuration(&self, files: &[PathBuf]) {
        debug!("Image engine: {}", self.engine.name());
        info!(
            "Found {} files, converting to {} with quality {} (max {}x{}, {} worker(s))",
            files.len(),
            self.config.target_extension,
            self.config.quality,
            self.config.max_width,
            self.config.max_height,
            self.config.workers
        );
    }

    fn log_final_stats(&self, stats: &ConversionStats, duration: f64) {
        debug!("=== Conversion Complete ===");
        debug!("Files seen: {}", stats.files_seen);
        debug!("Converted: {}", stats.converted);
        debug!("Skipped (unsupported): {}", stats.skipped);
        debug!("Read failures: {}", stats.read_failed);
        debug!("Write failures: {}", stats.write_failed);
        debug!("Delete failures: {}", stats.delete_failed);
        debug!("Bytes saved: {}", FileManager::format_size(stats.bytes_saved()));
        debug!("Elapsed: {:.2}s", duration);
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
