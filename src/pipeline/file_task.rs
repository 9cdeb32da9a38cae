//! # File Task Module
//!
//! Worker per la conversione di un singolo file.
//!
//! Macchina a stati per file:
//! `pending -> {skipped | read-failed | write-failed | delete-failed | converted}`.
//! Tutti gli stati sono terminali, nessun retry. Gli errori restano confinati
//! al file: vengono loggati e restituiti come `ConversionOutcome::Failed`.

use crate::{
    config::Config,
    engine::{Dimensions, EncodeJob, ImageEngine},
    error::ConvertError,
    file_manager::FileManager,
    pipeline::path_resolver::PathResolver,
    resize,
};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::fs;
use tracing::{debug, error, info, warn};

/// Step at which a conversion failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Source metadata could not be read
    Read,
    /// Encoding or writing the output failed, the original is untouched
    Write,
    /// Output written but the original could not be removed
    Delete,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FailureStage::Read => "read",
            FailureStage::Write => "write",
            FailureStage::Delete => "delete",
        };
        f.write_str(stage)
    }
}

/// Terminal result of processing one file
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Converted {
        source: PathBuf,
        target: PathBuf,
        quality: u8,
        resized: Option<Dimensions>,
        original_size: u64,
        output_size: u64,
    },
    Skipped {
        path: PathBuf,
    },
    Failed {
        path: PathBuf,
        stage: FailureStage,
        error: String,
    },
}

/// Worker per elaborazione singoli file
#[derive(Clone)]
pub struct FileTask {
    config: Arc<Config>,
    engine: Arc<dyn ImageEngine>,
}

impl FileTask {
    pub fn new(config: Arc<Config>, engine: Arc<dyn ImageEngine>) -> Self {
        Self { config, engine }
    }

    /// Processa un singolo file fino a uno stato terminale
    pub async fn process(&self, path: &Path) -> ConversionOutcome {
        if !self.config.is_supported(path) {
            debug!("Skipping unsupported file: {}", path.display());
            return ConversionOutcome::Skipped {
                path: path.to_path_buf(),
            };
        }

        let target = match PathResolver::target_path(path, &self.config.target_extension) {
            Ok(target) => target,
            Err(e) => return Self::fail(path, FailureStage::Read, e),
        };

        let source_size = match self.engine.probe(path).await {
            Ok(size) => size,
            Err(e) => return Self::fail(path, FailureStage::Read, e),
        };

        let original_size = match FileManager::file_size(path).await {
            Ok(size) => size,
            Err(e) => return Self::fail(path, FailureStage::Read, e),
        };

        let resized = resize::fit_within(source_size, self.config.max_width, self.config.max_height);
        if let Some(size) = resized {
            debug!("Resizing {} from {} to {}", path.display(), source_size, size);
        }

        let output_size = match self.write_output(path, &target, resized).await {
            Ok(size) => size,
            Err(e) => return Self::fail(path, FailureStage::Write, e),
        };

        if let Err(e) = fs::remove_file(path).await {
            return Self::fail(path, FailureStage::Delete, e.into());
        }

        info!(
            "✅ {} converted to {} (quality {}) and removed",
            path.display(),
            target.display(),
            self.config.quality
        );

        ConversionOutcome::Converted {
            source: path.to_path_buf(),
            target,
            quality: self.config.quality,
            resized,
            original_size,
            output_size,
        }
    }

    /// Encode into a hidden temporary file next to the target, then move it
    /// onto the target. Returns the size of the written output.
    async fn write_output(
        &self,
        source: &Path,
        target: &Path,
        resized: Option<Dimensions>,
    ) -> Result<u64, ConvertError> {
        match fs::try_exists(target).await {
            Ok(true) => warn!("⚠️ Overwriting existing file: {}", target.display()),
            Ok(false) => {}
            Err(e) => warn!("⚠️ Could not check whether {} exists: {}", target.display(), e),
        }

        // Dropped without persist on any error, which removes it
        let partial = Self::partial_file(target)?;
        let job = EncodeJob {
            input: source.to_path_buf(),
            output: partial.path().to_path_buf(),
            resize: resized,
            quality: self.config.quality,
        };

        self.engine.encode(&job).await?;
        let size = FileManager::file_size(partial.path()).await?;
        partial.persist(target).map_err(|e| ConvertError::Io(e.error))?;

        Ok(size)
    }

    /// Unique `.<target name>.XXXXXX.partial` file in the target directory
    fn partial_file(target: &Path) -> Result<NamedTempFile, ConvertError> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut prefix = OsString::from(".");
        if let Some(name) = target.file_name() {
            prefix.push(name);
        }
        prefix.push(".");

        let partial = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".partial")
            .tempfile_in(dir)?;
        debug!("Encoding {} via {}", target.display(), partial.path().display());
        Ok(partial)
    }

    fn fail(path: &Path, stage: FailureStage, error: ConvertError) -> ConversionOutcome {
        error!("❌ Failed to convert {} ({} error): {}", path.display(), stage, error);
        ConversionOutcome::Failed {
            path: path.to_path_buf(),
            stage,
            error: error.to_string(),
        }
    }
}
