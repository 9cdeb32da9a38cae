//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` immutabile condivisa da enumeratore e pipeline
//! - Fornisce validazione dei parametri
//! - Interpreta l'argomento qualità della command line (clamp + default)
//!
//! ## Parametri di configurazione:
//! - `root_dir`: Directory radice da scansionare (default: ".")
//! - `max_width` / `max_height`: Bounding box per il resize (default: 1920x1080)
//! - `quality`: Qualità WebP (0-100, default: 80)
//! - `supported_extensions`: Estensioni sorgente (default: png, jpg, jpeg)
//! - `target_extension`: Estensione di output (default: webp)
//! - `scan_concurrency`: Listing di directory in parallelo (default: 16)
//! - `workers`: Worker di conversione (default: 1 = sequenziale)
//! - `show_progress`: Mostra spinner e progress bar (default: false)
//!
//! ## Esempio:
//! ```ignore
//! let resolved = resolve_quality(Some("150"));
//! assert_eq!(resolved.value, 100);
//!
//! let config = Config {
//!     quality: resolved.value,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use crate::error::ConvertError;
use std::collections::BTreeSet;
use std::fmt;
use std::num::IntErrorKind;
use std::path::{Path, PathBuf};

/// Quality used when the argument is missing or cannot be parsed
pub const DEFAULT_QUALITY: u8 = 80;

/// Highest accepted quality
pub const MAX_QUALITY: u8 = 100;

/// Configuration for a conversion run
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory to scan recursively
    pub root_dir: PathBuf,
    /// Maximum output width in pixels
    pub max_width: u32,
    /// Maximum output height in pixels
    pub max_height: u32,
    /// Encoder quality (0-100)
    pub quality: u8,
    /// Lowercase source extensions, without the leading dot
    pub supported_extensions: BTreeSet<String>,
    /// Output extension, without the leading dot
    pub target_extension: String,
    /// Maximum number of directory listings in flight
    pub scan_concurrency: usize,
    /// Number of files converted concurrently (1 = sequential)
    pub workers: usize,
    /// Draw spinner and progress bar on stderr
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            max_width: 1920,
            max_height: 1080,
            quality: DEFAULT_QUALITY,
            supported_extensions: ["png", "jpg", "jpeg"]
                .into_iter()
                .map(String::from)
                .collect(),
            target_extension: "webp".to_string(),
            scan_concurrency: 16,
            workers: 1,
            show_progress: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConvertError> {
        if self.quality > MAX_QUALITY {
            return Err(ConvertError::Validation(format!(
                "quality must be between 0 and {}, got {}",
                MAX_QUALITY, self.quality
            )));
        }

        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConvertError::Validation(
                "maximum width and height must be greater than 0".to_string(),
            ));
        }

        if self.supported_extensions.is_empty() {
            return Err(ConvertError::Validation(
                "at least one source extension is required".to_string(),
            ));
        }

        if self
            .supported_extensions
            .iter()
            .any(|ext| ext.starts_with('.') || *ext != ext.to_lowercase())
        {
            return Err(ConvertError::Validation(
                "source extensions must be lowercase and without a leading dot".to_string(),
            ));
        }

        if self.target_extension.is_empty() || self.target_extension.starts_with('.') {
            return Err(ConvertError::Validation(format!(
                "invalid target extension: {:?}",
                self.target_extension
            )));
        }

        if self
            .supported_extensions
            .contains(&self.target_extension.to_lowercase())
        {
            return Err(ConvertError::Validation(format!(
                "target extension {} is also a source extension",
                self.target_extension
            )));
        }

        if self.scan_concurrency == 0 {
            return Err(ConvertError::Validation(
                "scan concurrency must be greater than 0".to_string(),
            ));
        }

        if self.workers == 0 {
            return Err(ConvertError::Validation(
                "number of workers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Check whether a path carries one of the source extensions (case-insensitive)
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.supported_extensions.contains(&ext))
    }
}

/// Why the quality argument was not used verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityWarning {
    Missing,
    Unparseable(String),
    OutOfRange(String),
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::Missing => write!(f, "no quality argument given"),
            QualityWarning::Unparseable(raw) => write!(f, "invalid quality argument {:?}", raw),
            QualityWarning::OutOfRange(raw) => {
                write!(f, "quality argument {} is outside 0-{}", raw, MAX_QUALITY)
            }
        }
    }
}

/// Quality value resolved from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuality {
    pub value: u8,
    pub warning: Option<QualityWarning>,
}

/// Resolve the quality argument: integers are clamped to 0-100, anything
/// else falls back to [`DEFAULT_QUALITY`].
pub fn resolve_quality(arg: Option<&str>) -> ResolvedQuality {
    let Some(raw) = arg else {
        return ResolvedQuality {
            value: DEFAULT_QUALITY,
            warning: Some(QualityWarning::Missing),
        };
    };

    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(n) if (0..=i64::from(MAX_QUALITY)).contains(&n) => ResolvedQuality {
            value: n as u8,
            warning: None,
        },
        Ok(n) => ResolvedQuality {
            value: if n < 0 { 0 } else { MAX_QUALITY },
            warning: Some(QualityWarning::OutOfRange(trimmed.to_string())),
        },
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => ResolvedQuality {
                value: MAX_QUALITY,
                warning: Some(QualityWarning::OutOfRange(trimmed.to_string())),
            },
            IntErrorKind::NegOverflow => ResolvedQuality {
                value: 0,
                warning: Some(QualityWarning::OutOfRange(trimmed.to_string())),
            },
            _ => ResolvedQuality {
                value: DEFAULT_QUALITY,
                warning: Some(QualityWarning::Unparseable(raw.to_string())),
            },
        },
    }
}
