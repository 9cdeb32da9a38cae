//! # Image Engine Module
//!
//! Definisce il confine tra la pipeline e il motore di decodifica/encoding.
//! La pipeline conosce solo il trait [`ImageEngine`]; l'implementazione di
//! produzione è [`crate::image_processor::CwebpProcessor`].
//!
//! Con `#[cfg(test)]` è disponibile anche `MockEngine`, deterministico e senza
//! tool esterni, usato dai test della pipeline.

use crate::error::ConvertError;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A single decode -> (optional resize) -> encode -> write request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Exact output size, `None` keeps the source resolution
    pub resize: Option<Dimensions>,
    pub quality: u8,
}

/// Image decode/encode backend used by the transcode pipeline.
#[async_trait]
pub trait ImageEngine: Send + Sync {
    /// Returns the name of this engine implementation.
    fn name(&self) -> &str;

    /// Reads the source image dimensions.
    async fn probe(&self, path: &Path) -> Result<Dimensions, ConvertError>;

    /// Re-encodes `job.input` into `job.output`.
    async fn encode(&self, job: &EncodeJob) -> Result<(), ConvertError>;

    /// Checks that the engine is ready to run.
    async fn validate(&self) -> Result<(), ConvertError> {
        Ok(())
    }
}
