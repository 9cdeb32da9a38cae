//! # Image Processing Module
//!
//! Questo modulo implementa il motore di conversione WebP usato in produzione,
//! delegando l'encoding al tool esterno `cwebp`.
//!
//! ## Architettura
//!
//! - **Lettura dimensioni**: crate `image`, solo decodifica dell'header
//!   (formato rilevato dal contenuto, non dall'estensione)
//! - **Decode + resize + encode**: `cwebp`, che legge PNG e JPEG nativamente
//!
//! ## Parametri cwebp
//!
//! | Parametro | Significato |
//! |-----------|-------------|
//! | `-quiet`  | Nessun output su stdout |
//! | `-q N`    | Qualità lossy (0-100) |
//! | `-m 4`    | Metodo di compressione bilanciato velocità/dimensione |
//! | `-mt`     | Multithreading |
//! | `-resize W H` | Dimensioni esatte di output, solo se serve il resize |
//!
//! ## Error Handling
//!
//! - **Header illeggibile**: `ConvertError::Decode`
//! - **cwebp non avviabile o exit code != 0**: `ConvertError::Encode` con lo stderr del tool
//! - **cwebp non installato**: `ConvertError::MissingDependency` da `validate()`
//!
//! ## Esempio
//!
//! ```ignore
//! let engine = CwebpProcessor::with_defaults();
//! engine.validate().await?;
//! let dims = engine.probe(&input).await?;
//! engine.encode(&EncodeJob { input, output, resize: None, quality: 80 }).await?;
//! ```

use crate::engine::{Dimensions, EncodeJob, ImageEngine};
use crate::error::ConvertError;
use crate::platform::PlatformCommands;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// WebP encoder backed by the `cwebp` command-line tool
pub struct CwebpProcessor {
    /// Program to execute, either a bare name resolved through PATH or a full path
    program: PathBuf,
    /// cwebp compression method (0 = fastest, 6 = smallest)
    method: u8,
}

impl CwebpProcessor {
    /// Creates a processor running the given cwebp binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            method: 4,
        }
    }

    /// Creates a processor using the platform's `cwebp` from PATH.
    pub fn with_defaults() -> Self {
        Self::new(PlatformCommands::instance().get_command("cwebp"))
    }

    /// Builds the cwebp argument list for a job.
    fn build_args(&self, job: &EncodeJob) -> Vec<String> {
        let mut args = vec![
            "-quiet".to_string(),
            "-q".to_string(),
            job.quality.to_string(),
            "-m".to_string(),
            self.method.to_string(),
            "-mt".to_string(),
        ];

        if let Some(size) = job.resize {
            args.extend(["-resize".to_string(), size.width.to_string(), size.height.to_string()]);
        }

        args.extend([
            job.input.to_string_lossy().to_string(),
            "-o".to_string(),
            job.output.to_string_lossy().to_string(),
        ]);

        args
    }
}

#[async_trait]
impl ImageEngine for CwebpProcessor {
    fn name(&self) -> &str {
        "cwebp"
    }

    async fn probe(&self, path: &Path) -> Result<Dimensions, ConvertError> {
        let image_path = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || -> image::ImageResult<(u32, u32)> {
            image::io::Reader::open(&image_path)?
                .with_guessed_format()?
                .into_dimensions()
        })
        .await?;

        let (width, height) = result.map_err(|e| ConvertError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Got dimensions {}x{} for {}", width, height, path.display());
        Ok(Dimensions { width, height })
    }

    async fn encode(&self, job: &EncodeJob) -> Result<(), ConvertError> {
        let args = self.build_args(job);
        debug!("Command: {:?} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ConvertError::Encode {
                path: job.input.clone(),
                reason: format!("failed to start {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(ConvertError::Encode {
                path: job.input.clone(),
                reason: if stderr.is_empty() {
                    format!("cwebp exited with {}", output.status)
                } else {
                    format!("cwebp exited with {}: {}", output.status, stderr)
                },
            });
        }

        Ok(())
    }

    async fn validate(&self) -> Result<(), ConvertError> {
        let program = self.program.to_string_lossy();
        if PlatformCommands::instance().is_command_available(&program).await {
            Ok(())
        } else {
            Err(ConvertError::MissingDependency(format!(
                "{} is required for WebP conversion. Please install the webp tools.",
                program
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn job(resize: Option<Dimensions>) -> EncodeJob {
        EncodeJob {
            input: PathBuf::from("/photos/a.png"),
            output: PathBuf::from("/photos/.a.webp.partial"),
            resize,
            quality: 72,
        }
    }

    #[test]
    fn test_build_args_without_resize() {
        let processor = CwebpProcessor::new("cwebp");
        let args = processor.build_args(&job(None));
        assert_eq!(
            args,
            vec![
                "-quiet",
                "-q",
                "72",
                "-m",
                "4",
                "-mt",
                "/photos/a.png",
                "-o",
                "/photos/.a.webp.partial"
            ]
        );
    }

    #[test]
    fn test_build_args_with_resize() {
        let processor = CwebpProcessor::new("cwebp");
        let args = processor.build_args(&job(Some(Dimensions { width: 1620, height: 1080 })));
        let resize_at = args.iter().position(|a| a == "-resize").unwrap();
        assert_eq!(args[resize_at + 1], "1620");
        assert_eq!(args[resize_at + 2], "1080");
        assert!(resize_at < args.iter().position(|a| a == "/photos/a.png").unwrap());
    }

    #[tokio::test]
    async fn test_probe_reads_png_dimensions() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.png");
        image::RgbImage::new(40, 20).save(&path).unwrap();

        let dims = CwebpProcessor::with_defaults().probe(&path).await.unwrap();
        assert_eq!(dims, Dimensions { width: 40, height: 20 });
    }

    #[tokio::test]
    async fn test_probe_sniffs_content_not_extension() {
        let temp_dir = TempDir::new().unwrap();
        let png = temp_dir.path().join("real.png");
        image::RgbImage::new(8, 6).save(&png).unwrap();
        let disguised = temp_dir.path().join("disguised.jpg");
        std::fs::copy(&png, &disguised).unwrap();

        let dims = CwebpProcessor::with_defaults().probe(&disguised).await.unwrap();
        assert_eq!(dims, Dimensions { width: 8, height: 6 });
    }

    #[tokio::test]
    async fn test_probe_corrupt_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.jpg");
        std::fs::write(&path, b"this is not an image").unwrap();

        let result = CwebpProcessor::with_defaults().probe(&path).await;
        assert!(matches!(result, Err(ConvertError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_validate_missing_binary() {
        let processor = CwebpProcessor::new("definitely-not-cwebp-9731");
        let result = processor.validate().await;
        assert!(matches!(result, Err(ConvertError::MissingDependency(_))));
    }

    #[tokio::test]
    async fn test_encode_missing_binary_is_encode_error() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("a.png");
        image::RgbImage::new(4, 4).save(&input).unwrap();

        let processor = CwebpProcessor::new(temp_dir.path().join("no-such-cwebp"));
        let result = processor
            .encode(&EncodeJob {
                input,
                output: temp_dir.path().join("a.webp"),
                resize: None,
                quality: 80,
            })
            .await;
        assert!(matches!(result, Err(ConvertError::Encode { .. })));
    }

    #[tokio::test]
    async fn test_encode_with_cwebp() {
        let processor = CwebpProcessor::with_defaults();
        if processor.validate().await.is_err() {
            // cwebp not installed, nothing to exercise
            return;
        }

        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("wide.png");
        image::RgbImage::from_pixel(64, 32, image::Rgb([200, 30, 30]))
            .save(&input)
            .unwrap();
        let output = temp_dir.path().join("wide.webp");

        processor
            .encode(&EncodeJob {
                input: input.clone(),
                output: output.clone(),
                resize: Some(Dimensions { width: 32, height: 16 }),
                quality: 80,
            })
            .await
            .unwrap();

        assert!(input.exists());
        let dims = processor.probe(&output).await.unwrap();
        assert_eq!(dims, Dimensions { width: 32, height: 16 });
    }
}
