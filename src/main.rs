//! # WebP Converter - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing dell'unico argomento (qualità) con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Creazione della configurazione e avvio della pipeline
//! - Exit code: 0 dopo il riepilogo, 1 su errore fatale
//!
//! ## Flusso di esecuzione:
//! 1. Parsa l'argomento qualità (default 80 con warning se assente o invalido)
//! 2. Configura il logging (INFO, sovrascrivibile con `RUST_LOG`)
//! 3. Usa la directory corrente come radice
//! 4. Converte tutte le immagini PNG/JPEG in WebP, rimuovendo gli originali
//!
//! ## Esempio di utilizzo:
//! ```bash
//! cd my-project && webp-converter 75
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use webp_converter::{
    resolve_quality, Config, ConversionStats, CwebpProcessor, ProgressLogWriter, TranscodePipeline,
};

#[derive(Parser)]
#[command(name = "webp-converter")]
#[command(about = "Convert PNG and JPEG images under the current directory to WebP, replacing the originals")]
struct Args {
    /// WebP quality (0-100, default 80)
    #[arg(allow_hyphen_values = true)]
    quality: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(ProgressLogWriter)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let quality = resolve_quality(args.quality.as_deref());
    if let Some(ref warning) = quality.warning {
        warn!("⚠️ {}, using quality {}", warning, quality.value);
    }

    match run(quality.value).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ Error processing files: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(quality: u8) -> Result<ConversionStats> {
    let root_dir = std::env::current_dir().context("Failed to determine the current directory")?;

    let config = Config {
        root_dir,
        quality,
        show_progress: std::io::stderr().is_terminal(),
        ..Default::default()
    };

    let pipeline = TranscodePipeline::new(config, Arc::new(CwebpProcessor::with_defaults()))?;
    Ok(pipeline.run().await?)
}
