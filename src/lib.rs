//! # WebP Converter Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//!
//! ## Architettura dei moduli:
//! - `config`: Configurazione immutabile e parsing dell'argomento qualità
//! - `error`: Tipi di errore custom
//! - `file_manager`: Enumerazione ricorsiva dei file e utilità
//! - `resize`: Calcolo del resize bounding box
//! - `engine`: Trait del motore di decodifica/encoding
//! - `image_processor`: Motore di produzione basato su `cwebp`
//! - `platform`: Risoluzione dei tool esterni per piattaforma
//! - `pipeline`: Orchestratore e macchina a stati per file
//! - `progress`: Progress bar e statistiche
//!
//! ## Utilizzo:
//! ```ignore
//! use std::sync::Arc;
//! use webp_converter::{Config, CwebpProcessor, TranscodePipeline};
//!
//! let config = Config { root_dir: path, ..Default::default() };
//! let pipeline = TranscodePipeline::new(config, Arc::new(CwebpProcessor::with_defaults()))?;
//! let stats = pipeline.run().await?;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod pipeline;
pub mod platform;
pub mod progress;
pub mod resize;

pub use config::{resolve_quality, Config, QualityWarning, ResolvedQuality};
pub use engine::{Dimensions, EncodeJob, ImageEngine};
pub use error::ConvertError;
pub use file_manager::FileManager;
pub use image_processor::CwebpProcessor;
pub use pipeline::{ConversionOutcome, FailureStage, TranscodePipeline};
pub use progress::{ConversionStats, ProgressLogWriter};
