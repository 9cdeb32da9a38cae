//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom della libreria.
//!
//! ## Responsabilità:
//! - Definisce `ConvertError` enum per categorizzare tutti gli errori possibili
//! - Distingue errori fatali (enumerazione, dipendenze) da errori per-file
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `Enumeration`: Directory non leggibile (fatale per tutto il run)
//! - `Decode`: Immagine sorgente non leggibile (errore per-file)
//! - `Encode`: Encoder fallito o output non scrivibile (errore per-file)
//! - `Io`: Errori di I/O generici (rename, delete, metadata)
//! - `MissingDependency`: Tool esterno mancante (cwebp)
//! - `Validation`: Configurazione non valida
//! - `Task` / `WorkerPool`: Errori del pool di worker
//!
//! ## Esempio:
//! ```ignore
//! if !tool_exists {
//!     return Err(ConvertError::MissingDependency("cwebp".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for image conversion
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to list directory {}: {source}", path.display())]
    Enumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read image {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Failed to encode {}: {reason}", path.display())]
    Encode { path: PathBuf, reason: String },

    #[error("Dependency missing: {0}")]
    MissingDependency(String),

    #[error("Invalid configuration: {0}")]
    Validation(String),

    #[error("Conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Worker pool closed: {0}")]
    WorkerPool(#[from] tokio::sync::AcquireError),
}

impl ConvertError {
    /// Builds an enumeration error for the directory that failed to list.
    pub fn enumeration(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Enumeration {
            path: path.into(),
            source,
        }
    }
}
