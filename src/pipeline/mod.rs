//! # Pipeline Module
//!
//! Pipeline di transcodifica suddivisa in sottomoduli:
//! - `transcode_pipeline`: Orchestratore (enumerazione, worker, riepilogo)
//! - `file_task`: Macchina a stati per singolo file
//! - `path_resolver`: Calcolo dei path di output e dei file parziali

pub mod file_task;
pub mod path_resolver;
pub mod transcode_pipeline;

pub use file_task::{ConversionOutcome, FailureStage, FileTask};
pub use path_resolver::PathResolver;
pub use transcode_pipeline::TranscodePipeline;
