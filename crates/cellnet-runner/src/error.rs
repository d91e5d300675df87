//! Error types for the planning orchestrator.

use cellnet_link::LinkError;
use cellnet_model::{ModelError, RepositoryError};
use cellnet_radio::RadioError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, planning or writing results.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Scenario loading or validation failed.
    #[error("Scenario error: {0}")]
    Model(#[from] ModelError),

    /// Repository access failed outside a pipeline.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Topology synthesis or clearance adjustment failed.
    #[error("Link planning error: {0}")]
    Link(#[from] LinkError),

    /// Radio planning failed.
    #[error("Radio planning error: {0}")]
    Radio(#[from] RadioError),

    /// Reading or writing a file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// YAML encoding failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
