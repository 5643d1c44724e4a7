//! Error types for the training driver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading data, building the graph, or
/// running the optimization loop.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset on disk could not be read.
    #[error("dataset error: {0}")]
    Dataset(#[from] crate::io::Error),

    /// A tensor could not be built or an operation in the graph failed.
    #[error("tensor operation failed: {0}")]
    Tensor(#[from] candle_core::Error),

    /// The run configuration YAML could not be parsed or written.
    #[error("run configuration YAML error: {0}")]
    ConfigFile(#[from] serde_yaml::Error),

    /// The configuration values cannot drive a training run.
    #[error("invalid training configuration: {0}")]
    InvalidConfig(String),

    /// The dataset root contains no entries.
    #[error("no training examples found under {path}")]
    EmptyDataset {
        /// Dataset root that was searched.
        path: PathBuf,
    },

    /// A coordinate table carries a type id outside the vocabulary.
    #[error("unsupported point type {type_id} in a {table} coordinate table")]
    UnknownPointType {
        /// Which table family the row came from.
        table: &'static str,
        /// The offending type id.
        type_id: u8,
    },
}

impl Error {
    /// Creates an [`InvalidConfig`](Error::InvalidConfig) error.
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig(details.into())
    }
}
