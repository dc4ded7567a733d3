//! Error types for loading hits, writing triplets and running the pipeline.
//!
//! Only conditions that stop a run are represented here. Malformed input rows
//! are values of [`crate::data::hits::RowError`], counted and skipped by the loader.

use std::path::PathBuf;
use thiserror::Error;

pub type TrackResult<T> = Result<T, TrackError>;

#[derive(Debug, Error)]
pub enum TrackError {
    /// A file could not be opened, created or flushed.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input held no valid hit, there is nothing to search.
    #[error("No valid hits could be read from {path:?}")]
    EmptyDataset { path: PathBuf },

    #[error("CSV error on {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error on {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl TrackError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackError::Io { path: path.into(), source }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        TrackError::Csv { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        TrackError::Json { path: path.into(), source }
    }
}

/// Rejected pipeline configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid base layer range: first {first} > last {last}")]
    LayerRange { first: i32, last: i32 },

    #[error("Base layer {last} leaves no room for the two layers above it")]
    LayerOverflow { last: i32 },

    #[error("Threshold `{name}` must be a finite non-negative number, got {value}")]
    Threshold { name: &'static str, value: f64 },

    #[error("Thread count must be at least 1")]
    Threads,

    #[error("Input and output refer to the same file: {0:?}")]
    SamePath(PathBuf),
}
