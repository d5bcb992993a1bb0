use std::path::PathBuf;

use thiserror::Error;

/// Input problems worth telling apart from plain I/O failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data directory not found: {0}")]
    MissingDataDir(PathBuf),

    #[error("launch price table has no `model` column")]
    MissingModelColumn,

    #[error("unrecognized storage column in launch price table: {0:?}")]
    StorageHeader(String),
}
