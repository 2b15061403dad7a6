//! Library error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::chem::SmilesError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse SMILES on line {line} ({smiles:?}): {source}")]
    Smiles {
        line: usize,
        smiles: String,
        source: SmilesError,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("filename template {0:?} has no {{}} placeholder")]
    Template(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
