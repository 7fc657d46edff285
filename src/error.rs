use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for corpus loading, configuration, training and lookups.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("token: {0} is not in the vocabulary")]
    OutOfVocabulary(String),
    #[error("no token in the corpus appears at least {min_count} times")]
    EmptyVocabulary { min_count: usize },
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
