use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not encode high scores: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("no data directory available")]
    NoDataDir,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
