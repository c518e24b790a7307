use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed high score file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine a data directory for the high score file")]
    NoDataDir,
}

pub type Result<T> = std::result::Result<T, Error>;
