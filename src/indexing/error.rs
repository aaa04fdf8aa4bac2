use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Watched directory {path} does not exist")]
    RootMissing { path: PathBuf },

    #[error("Watched path {path} is not a directory")]
    RootNotDirectory { path: PathBuf },

    #[error("Cannot resolve watched directory {path}: {source}")]
    RootUnresolvable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory listing task failed: {0}")]
    ListingFailed(String),
}

pub type IndexResult<T> = Result<T, IndexError>;
