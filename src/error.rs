use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TakeoutError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum TakeoutError {
    /// the root is neither a readable zip container nor a directory
    #[error("invalid takeout at {path}: expected a zip file or a directory ({reason})")]
    InvalidArchive { path: PathBuf, reason: String },

    #[error("couldn't find Semantic Location History at {0}")]
    MissingDataDirectory(String),

    /// a period file is not JSON, lacks `timelineObjects`, or holds a badly typed field
    #[error("malformed history file {file}: {reason}")]
    MalformedFile { file: String, reason: String },

    #[error("don't know how to parse record {index} in {file} (keys: {keys:?})")]
    UnrecognizedRecord {
        file: String,
        index: usize,
        keys: Vec<String>,
    },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("takeout parsing cancelled after {files_done} files")]
    Cancelled { files_done: usize },
}

impl TakeoutError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        TakeoutError::Io {
            path: path.into(),
            source,
        }
    }
}
