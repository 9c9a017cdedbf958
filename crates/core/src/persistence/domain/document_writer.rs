use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize document for {file}: {source}")]
    Serialize {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Domain interface for writing one document per transcript.
///
/// Returns the path the document landed at.
pub trait DocumentWriter<T>: Send {
    fn write(&self, document: &T) -> Result<PathBuf, OutputError>;
}
