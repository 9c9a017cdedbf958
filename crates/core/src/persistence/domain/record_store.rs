use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt record file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize records: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Durable home of a checkpoint: the full record set, replaced as a whole.
///
/// `replace` must leave either the previous set or the new one in place,
/// never a truncated mix.
pub trait RecordStore<T>: Send {
    /// All persisted records. A store that was never written is empty.
    fn load(&self) -> Result<Vec<T>, StoreError>;

    fn replace(&self, records: &[T]) -> Result<(), StoreError>;
}
