use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::persistence::domain::checkpoint_record::CheckpointRecord;
use crate::persistence::domain::document_writer::{DocumentWriter, OutputError};
use crate::persistence::domain::output_layout::OutputLayout;

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Writes each document as JSON under a directory tree mirroring the
/// transcript's source path.
///
/// Existing files are never overwritten: when the candidate name is taken,
/// the next attempt of [`OutputLayout::path_for`] is tried.
pub struct MirroredJsonWriter {
    layout: OutputLayout,
    fixed_timestamp: Option<u64>,
}

impl MirroredJsonWriter {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            fixed_timestamp: None,
        }
    }

    /// Pins the timestamp used in file names.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.fixed_timestamp = Some(timestamp);
        self
    }

    fn timestamp(&self) -> u64 {
        self.fixed_timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        })
    }
}

impl<T: CheckpointRecord> DocumentWriter<T> for MirroredJsonWriter {
    fn write(&self, document: &T) -> Result<PathBuf, OutputError> {
        let source = document.record_id();
        let dir = self.layout.directory_for(source);
        fs::create_dir_all(&dir).map_err(|e| OutputError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;

        let json = serde_json::to_vec(document).map_err(|e| OutputError::Serialize {
            file: source.to_string(),
            source: e,
        })?;

        let timestamp = self.timestamp();
        let mut attempt = 0;
        loop {
            let path = self.layout.path_for(source, timestamp, attempt);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(&json).map_err(|e| OutputError::Write {
                        path: path.clone(),
                        source: e,
                    })?;
                    return Ok(path);
                }
                Err(e)
                    if e.kind() == ErrorKind::AlreadyExists && attempt + 1 < MAX_NAME_ATTEMPTS =>
                {
                    log::debug!("{} exists, trying next name", path.display());
                    attempt += 1;
                }
                Err(e) => return Err(OutputError::Write { path, source: e }),
            }
        }
    }
}
