use std::collections::HashSet;

use thiserror::Error;

use super::checkpoint_record::CheckpointRecord;
use super::record_store::{RecordStore, StoreError};

#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("failed to read checkpoint: {0}")]
    Load(#[source] StoreError),
    #[error("checkpoint flush failed after {attempts} attempts, {pending} results kept in memory: {source}")]
    Flush {
        attempts: usize,
        pending: usize,
        #[source]
        source: StoreError,
    },
}

/// Buffers per-transcript results and periodically merges them into a store.
///
/// Every flush re-reads the persisted records, appends the buffer and
/// replaces the whole set. The buffer is only cleared once the store has
/// accepted the combined set, so a failed flush loses nothing in memory and
/// a crash loses at most the unflushed buffer.
pub struct CheckpointWriter<T: CheckpointRecord> {
    store: Box<dyn RecordStore<T>>,
    buffer: Vec<T>,
    flush_every: usize,
    max_retries: usize,
}

impl<T: CheckpointRecord> CheckpointWriter<T> {
    pub fn new(store: Box<dyn RecordStore<T>>, flush_every: usize, max_retries: usize) -> Self {
        Self {
            store,
            buffer: Vec::new(),
            flush_every: flush_every.max(1),
            max_retries,
        }
    }

    /// Records already durable in the store.
    pub fn persisted(&self) -> Result<Vec<T>, CheckpointError> {
        self.store.load().map_err(CheckpointError::Load)
    }

    /// Identifiers of transcripts a previous run already completed.
    pub fn completed_ids(&self) -> Result<HashSet<String>, CheckpointError> {
        Ok(self
            .persisted()?
            .iter()
            .map(|r| r.record_id().to_string())
            .collect())
    }

    #[cfg(test)]
    fn pending(&self) -> &[T] {
        &self.buffer
    }

    /// Buffers `record`, flushing once `flush_every` results are pending.
    pub fn push(&mut self, record: T) -> Result<(), CheckpointError> {
        self.buffer.push(record);
        if self.buffer.len() >= self.flush_every {
            self.flush()?;
        }
        Ok(())
    }

    /// Merges the buffer into the store, retrying up to `max_retries` times.
    pub fn flush(&mut self) -> Result<(), CheckpointError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let attempts = self.max_retries + 1;
        let mut attempt = 1;
        loop {
            match self.merge_buffer() {
                Ok(total) => {
                    log::debug!(
                        "Checkpoint flushed {} results ({total} persisted)",
                        self.buffer.len()
                    );
                    self.buffer.clear();
                    return Ok(());
                }
                Err(e) if attempt < attempts => {
                    log::warn!("Checkpoint flush attempt {attempt}/{attempts} failed: {e}");
                    attempt += 1;
                }
                Err(e) => {
                    return Err(CheckpointError::Flush {
                        attempts,
                        pending: self.buffer.len(),
                        source: e,
                    });
                }
            }
        }
    }

    /// Flushes whatever is left at the end of a run.
    pub fn finish(&mut self) -> Result<(), CheckpointError> {
        self.flush()
    }

    fn merge_buffer(&self) -> Result<usize, StoreError> {
        let mut combined = self.store.load()?;
        combined.extend(self.buffer.iter().cloned());
        self.store.replace(&combined)?;
        Ok(combined.len())
    }
}
