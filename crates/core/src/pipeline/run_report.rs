use std::fmt;

/// Outcome of a batch run over a transcript collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Transcripts in the input.
    pub total: usize,
    /// Already checkpointed by an earlier run, or repeated in the input.
    pub skipped: usize,
    /// Processed and recorded in this run.
    pub processed: usize,
    /// Processed but not written; retried by the next run.
    pub failed: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} transcripts: {} processed, {} skipped, {} failed",
            self.total, self.processed, self.skipped, self.failed
        )
    }
}
