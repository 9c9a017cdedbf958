use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use crate::shared::transcript::Transcript;

/// A transcript together with what was computed from it.
pub struct Processed<R> {
    pub transcript: Transcript,
    pub output: R,
    pub elapsed_ms: f64,
}

/// Receives processed transcripts on the calling thread.
pub type ResultSink<'a, R> =
    dyn FnMut(Processed<R>) -> Result<(), Box<dyn std::error::Error>> + 'a;

/// Abstracts how a batch of transcripts is fanned out to `process`.
///
/// This is a port. Implementations may run `process` on any thread, but
/// `sink` is always called from the thread that called `execute`, one
/// result at a time, so it can own single-writer state such as a checkpoint.
/// Result order is unspecified.
///
/// Returns how many results reached the sink. A sink error stops the batch
/// and is returned; setting `cancelled` stops it quietly.
pub trait BatchExecutor<R: Send>: Send {
    fn execute(
        &self,
        transcripts: Vec<Transcript>,
        process: &(dyn Fn(&Transcript) -> R + Sync),
        sink: &mut ResultSink<'_, R>,
        cancelled: &AtomicBool,
    ) -> Result<usize, Box<dyn std::error::Error>>;
}

/// Drops transcripts whose file is in `completed` or already seen earlier in
/// the batch. Returns the remaining transcripts and how many were dropped.
pub fn pending_transcripts(
    transcripts: Vec<Transcript>,
    mut completed: HashSet<String>,
) -> (Vec<Transcript>, usize) {
    let total = transcripts.len();
    let pending: Vec<_> = transcripts
        .into_iter()
        .filter(|t| completed.insert(t.file.clone()))
        .collect();
    let skipped = total - pending.len();
    (pending, skipped)
}
