use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;

use crate::matching::domain::occurrence::FileOccurrences;
use crate::matching::domain::occurrence_resolver::OccurrenceResolver;
use crate::persistence::domain::checkpoint_writer::CheckpointWriter;
use crate::persistence::domain::document_writer::DocumentWriter;
use crate::shared::transcript::Transcript;

use super::batch_executor::{pending_transcripts, BatchExecutor, Processed};
use super::run_logger::RunLogger;
use super::run_report::RunReport;

/// Per-file mode: resolves keyword occurrences for every transcript, writes
/// one result document per transcript and checkpoints what was written.
///
/// Transcripts already in the checkpoint are skipped, so re-running after an
/// interruption only processes the remainder.
pub struct SpotOccurrencesUseCase {
    resolver: OccurrenceResolver,
    writer: Box<dyn DocumentWriter<FileOccurrences>>,
    checkpoint: CheckpointWriter<FileOccurrences>,
    executor: Box<dyn BatchExecutor<FileOccurrences>>,
    logger: Box<dyn RunLogger>,
    cancelled: Arc<AtomicBool>,
}

impl SpotOccurrencesUseCase {
    pub fn new(
        resolver: OccurrenceResolver,
        writer: Box<dyn DocumentWriter<FileOccurrences>>,
        checkpoint: CheckpointWriter<FileOccurrences>,
        executor: Box<dyn BatchExecutor<FileOccurrences>>,
        logger: Box<dyn RunLogger>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            resolver,
            writer,
            checkpoint,
            executor,
            logger,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        transcripts: Vec<Transcript>,
    ) -> Result<RunReport, Box<dyn std::error::Error>> {
        let Self {
            resolver,
            writer,
            checkpoint,
            executor,
            logger,
            cancelled,
        } = self;

        let total = transcripts.len();
        let (pending, skipped) = pending_transcripts(transcripts, checkpoint.completed_ids()?);
        if skipped > 0 {
            logger.info(&format!("Skipping {skipped} transcripts already processed"));
        }

        let to_process = pending.len();
        let mut processed = 0;
        let mut failed = 0;
        let mut seen = 0;

        let run = executor.execute(
            pending,
            &|transcript: &Transcript| resolver.resolve(transcript),
            &mut |done: Processed<FileOccurrences>| {
                seen += 1;
                logger.timing("resolve", done.elapsed_ms);
                logger.metric("occurrences", done.output.occurrences.len() as f64);

                let start = Instant::now();
                match writer.write(&done.output) {
                    Ok(path) => {
                        log::debug!("Wrote {} to {}", done.output.file, path.display());
                        checkpoint.push(done.output)?;
                        processed += 1;
                    }
                    Err(e) => {
                        log::error!("Skipping {}: {e}", done.output.file);
                        failed += 1;
                    }
                }
                logger.timing("write", start.elapsed().as_secs_f64() * 1000.0);
                logger.progress(seen, to_process);
                Ok(())
            },
            cancelled,
        );

        // Whatever reached the buffer is durable work; keep it even if the
        // batch stopped on an error.
        let finished = checkpoint.finish();
        run?;
        finished?;

        logger.summary();
        Ok(RunReport {
            total,
            skipped,
            processed,
            failed,
        })
    }
}
