use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::corpus::domain::corpus_aggregator::CorpusAggregator;
use crate::corpus::domain::keyword_counts::{KeywordCounts, TranscriptCounts};
use crate::persistence::domain::checkpoint_writer::CheckpointWriter;
use crate::shared::transcript::Transcript;

use super::batch_executor::{pending_transcripts, BatchExecutor, Processed};
use super::run_logger::RunLogger;
use super::run_report::RunReport;

/// Corpus mode: sums per-keyword match counts over the whole collection.
///
/// Each transcript's contribution is checkpointed, and the result is the sum
/// of every persisted contribution plus this run's. An interrupted run
/// followed by a resumed one therefore yields the same counts as a single
/// uninterrupted run.
pub struct CountCorpusUseCase {
    aggregator: CorpusAggregator,
    checkpoint: CheckpointWriter<TranscriptCounts>,
    executor: Box<dyn BatchExecutor<TranscriptCounts>>,
    logger: Box<dyn RunLogger>,
    cancelled: Arc<AtomicBool>,
}

impl CountCorpusUseCase {
    pub fn new(
        aggregator: CorpusAggregator,
        checkpoint: CheckpointWriter<TranscriptCounts>,
        executor: Box<dyn BatchExecutor<TranscriptCounts>>,
        logger: Box<dyn RunLogger>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            aggregator,
            checkpoint,
            executor,
            logger,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(
        &mut self,
        transcripts: Vec<Transcript>,
    ) -> Result<(KeywordCounts, RunReport), Box<dyn std::error::Error>> {
        let Self {
            aggregator,
            checkpoint,
            executor,
            logger,
            cancelled,
        } = self;

        let mut totals = aggregator.zeroed();
        let persisted = checkpoint.persisted()?;
        for contribution in &persisted {
            totals.absorb(contribution);
        }
        let completed = persisted.into_iter().map(|c| c.file).collect();

        let total = transcripts.len();
        let (pending, skipped) = pending_transcripts(transcripts, completed);
        if skipped > 0 {
            logger.info(&format!("Resuming: {skipped} transcripts already counted"));
        }

        let to_process = pending.len();
        let mut processed = 0;

        let run = executor.execute(
            pending,
            &|transcript: &Transcript| aggregator.count_transcript(transcript),
            &mut |done: Processed<TranscriptCounts>| {
                processed += 1;
                logger.timing("count", done.elapsed_ms);
                logger.metric("matches", done.output.counts.values().sum::<usize>() as f64);
                totals.absorb(&done.output);
                checkpoint.push(done.output)?;
                logger.progress(processed, to_process);
                Ok(())
            },
            cancelled,
        );

        let finished = checkpoint.finish();
        run?;
        finished?;

        logger.summary();
        let report = RunReport {
            total,
            skipped,
            processed,
            failed: 0,
        };
        Ok((totals, report))
    }
}
