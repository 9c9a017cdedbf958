use std::time::Instant;

use crate::persistence::domain::document_writer::DocumentWriter;
use crate::shared::transcript::Transcript;

use super::run_logger::RunLogger;
use super::run_report::RunReport;

/// Writes every transcript record of a collection as its own document.
///
/// A failed write is logged and counted; the remaining transcripts are still
/// written.
pub struct SplitTranscriptsUseCase {
    writer: Box<dyn DocumentWriter<Transcript>>,
    logger: Box<dyn RunLogger>,
}

impl SplitTranscriptsUseCase {
    pub fn new(writer: Box<dyn DocumentWriter<Transcript>>, logger: Box<dyn RunLogger>) -> Self {
        Self { writer, logger }
    }

    pub fn execute(
        &mut self,
        transcripts: &[Transcript],
    ) -> Result<RunReport, Box<dyn std::error::Error>> {
        let total = transcripts.len();
        let mut report = RunReport {
            total,
            ..RunReport::default()
        };

        for (i, transcript) in transcripts.iter().enumerate() {
            let start = Instant::now();
            match self.writer.write(transcript) {
                Ok(path) => {
                    log::debug!("Wrote {} to {}", transcript.file, path.display());
                    report.processed += 1;
                }
                Err(e) => {
                    log::error!("Skipping {}: {e}", transcript.file);
                    report.failed += 1;
                }
            }
            self.logger
                .timing("write", start.elapsed().as_secs_f64() * 1000.0);
            self.logger.progress(i + 1, total);
        }

        self.logger.summary();
        Ok(report)
    }
}
