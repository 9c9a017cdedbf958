use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::pipeline::batch_executor::{BatchExecutor, Processed, ResultSink};
use crate::shared::transcript::Transcript;

/// Processes transcripts one by one on the calling thread, in input order.
#[derive(Default)]
pub struct SequentialBatchExecutor;

impl SequentialBatchExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl<R: Send> BatchExecutor<R> for SequentialBatchExecutor {
    fn execute(
        &self,
        transcripts: Vec<Transcript>,
        process: &(dyn Fn(&Transcript) -> R + Sync),
        sink: &mut ResultSink<'_, R>,
        cancelled: &AtomicBool,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let mut delivered = 0;
        for transcript in transcripts {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            let start = Instant::now();
            let output = process(&transcript);
            sink(Processed {
                elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
                transcript,
                output,
            })?;
            delivered += 1;
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(n: usize) -> Vec<Transcript> {
        (0..n)
            .map(|i| Transcript::new(format!("f{i}.mp4"), "le chat"))
            .collect()
    }

    #[test]
    fn test_preserves_input_order() {
        let cancelled = AtomicBool::new(false);
        let mut seen = Vec::new();
        let delivered = SequentialBatchExecutor::new()
            .execute(
                batch(5),
                &|t: &Transcript| t.file.len(),
                &mut |p: Processed<usize>| {
                    seen.push(p.transcript.file);
                    Ok(())
                },
                &cancelled,
            )
            .unwrap();
        assert_eq!(delivered, 5);
        assert_eq!(seen, vec!["f0.mp4", "f1.mp4", "f2.mp4", "f3.mp4", "f4.mp4"]);
    }

    #[test]
    fn test_sink_error_stops_batch() {
        let cancelled = AtomicBool::new(false);
        let mut calls = 0;
        let result = SequentialBatchExecutor::new().execute(
            batch(5),
            &|_: &Transcript| (),
            &mut |_: Processed<()>| {
                calls += 1;
                if calls == 2 {
                    Err("disk full".into())
                } else {
                    Ok(())
                }
            },
            &cancelled,
        );
        assert_eq!(result.unwrap_err().to_string(), "disk full");
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_cancelled_before_start_delivers_nothing() {
        let cancelled = AtomicBool::new(true);
        let delivered = SequentialBatchExecutor::new()
            .execute(
                batch(3),
                &|_: &Transcript| (),
                &mut |_: Processed<()>| Ok(()),
                &cancelled,
            )
            .unwrap();
        assert_eq!(delivered, 0);
    }
}
