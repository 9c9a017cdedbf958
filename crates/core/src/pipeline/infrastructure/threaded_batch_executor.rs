use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use crate::pipeline::batch_executor::{BatchExecutor, Processed, ResultSink};
use crate::shared::transcript::Transcript;

const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Processes transcripts on a pool of worker threads.
///
/// Layout: `feeder → workers [process] → caller [sink]`
///
/// The calling thread is the only consumer of results, so everything the
/// sink touches stays single-threaded.
pub struct ThreadedBatchExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedBatchExecutor {
    /// A pool of `workers` threads, or one per available core when `None`.
    pub fn new(workers: Option<usize>) -> Self {
        let workers = workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedBatchExecutor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<R: Send> BatchExecutor<R> for ThreadedBatchExecutor {
    fn execute(
        &self,
        transcripts: Vec<Transcript>,
        process: &(dyn Fn(&Transcript) -> R + Sync),
        sink: &mut ResultSink<'_, R>,
        cancelled: &AtomicBool,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let workers = self.workers.min(transcripts.len()).max(1);
        let cap = self.channel_capacity;
        let stop = AtomicBool::new(false);
        let stop = &stop;

        thread::scope(|scope| {
            let (job_tx, job_rx) = crossbeam_channel::bounded::<Transcript>(cap);
            let (result_tx, result_rx) = crossbeam_channel::bounded::<Processed<R>>(cap);

            let feeder = scope.spawn(move || {
                for transcript in transcripts {
                    if stop.load(Ordering::Relaxed) || cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    if job_tx.send(transcript).is_err() {
                        break;
                    }
                }
            });

            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    let job_rx = job_rx.clone();
                    let result_tx = result_tx.clone();
                    scope.spawn(move || {
                        for transcript in job_rx {
                            if stop.load(Ordering::Relaxed) {
                                break;
                            }
                            let start = Instant::now();
                            let output = process(&transcript);
                            let done = Processed {
                                elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
                                transcript,
                                output,
                            };
                            if result_tx.send(done).is_err() {
                                break;
                            }
                        }
                    })
                })
                .collect();

            // Workers hold the only remaining endpoints, so the result
            // stream ends once every worker has exited.
            drop(job_rx);
            drop(result_tx);

            let mut delivered = 0;
            let mut first_error: Option<Box<dyn std::error::Error>> = None;
            for done in result_rx.iter() {
                if cancelled.load(Ordering::Relaxed) {
                    break;
                }
                if let Err(e) = sink(done) {
                    first_error = Some(e);
                    break;
                }
                delivered += 1;
            }

            stop.store(true, Ordering::Relaxed);
            // Unblocks workers waiting on a full result channel
            drop(result_rx);

            if feeder.join().is_err() && first_error.is_none() {
                first_error = Some("Feeder thread panicked".into());
            }
            for handle in handles {
                if handle.join().is_err() && first_error.is_none() {
                    first_error = Some("Worker thread panicked".into());
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(delivered),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn batch(n: usize) -> Vec<Transcript> {
        (0..n)
            .map(|i| Transcript::new(format!("f{i}.mp4"), "le chat ".repeat(i % 7)))
            .collect()
    }

    #[rstest]
    #[case::single_worker(1, 10)]
    #[case::more_items_than_workers(4, 200)]
    #[case::more_workers_than_items(8, 3)]
    #[case::empty_batch(4, 0)]
    fn test_every_transcript_reaches_sink_once(#[case] workers: usize, #[case] n: usize) {
        let cancelled = AtomicBool::new(false);
        let mut seen = Vec::new();
        let delivered = ThreadedBatchExecutor::new(Some(workers))
            .execute(
                batch(n),
                &|t: &Transcript| t.text.len(),
                &mut |p: Processed<usize>| {
                    assert_eq!(p.output, p.transcript.text.len());
                    seen.push(p.transcript.file);
                    Ok(())
                },
                &cancelled,
            )
            .unwrap();

        assert_eq!(delivered, n);
        seen.sort();
        let mut expected: Vec<_> = batch(n).into_iter().map(|t| t.file).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_sink_error_stops_workers_and_is_returned() {
        let cancelled = AtomicBool::new(false);
        let mut calls = 0;
        let result = ThreadedBatchExecutor::new(Some(4)).execute(
            batch(500),
            &|_: &Transcript| (),
            &mut |_: Processed<()>| {
                calls += 1;
                if calls == 3 {
                    Err("checkpoint unwritable".into())
                } else {
                    Ok(())
                }
            },
            &cancelled,
        );
        assert_eq!(result.unwrap_err().to_string(), "checkpoint unwritable");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_cancellation_stops_early() {
        let cancelled = AtomicBool::new(false);
        let delivered = ThreadedBatchExecutor::new(Some(2))
            .execute(
                batch(500),
                &|_: &Transcript| (),
                &mut |_: Processed<()>| {
                    cancelled.store(true, Ordering::Relaxed);
                    Ok(())
                },
                &cancelled,
            )
            .unwrap();
        assert_eq!(delivered, 1);
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let cancelled = AtomicBool::new(false);
        let result = ThreadedBatchExecutor::new(Some(2)).execute(
            batch(4),
            &|t: &Transcript| {
                if t.file == "f2.mp4" {
                    panic!("boom");
                }
            },
            &mut |_: Processed<()>| Ok(()),
            &cancelled,
        );
        assert_eq!(result.unwrap_err().to_string(), "Worker thread panicked");
    }

    #[test]
    fn test_default_uses_available_parallelism() {
        assert!(ThreadedBatchExecutor::default().workers() >= 1);
        assert_eq!(ThreadedBatchExecutor::new(Some(0)).workers(), 1);
    }
}
