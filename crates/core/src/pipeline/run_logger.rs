use std::collections::HashMap;
use std::time::Instant;

/// Observer for batch run events.
///
/// Use cases report through this port so the CLI can print progress and a
/// summary while tests stay silent.
pub trait RunLogger: Send {
    /// Report transcript-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took for one transcript.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. occurrences found per transcript).
    fn metric(&mut self, name: &str, value: f64);

    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Discards all events.
///
/// For tests, and for library callers that track progress themselves and
/// only want the use case's return value.
pub struct NullRunLogger;

impl RunLogger for NullRunLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// Logs throttled progress and keeps per-stage timings and metrics for a
/// closing summary.
pub struct StdoutRunLogger {
    throttle: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    processed: usize,
    messages: Vec<String>,
}

impl StdoutRunLogger {
    pub fn new(throttle: usize) -> Self {
        Self {
            throttle: throttle.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            processed: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary, or `None` if nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let processed = self.processed;
        let mut lines = vec![format!(
            "Run summary ({processed} transcripts, {:.1}s total):",
            elapsed_ms / 1000.0
        )];

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = mean(durations);
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  (n={})",
                durations.len()
            ));
        }

        let mut names: Vec<_> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let values = &self.metrics[name];
            let sum: f64 = values.iter().sum();
            lines.push(format!("  {name}: avg {:.1}  sum {sum:.0}", mean(values)));
        }

        if processed > 0 && elapsed_ms > 0.0 {
            let rate = processed as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {rate:.1} transcripts/s"));
        }

        Some(lines.join("\n"))
    }

    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

impl Default for StdoutRunLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl RunLogger for StdoutRunLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.processed = current;
        if total > 0 && (current % self.throttle == 0 || current == total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} transcripts ({pct:.1}%)");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_string()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_accepts_everything() {
        let mut logger = NullRunLogger;
        logger.progress(1, 10);
        logger.timing("resolve", 5.0);
        logger.metric("occurrences", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutRunLogger::new(10);
        logger.timing("resolve", 20.0);
        logger.timing("resolve", 30.0);
        logger.timing("write", 5.0);

        assert_eq!(logger.timings_for("resolve"), Some(&[20.0, 30.0][..]));
        assert_eq!(logger.timings_for("write"), Some(&[5.0][..]));
        assert!(logger.timings_for("count").is_none());
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutRunLogger::new(10);
        logger.progress(4, 4);
        logger.timing("resolve", 20.0);
        logger.timing("write", 5.0);
        logger.metric("occurrences", 3.0);
        logger.metric("occurrences", 4.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Run summary (4 transcripts"));
        assert!(summary.contains("resolve"));
        assert!(summary.contains("write"));
        assert!(summary.contains("occurrences: avg 3.5  sum 7"));
        assert!(summary.contains("transcripts/s"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(StdoutRunLogger::new(10).summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_processed_count() {
        let mut logger = StdoutRunLogger::new(10);
        for i in 1..=25 {
            logger.progress(i, 25);
        }
        assert_eq!(logger.processed, 25);
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutRunLogger::default();
        logger.info("Skipping 3 transcripts already checkpointed");
        assert_eq!(logger.messages, vec!["Skipping 3 transcripts already checkpointed"]);
        assert_eq!(logger.throttle, 100);
    }
}
