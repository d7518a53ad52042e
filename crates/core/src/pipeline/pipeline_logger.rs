use std::collections::HashMap;
use std::time::Instant;

use crate::classification::domain::interpreter::Classification;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the cycle loop from specific output mechanisms (stdout, log
/// crate, test capture) so callers can observe pipeline behavior without
/// changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Record that a cycle completed for the given source frame.
    fn cycle(&mut self, frame_index: u64);

    /// Record how long a named pipeline stage took for one cycle.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record the classification published this cycle.
    fn reading(&mut self, result: &Classification);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
///
/// Used by tests and by embedders that observe the pipeline through
/// [`SharedReading`](crate::pipeline::reading::SharedReading) instead.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn cycle(&mut self, _frame_index: u64) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn reading(&mut self, _result: &Classification) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and classification
/// activity, and provides a summary report when the run ends.
///
/// Per-cycle output is throttled to every `throttle_cycles` cycles to avoid
/// flooding stdout at frame rate.
pub struct StdoutPipelineLogger {
    throttle_cycles: u64,
    timings: HashMap<String, Vec<f64>>,
    start_time: Instant,
    cycles: u64,
    readings: u64,
    last_reading: Option<Classification>,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_cycles: u64) -> Self {
        Self {
            throttle_cycles: throttle_cycles.max(1),
            timings: HashMap::new(),
            start_time: Instant::now(),
            cycles: 0,
            readings: 0,
            last_reading: None,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no cycles ran.
    pub fn summary_string(&self) -> Option<String> {
        if self.cycles == 0 && self.timings.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let cycles = self.cycles;
        let mut lines = Vec::new();

        lines.push(format!(
            "Pipeline summary ({cycles} cycles, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        match &self.last_reading {
            Some(reading) => lines.push(format!(
                "  Readings: {} (last: {} {:.1}%)",
                self.readings,
                reading.label,
                reading.confidence * 100.0
            )),
            None => lines.push("  Readings: none".to_string()),
        }

        if cycles > 0 && elapsed_ms > 0.0 {
            let fps = cycles as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} cycles/s"));
        }

        Some(lines.join("\n"))
    }

    /// Returns the timing data for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    pub fn readings(&self) -> u64 {
        self.readings
    }

    pub fn last_reading(&self) -> Option<&Classification> {
        self.last_reading.as_ref()
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn cycle(&mut self, frame_index: u64) {
        self.cycles += 1;
        if self.cycles % self.throttle_cycles == 0 {
            log::info!("Processed {} cycles (frame {frame_index})", self.cycles);
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn reading(&mut self, result: &Classification) {
        self.readings += 1;
        if self.readings % self.throttle_cycles == 0 {
            log::info!("{} {:.1}%", result.label, result.confidence * 100.0);
        }
        self.last_reading = Some(result.clone());
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

    fn reading(label: &str, confidence: f32) -> Classification {
        Classification {
            label: label.into(),
            confidence,
        }
    }

    // --- NullPipelineLogger tests ---

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.cycle(1);
        logger.timing("detect", 5.0);
        logger.reading(&reading("happy", 0.9));
        logger.info("hello");
        logger.summary();
        // No panics = success
    }

    // --- StdoutPipelineLogger tests ---

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("infer", 5.0);

        let detect = logger.timings_for("detect").unwrap();
        assert_eq!(detect.len(), 2);
        assert!((detect[0] - 20.0).abs() < f64::EPSILON);
        assert!((detect[1] - 30.0).abs() < f64::EPSILON);

        let infer = logger.timings_for("infer").unwrap();
        assert_eq!(infer.len(), 1);
    }

    #[test]
    fn test_reading_keeps_count_and_latest() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.reading(&reading("happy", 0.9));
        logger.reading(&reading("sad", 0.3));

        assert_eq!(logger.readings(), 2);
        assert_eq!(logger.last_reading().unwrap().label, "sad");
    }

    #[test]
    fn test_summary_includes_stages_and_readings() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.cycle(0);
        logger.timing("detect", 20.0);
        logger.timing("infer", 5.0);
        logger.reading(&reading("happy", 0.659));

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Pipeline summary"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("infer"));
        assert!(summary.contains("happy 65.9%"));
    }

    #[test]
    fn test_summary_without_readings_says_none() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.cycle(0);
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("Readings: none"));
    }

    #[test]
    fn test_summary_includes_throughput() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 0..100 {
            logger.cycle(i);
        }
        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("cycles/s"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_cycles_counted() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=20 {
            logger.cycle(i);
        }
        assert_eq!(logger.cycles, 20);
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.info("pipeline ready");
        assert_eq!(logger.messages.len(), 1);
        assert_eq!(logger.messages[0], "pipeline ready");
    }

    #[test]
    fn test_throttle_floor_is_one() {
        let logger = StdoutPipelineLogger::new(0);
        assert_eq!(logger.throttle_cycles, 1);
    }

    #[test]
    fn test_default_throttle() {
        let logger = StdoutPipelineLogger::default();
        assert_eq!(logger.throttle_cycles, 30);
    }
}
