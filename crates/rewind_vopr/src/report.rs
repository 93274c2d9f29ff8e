//! Run reports.

use crate::backend::Execution;
use crate::error::Result;
use crate::harness::Case;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Summary of one passing iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Iteration index.
    pub iteration: u64,
    /// Steps the program took.
    pub steps: u64,
    /// Faults the program raised.
    pub faults: u64,
    /// Nesting depth of the tree.
    pub depth: usize,
    /// Execution wall time.
    pub elapsed: Duration,
}

impl IterationRecord {
    /// Summarizes an executed case.
    #[must_use]
    pub fn new(case: &Case, execution: &Execution) -> Self {
        Self {
            iteration: case.iteration,
            steps: case.oracle.steps,
            faults: case.oracle.faults,
            depth: case.program.root.depth(),
            elapsed: execution.elapsed,
        }
    }
}

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// JSON (default).
    #[default]
    Json,
    /// YAML.
    Yaml,
}

/// Aggregated results of a run.
///
/// Only totals are kept, so an unbounded run does not grow memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Run seed.
    pub seed: u64,
    /// Backend name.
    pub backend: String,
    /// Iterations that passed.
    pub iterations: u64,
    /// Steps across all iterations.
    pub total_steps: u64,
    /// Faults across all iterations.
    pub total_faults: u64,
    /// Largest step count of a single program.
    pub max_steps: u64,
    /// Deepest tree seen.
    pub max_depth: usize,
    /// Wall time of the run in milliseconds.
    pub elapsed_ms: u64,
}

impl CampaignReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new(seed: u64, backend: &str) -> Self {
        Self {
            seed,
            backend: backend.to_string(),
            ..Self::default()
        }
    }

    /// Adds a passing iteration.
    pub fn record(&mut self, record: &IterationRecord) {
        self.iterations += 1;
        self.total_steps += record.steps;
        self.total_faults += record.faults;
        self.max_steps = self.max_steps.max(record.steps);
        self.max_depth = self.max_depth.max(record.depth);
    }

    /// Records the total run time.
    pub fn finish(&mut self, elapsed: Duration) {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    /// Renders the report.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Json => serde_json::to_string_pretty(self)?,
            ReportFormat::Yaml => serde_yaml::to_string(self)?,
        })
    }
}

impl fmt::Display for CampaignReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[PASS] seed {} on {}", self.seed, self.backend)?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Steps:      {} (max {})", self.total_steps, self.max_steps)?;
        writeln!(f, "Faults:     {}", self.total_faults)?;
        writeln!(f, "Max depth:  {}", self.max_depth)?;
        write!(f, "Elapsed:    {}ms", self.elapsed_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(iteration: u64, steps: u64, depth: usize) -> IterationRecord {
        IterationRecord {
            iteration,
            steps,
            faults: 1,
            depth,
            elapsed: Duration::from_millis(1),
        }
    }

    #[test]
    fn report_aggregates_totals() {
        let mut report = CampaignReport::new(42, "interpret");
        report.record(&record(0, 10, 3));
        report.record(&record(1, 4, 6));
        report.finish(Duration::from_millis(25));

        assert_eq!(report.iterations, 2);
        assert_eq!(report.total_steps, 14);
        assert_eq!(report.total_faults, 2);
        assert_eq!(report.max_steps, 10);
        assert_eq!(report.max_depth, 6);
        assert_eq!(report.elapsed_ms, 25);
    }

    #[test]
    fn report_display() {
        let report = CampaignReport::new(7, "go");
        let text = report.to_string();
        assert!(text.contains("PASS"));
        assert!(text.contains("seed 7 on go"));
    }

    #[test]
    fn report_renders_both_formats() {
        let report = CampaignReport::new(1, "interpret");
        assert!(report
            .render(ReportFormat::Json)
            .unwrap()
            .contains("\"seed\": 1"));
        assert!(report.render(ReportFormat::Yaml).unwrap().contains("seed: 1"));
    }
}
