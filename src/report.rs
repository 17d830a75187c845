//! # Final run statistics.
//!
//! [`RunReport`] is a pure aggregation of the roster after every worker has
//! been reaped: an ordered sequence of `(worker, final tally)` rows plus the
//! grand total. It has no effect on the protocol; building or printing it
//! cannot change what happened.
//!
//! The `Display` impl renders the classic summary table:
//!
//! ```text
//! No. | Worker    | Issues
//!   1 | worker-0  | 3
//!   2 | worker-1  | -
//! Total issues: 3
//! ```
//!
//! A `-` marks a worker that was reaped without reporting (crash); it
//! contributes nothing to the total.

use std::fmt;

use crate::workers::WorkerId;

/// One worker's final line in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    /// The worker's identity.
    pub worker: WorkerId,
    /// Final issue tally; `None` for a worker that crashed before reporting.
    pub issues: Option<u32>,
}

/// Aggregated statistics for a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    rows: Vec<WorkerReport>,
    total: u32,
}

impl RunReport {
    /// Builds a report from final `(identity, tally)` pairs in roster order.
    pub fn new(tallies: Vec<(WorkerId, Option<u32>)>) -> Self {
        let rows: Vec<WorkerReport> = tallies
            .into_iter()
            .map(|(worker, issues)| WorkerReport { worker, issues })
            .collect();
        let total = rows.iter().filter_map(|r| r.issues).sum();
        Self { rows, total }
    }

    /// Per-worker rows, ordered by roster index.
    pub fn rows(&self) -> &[WorkerReport] {
        &self.rows
    }

    /// Number of workers in the run.
    pub fn worker_count(&self) -> usize {
        self.rows.len()
    }

    /// Sum of all recorded tallies.
    pub fn total(&self) -> u32 {
        self.total
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "No. | Worker    | Issues")?;
        for (i, row) in self.rows.iter().enumerate() {
            match row.issues {
                Some(n) => writeln!(f, "{:3} | {:<9} | {}", i + 1, row.worker.to_string(), n)?,
                None => writeln!(f, "{:3} | {:<9} | -", i + 1, row.worker.to_string())?,
            }
        }
        write!(f, "Total issues: {}", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_recorded_tallies() {
        let report = RunReport::new(vec![
            (WorkerId::new(0), Some(2)),
            (WorkerId::new(1), Some(0)),
            (WorkerId::new(2), Some(5)),
        ]);
        assert_eq!(report.worker_count(), 3);
        assert_eq!(report.total(), 7);
    }

    #[test]
    fn crashed_worker_contributes_nothing() {
        let report = RunReport::new(vec![
            (WorkerId::new(0), Some(4)),
            (WorkerId::new(1), None),
        ]);
        assert_eq!(report.total(), 4);
        assert_eq!(report.rows()[1].issues, None);
    }

    #[test]
    fn renders_summary_table() {
        let report = RunReport::new(vec![
            (WorkerId::new(0), Some(3)),
            (WorkerId::new(1), None),
        ]);
        let text = report.to_string();
        assert!(text.starts_with("No. | Worker    | Issues"));
        assert!(text.contains("worker-0"));
        assert!(text.contains("| -"));
        assert!(text.ends_with("Total issues: 3"));
    }
}
