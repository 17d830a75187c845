//! # One phase of simulated work.
//!
//! [`Workload`] executes a single phase: a fixed number of timed sub-steps,
//! each of which independently hits an "issue" with a configured probability.
//! An issue costs an extra delay and bumps the worker's tally. Sub-steps are
//! independent trials; nothing carries over between them.
//!
//! The workload is a leaf: it knows nothing about notifications or
//! acknowledgments. It publishes [`EventKind::IssueHit`] for observability and
//! honors cooperative cancellation between sleeps.

use std::time::Duration;

use rand::Rng;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event, EventKind};
use crate::workers::WorkerId;

/// Executes one phase's timed sub-steps for a single worker.
#[derive(Clone, Debug)]
pub(crate) struct Workload {
    /// Sub-steps per phase.
    pub substeps: u32,
    /// Base duration of one sub-step.
    pub step: Duration,
    /// Extra delay when a sub-step hits an issue.
    pub issue_delay: Duration,
    /// Issue probability in percent (0..=100).
    pub probability: u32,
}

impl Workload {
    /// Runs one phase and returns the number of issues it hit.
    ///
    /// `tally_before` is the worker's cumulative tally entering this phase;
    /// it is only used so `IssueHit` events carry the running total.
    ///
    /// Cancellation is observed between sleeps; a cancelled phase returns the
    /// issues accrued so far.
    pub(crate) async fn run_phase(
        &self,
        id: WorkerId,
        phase: u32,
        tally_before: u32,
        bus: &Bus,
        token: &CancellationToken,
    ) -> u32 {
        let mut issues: u32 = 0;

        for _ in 0..self.substeps {
            tokio::select! {
                _ = time::sleep(self.step) => {}
                _ = token.cancelled() => return issues,
            }

            // ThreadRng must not be held across an await point.
            let hit = rand::rng().random_range(0..100u32) < self.probability;
            if hit {
                issues += 1;
                bus.publish(
                    Event::now(EventKind::IssueHit)
                        .with_worker(id)
                        .with_phase(phase)
                        .with_issues(tally_before + issues),
                );
                tokio::select! {
                    _ = time::sleep(self.issue_delay) => {}
                    _ = token.cancelled() => return issues,
                }
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload(probability: u32) -> Workload {
        Workload {
            substeps: 4,
            step: Duration::from_millis(100),
            issue_delay: Duration::from_millis(50),
            probability,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn zero_probability_never_hits() {
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        let issues = workload(0)
            .run_phase(WorkerId::new(0), 1, 0, &bus, &token)
            .await;
        assert_eq!(issues, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn certain_probability_hits_every_substep() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();

        let issues = workload(100)
            .run_phase(WorkerId::new(3), 2, 10, &bus, &token)
            .await;
        assert_eq!(issues, 4);

        // IssueHit events carry the cumulative tally.
        for expected in 11..=14 {
            let ev = rx.try_recv().expect("issue event");
            assert_eq!(ev.kind, EventKind::IssueHit);
            assert_eq!(ev.worker, Some(WorkerId::new(3)));
            assert_eq!(ev.phase, Some(2));
            assert_eq!(ev.issues, Some(expected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_cuts_phase_short() {
        let bus = Bus::new(16);
        let token = CancellationToken::new();
        token.cancel();

        let issues = workload(100)
            .run_phase(WorkerId::new(1), 1, 0, &bus, &token)
            .await;
        assert_eq!(issues, 0);
    }
}
