//! # Worker loop: per-worker phase state machine.
//!
//! A [`Worker`] runs `P` phases sequentially. After each phase it posts its
//! identity to the supervisor's pending-event [`Mailbox`] and blocks on its
//! own acknowledgment channel until the supervisor releases it; only then may
//! the next phase begin.
//!
//! ```text
//! run phase ─► post(id) to mailbox ─► block on ack channel ─► next phase
//!                                      (own channel: wakes addressed to
//!                                       other workers cannot satisfy it)
//! ```
//!
//! ## Rules
//! - A worker never notifies again before it was acknowledged, so at most one
//!   mailbox entry per worker is outstanding at any time.
//! - The acknowledgment channel has capacity 1: a duplicate acknowledgment
//!   coalesces with the pending one and is not observable to the worker.
//! - Cancellation exits the loop at the next safe point (between sub-steps,
//!   or while parked waiting for an acknowledgment).

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::Mailbox;
use crate::events::{Bus, Event, EventKind};
use crate::workers::workload::Workload;

/// Opaque, stable identity of one worker within a run.
///
/// Assigned at spawn time and never reused during the run. The numeric index
/// is exposed for reporting; nothing else about the worker can be derived
/// from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(usize);

impl WorkerId {
    /// Creates an identity from a roster index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Roster index of this worker (0-based).
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Terminal result a worker resolves with; consumed by the reap pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerOutcome {
    pub id: WorkerId,
    /// Cumulative issue tally across all completed phases.
    pub issues: u32,
}

/// Per-worker state machine: run phase → notify → await ack → repeat.
pub(crate) struct Worker {
    pub id: WorkerId,
    pub phases: u32,
    pub workload: Workload,
    pub mailbox: Arc<Mailbox>,
    pub ack: mpsc::Receiver<()>,
    pub bus: Bus,
    pub token: CancellationToken,
}

impl Worker {
    /// Runs all phases and resolves with the cumulative issue tally.
    ///
    /// The final phase is followed by termination, not by another wait: the
    /// supervisor observes the exit itself (the reap pass), so no
    /// acknowledgment is needed after the last notification is drained.
    pub(crate) async fn run(mut self) -> WorkerOutcome {
        self.bus
            .publish(Event::now(EventKind::WorkerStarted).with_worker(self.id));

        let mut total: u32 = 0;
        let mut completed = true;

        for phase in 1..=self.phases {
            if self.token.is_cancelled() {
                completed = false;
                break;
            }

            self.bus.publish(
                Event::now(EventKind::PhaseStarted)
                    .with_worker(self.id)
                    .with_phase(phase),
            );

            let issues = self
                .workload
                .run_phase(self.id, phase, total, &self.bus, &self.token)
                .await;
            total += issues;

            if self.token.is_cancelled() {
                completed = false;
                break;
            }

            self.bus.publish(
                Event::now(EventKind::PhaseCompleted)
                    .with_worker(self.id)
                    .with_phase(phase)
                    .with_issues(issues),
            );

            // Notify the supervisor. On overflow the mailbox records the
            // fault for the dispatch loop to surface; there is nothing a
            // worker can do about it from here.
            self.mailbox.post(self.id);

            tokio::select! {
                msg = self.ack.recv() => {
                    if msg.is_none() {
                        // Supervisor dropped our slot; the run is over.
                        completed = false;
                        break;
                    }
                }
                _ = self.token.cancelled() => {
                    completed = false;
                    break;
                }
            }
        }

        if completed {
            self.bus.publish(
                Event::now(EventKind::WorkerFinished)
                    .with_worker(self.id)
                    .with_issues(total),
            );
        }

        WorkerOutcome {
            id: self.id,
            issues: total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn make_worker(phases: u32, probability: u32) -> (Worker, mpsc::Sender<()>, Arc<Mailbox>) {
        let mailbox = Arc::new(Mailbox::new(8));
        let (ack_tx, ack_rx) = mpsc::channel(1);
        let worker = Worker {
            id: WorkerId::new(0),
            phases,
            workload: Workload {
                substeps: 2,
                step: Duration::from_millis(100),
                issue_delay: Duration::from_millis(50),
                probability,
            },
            mailbox: Arc::clone(&mailbox),
            ack: ack_rx,
            bus: Bus::new(64),
            token: CancellationToken::new(),
        };
        (worker, ack_tx, mailbox)
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_until_acknowledged_each_phase() {
        let (worker, ack_tx, mailbox) = make_worker(2, 0);
        let handle = tokio::spawn(worker.run());

        // Phase 1: the worker must post exactly one notification and park.
        mailbox.wait().await;
        assert_eq!(mailbox.take(), Some(WorkerId::new(0)));
        assert_eq!(mailbox.take(), None);
        assert!(!handle.is_finished());

        ack_tx.send(()).await.expect("worker is parked on ack");

        // Phase 2.
        mailbox.wait().await;
        assert_eq!(mailbox.take(), Some(WorkerId::new(0)));
        ack_tx.send(()).await.expect("worker is parked on ack");

        let outcome = handle.await.expect("worker resolves");
        assert_eq!(outcome.id, WorkerId::new(0));
        assert_eq!(outcome.issues, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn certain_issues_accumulate_across_phases() {
        let (worker, ack_tx, mailbox) = make_worker(2, 100);
        let handle = tokio::spawn(worker.run());

        for _ in 0..2 {
            mailbox.wait().await;
            assert_eq!(mailbox.take(), Some(WorkerId::new(0)));
            ack_tx.send(()).await.expect("worker is parked on ack");
        }

        // phases * substeps with probability 100
        let outcome = handle.await.expect("worker resolves");
        assert_eq!(outcome.issues, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_ack_channel_unparks_the_worker() {
        let (worker, ack_tx, mailbox) = make_worker(3, 0);
        let handle = tokio::spawn(worker.run());

        mailbox.wait().await;
        assert_eq!(mailbox.take(), Some(WorkerId::new(0)));
        drop(ack_tx);

        // No acknowledgment will ever come; the worker must not hang.
        let outcome = handle.await.expect("worker resolves");
        assert_eq!(outcome.issues, 0);
    }
}
