//! # Supervisor: dispatch loop for the notification/acknowledgment protocol.
//!
//! The [`Supervisor`] owns the event bus, the pending-event [`Mailbox`], and
//! the [`Roster`] of worker slots. It spawns one worker per configured
//! probability and then runs the dispatch loop until every worker has been
//! reaped.
//!
//! ## Dispatch states
//! ```text
//! ┌─► Draining: pop mailbox entries, send one acknowledgment each
//! │        │
//! │        ├─ overflow flag set ──► QueueOverflow (fatal, cancel workers)
//! │        ▼
//! │   Reap pass: try_join_next until empty, record results
//! │        │
//! │        ├─ finished == N ──► AllDone ──► RunReport
//! │        ▼
//! └── Waiting: select! over
//!         - mailbox wake   (phase-completion notification)
//!         - join_next      (worker termination)
//!         - shutdown signal (operator interrupt)
//! ```
//!
//! ## Why no notification is ever lost
//! The loop drains and re-checks *before* parking, and the mailbox retains a
//! wake that fired while nobody was parked. A post landing between the last
//! `take()` and the `wait()` therefore satisfies the wait immediately; the
//! loop always comes back around to drain it.
//!
//! ## Failure semantics
//! - Mailbox overflow is fatal: a notification was lost and some worker may be
//!   parked forever. The supervisor cancels the crew so the run terminates
//!   instead of hanging, then surfaces [`RuntimeError::QueueOverflow`].
//! - An acknowledgment addressed to a worker that already exited is logged as
//!   an event and skipped; the loop continues.
//! - A worker that panics never notifies, but its termination still wakes the
//!   loop and it is reaped (tally `None`), so `AllDone` is reached after
//!   exactly N reaps regardless.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinError, JoinSet};
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::RunConfig;
use crate::core::roster::{AckOutcome, Roster};
use crate::core::{shutdown, Mailbox};
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::report::RunReport;
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workers::{Worker, WorkerId, WorkerOutcome, Workload};

/// Coordinates a fixed crew of workers through their phases.
pub struct Supervisor {
    /// Immutable run configuration.
    pub cfg: RunConfig,
    /// Event bus shared with all workers.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    pub subs: Arc<SubscriberSet>,
}

impl Supervisor {
    /// Creates a supervisor with the given config and subscribers.
    pub fn new(cfg: RunConfig, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers));
        Self { cfg, bus, subs }
    }

    /// Runs the crew to completion and returns the aggregated report.
    ///
    /// Validates the configuration before spawning anything, then drives the
    /// dispatch loop until all workers are reaped (`AllDone`), the mailbox
    /// overflows, or a shutdown signal arrives. On the error paths the crew
    /// is cancelled and given [`RunConfig::grace`] to unwind.
    pub async fn run(&self) -> Result<RunReport, RuntimeError> {
        self.cfg.validate()?;
        self.subscriber_listener();

        let token = CancellationToken::new();
        let mailbox = Arc::new(Mailbox::new(self.cfg.queue_capacity));
        let mut roster = Roster::new();
        let mut set = JoinSet::new();
        let mut task_ids = HashMap::new();
        self.spawn_workers(&mut set, &mut roster, &mailbox, &token, &mut task_ids);

        match self
            .dispatch(&mut set, &mut roster, &mailbox, &task_ids)
            .await
        {
            Ok(()) => {
                let report = RunReport::new(roster.tallies());
                self.bus
                    .publish(Event::now(EventKind::AllDone).with_issues(report.total()));
                Ok(report)
            }
            Err(err) => {
                token.cancel();
                let graceful = self.unwind_with_grace(&mut set).await;
                if !graceful {
                    if let RuntimeError::Interrupted { .. } = err {
                        return Err(RuntimeError::GraceExceeded {
                            grace: self.cfg.grace,
                        });
                    }
                }
                Err(err)
            }
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                set.emit(&ev);
            }
        });
    }

    /// Registers a roster slot per configured probability and spawns the
    /// worker loops.
    fn spawn_workers(
        &self,
        set: &mut JoinSet<WorkerOutcome>,
        roster: &mut Roster,
        mailbox: &Arc<Mailbox>,
        token: &CancellationToken,
        task_ids: &mut HashMap<task::Id, WorkerId>,
    ) {
        for &probability in &self.cfg.probabilities {
            let (id, ack_rx) = roster.register();
            let worker = Worker {
                id,
                phases: self.cfg.phases,
                workload: Workload {
                    substeps: self.cfg.substeps,
                    step: self.cfg.step,
                    issue_delay: self.cfg.issue_delay,
                    probability,
                },
                mailbox: Arc::clone(mailbox),
                ack: ack_rx,
                bus: self.bus.clone(),
                token: token.child_token(),
            };
            let handle = set.spawn(worker.run());
            task_ids.insert(handle.id(), id);
        }
    }

    /// The dispatch loop: Draining → reap pass → AllDone check → Waiting.
    async fn dispatch(
        &self,
        set: &mut JoinSet<WorkerOutcome>,
        roster: &mut Roster,
        mailbox: &Mailbox,
        task_ids: &HashMap<task::Id, WorkerId>,
    ) -> Result<(), RuntimeError> {
        loop {
            // Draining: every entry present now is acknowledged exactly once.
            while let Some(id) = mailbox.take() {
                match roster.ack(id) {
                    AckOutcome::Delivered => {
                        self.bus
                            .publish(Event::now(EventKind::AckSent).with_worker(id));
                    }
                    AckOutcome::Coalesced => {
                        // Duplicate for the same notification; invisible to
                        // the worker, nothing to report.
                    }
                    AckOutcome::Gone => {
                        self.bus.publish(
                            Event::now(EventKind::AckUndeliverable)
                                .with_worker(id)
                                .with_reason("worker already exited"),
                        );
                    }
                }
            }

            if mailbox.overflowed() {
                self.bus.publish(
                    Event::now(EventKind::QueueOverflow)
                        .with_reason(format!("capacity {}", mailbox.capacity())),
                );
                return Err(RuntimeError::QueueOverflow {
                    capacity: mailbox.capacity(),
                });
            }

            // Reap pass: non-blocking.
            while let Some(res) = set.try_join_next_with_id() {
                self.reap(res, roster, task_ids);
            }

            if roster.all_done() {
                return Ok(());
            }

            // Waiting: race-free because the loop re-drains after every wake
            // and the mailbox retains wakes that beat us here.
            tokio::select! {
                _ = mailbox.wait() => {}
                Some(res) = set.join_next_with_id() => {
                    self.reap(res, roster, task_ids);
                }
                _ = shutdown::wait_for_shutdown_signal() => {
                    self.bus.publish(Event::now(EventKind::ShutdownRequested));
                    return Err(RuntimeError::Interrupted {
                        finished: roster.finished(),
                        total: roster.len(),
                    });
                }
            }
        }
    }

    /// Records one terminated worker. A panicked worker is reaped with no
    /// tally so the run can still reach `AllDone`.
    fn reap(
        &self,
        res: Result<(task::Id, WorkerOutcome), JoinError>,
        roster: &mut Roster,
        task_ids: &HashMap<task::Id, WorkerId>,
    ) {
        match res {
            Ok((_, outcome)) => {
                roster.record(outcome.id, Some(outcome.issues));
            }
            Err(err) => {
                if let Some(&id) = task_ids.get(&err.id()) {
                    self.bus.publish(
                        Event::now(EventKind::WorkerCrashed)
                            .with_worker(id)
                            .with_reason(err.to_string()),
                    );
                    roster.record(id, None);
                }
            }
        }
    }

    /// Waits up to the grace period for cancelled workers to unwind;
    /// hard-aborts the stragglers. Returns whether the unwind was graceful.
    async fn unwind_with_grace(&self, set: &mut JoinSet<WorkerOutcome>) -> bool {
        let done = async {
            while set.join_next().await.is_some() {}
        };
        if time::timeout(self.cfg.grace, done).await.is_err() {
            set.abort_all();
            while set.join_next().await.is_some() {}
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use tokio::sync::broadcast::error::TryRecvError;

    fn supervisor(cfg: RunConfig) -> Supervisor {
        Supervisor::new(cfg, Vec::new())
    }

    fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(ev) => events.push(ev),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                Err(TryRecvError::Lagged(_)) => continue,
            }
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_invalid_config_before_spawning() {
        let sup = supervisor(RunConfig::new(0, 1, vec![0]));
        match sup.run().await {
            Err(RuntimeError::InvalidConfig(ConfigError::PhasesOutOfRange { got: 0 })) => {}
            other => panic!("expected config rejection, got {other:?}"),
        }
    }

    // Scenario A: N=1, P=1, T=1, probability 0.
    #[tokio::test(start_paused = true)]
    async fn single_quiet_worker_reports_zero() {
        let sup = supervisor(RunConfig::new(1, 1, vec![0]));
        let report = sup.run().await.expect("run completes");

        assert_eq!(report.worker_count(), 1);
        assert_eq!(report.total(), 0);
        assert_eq!(report.rows()[0].issues, Some(0));
    }

    // Scenario B: N=3, P=2, probabilities {0, 100, 50}.
    #[tokio::test(start_paused = true)]
    async fn mixed_crew_tallies_match_probabilities() {
        let cfg = RunConfig::new(2, 2, vec![0, 100, 50]);
        let per_worker_max = cfg.phases * cfg.substeps;
        let sup = supervisor(cfg);
        let report = sup.run().await.expect("run completes");

        assert_eq!(report.worker_count(), 3);
        assert_eq!(report.rows()[0].issues, Some(0));
        assert_eq!(report.rows()[1].issues, Some(per_worker_max));
        let lucky = report.rows()[2].issues.expect("worker 2 reported");
        assert!(lucky <= per_worker_max);
        assert_eq!(report.total(), per_worker_max + lucky);
    }

    #[tokio::test(start_paused = true)]
    async fn every_notification_gets_exactly_one_ack() {
        let sup = supervisor(RunConfig::new(3, 1, vec![0, 0]));
        let mut rx = sup.bus.subscribe();
        let report = sup.run().await.expect("run completes");
        assert_eq!(report.total(), 0);

        let events = drain_events(&mut rx);
        for id in [WorkerId::new(0), WorkerId::new(1)] {
            let completions = events
                .iter()
                .filter(|e| e.kind == EventKind::PhaseCompleted && e.worker == Some(id))
                .count();
            let acks = events
                .iter()
                .filter(|e| e.kind == EventKind::AckSent && e.worker == Some(id))
                .count();
            assert_eq!(completions, 3);
            assert_eq!(acks, 3);
        }
        assert_eq!(
            events.iter().filter(|e| e.kind == EventKind::AllDone).count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn no_phase_starts_before_previous_ack() {
        let sup = supervisor(RunConfig::new(4, 1, vec![0]));
        let mut rx = sup.bus.subscribe();
        sup.run().await.expect("run completes");

        let events = drain_events(&mut rx);
        let id = WorkerId::new(0);
        for k in 1..4u32 {
            let ack_seq = events
                .iter()
                .filter(|e| e.kind == EventKind::AckSent && e.worker == Some(id))
                .nth((k - 1) as usize)
                .expect("ack for phase k")
                .seq;
            let next_start_seq = events
                .iter()
                .find(|e| {
                    e.kind == EventKind::PhaseStarted
                        && e.worker == Some(id)
                        && e.phase == Some(k + 1)
                })
                .expect("next phase start")
                .seq;
            assert!(
                ack_seq < next_start_seq,
                "phase {} started (seq {next_start_seq}) before ack {k} (seq {ack_seq})",
                k + 1
            );
        }
    }

    // Scenario C: capacity 1, two workers notifying concurrently.
    //
    // Under the paused current-thread runtime both workers finish their only
    // sub-step in the same timer batch and post back-to-back before the
    // dispatch loop runs, so exactly one post overflows.
    #[tokio::test(start_paused = true)]
    async fn overflow_is_fatal_and_terminates() {
        let mut cfg = RunConfig::new(1, 1, vec![0, 0]);
        cfg.queue_capacity = 1;
        let sup = supervisor(cfg);
        let mut rx = sup.bus.subscribe();

        match sup.run().await {
            Err(RuntimeError::QueueOverflow { capacity: 1 }) => {}
            other => panic!("expected overflow, got {other:?}"),
        }

        let events = drain_events(&mut rx);
        assert_eq!(
            events
                .iter()
                .filter(|e| e.kind == EventKind::QueueOverflow)
                .count(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn all_done_after_exactly_n_reaps() {
        for n in 1..=4usize {
            let sup = supervisor(RunConfig::new(2, 1, vec![10; n]));
            let report = sup.run().await.expect("run completes");
            assert_eq!(report.worker_count(), n);
            assert!(report.rows().iter().all(|r| r.issues.is_some()));
        }
    }
}
