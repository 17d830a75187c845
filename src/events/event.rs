//! # Runtime events emitted by the supervisor and workers.
//!
//! [`EventKind`] classifies everything observable about a run: worker
//! lifecycle (started/finished/crashed), phase progress (started, issue hit,
//! completed), the acknowledgment protocol (sent, undeliverable), and
//! supervisor terminal states (overflow, shutdown, all done).
//!
//! The [`Event`] struct carries optional metadata: the worker the event is
//! about, the phase number, an issue tally, and a free-form reason.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. `seq` is assigned at construction, so it reflects the order
//! in which events were produced even when they are delivered out of order.
//!
//! ## Example
//! ```rust
//! use phasevisor::{Event, EventKind, WorkerId};
//!
//! let ev = Event::now(EventKind::PhaseCompleted)
//!     .with_worker(WorkerId::new(2))
//!     .with_phase(1)
//!     .with_issues(3);
//!
//! assert_eq!(ev.kind, EventKind::PhaseCompleted);
//! assert_eq!(ev.phase, Some(1));
//! assert_eq!(ev.issues, Some(3));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::workers::WorkerId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Worker lifecycle ===
    /// Worker began its first phase.
    ///
    /// Sets: `worker`, `at`, `seq`.
    WorkerStarted,

    /// Worker completed its final phase and reported its cumulative tally.
    ///
    /// Sets: `worker`, `issues` (cumulative), `at`, `seq`.
    WorkerFinished,

    /// Worker terminated without reporting (panic); it is still reaped so the
    /// run can reach `AllDone`.
    ///
    /// Sets: `worker` (when attributable), `reason`, `at`, `seq`.
    WorkerCrashed,

    // === Phase progress ===
    /// Worker began a phase.
    ///
    /// Sets: `worker`, `phase`, `at`, `seq`.
    PhaseStarted,

    /// A sub-step hit an issue.
    ///
    /// Sets: `worker`, `phase`, `issues` (cumulative for the worker), `at`, `seq`.
    IssueHit,

    /// Worker completed a phase and notified the supervisor; it now blocks
    /// until acknowledged.
    ///
    /// Sets: `worker`, `phase`, `issues` (this phase), `at`, `seq`.
    PhaseCompleted,

    // === Acknowledgment protocol ===
    /// Supervisor acknowledged a pending phase completion.
    ///
    /// Sets: `worker`, `at`, `seq`.
    AckSent,

    /// An acknowledgment could not be delivered (worker already exited).
    /// Non-fatal; a late acknowledgment to a gone worker is harmless.
    ///
    /// Sets: `worker`, `reason`, `at`, `seq`.
    AckUndeliverable,

    // === Supervisor terminal states ===
    /// The pending-event mailbox overflowed; the run is aborted.
    ///
    /// Sets: `reason` (capacity), `at`, `seq`.
    QueueOverflow,

    /// Shutdown requested (OS signal observed); workers are being cancelled.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// Every worker has been reaped; the run is complete.
    ///
    /// Sets: `issues` (grand total), `at`, `seq`.
    AllDone,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker the event is about, if applicable.
    pub worker: Option<WorkerId>,
    /// Phase number (1-based), if applicable.
    pub phase: Option<u32>,
    /// Issue tally; whether per-phase, cumulative, or grand total depends on `kind`.
    pub issues: Option<u32>,
    /// Human-readable reason (ack failures, overflow details, panics).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            phase: None,
            issues: None,
            reason: None,
        }
    }

    /// Attaches the worker the event is about.
    #[inline]
    pub fn with_worker(mut self, worker: WorkerId) -> Self {
        self.worker = Some(worker);
        self
    }

    /// Attaches a phase number (1-based).
    #[inline]
    pub fn with_phase(mut self, phase: u32) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Attaches an issue tally.
    #[inline]
    pub fn with_issues(mut self, issues: u32) -> Self {
        self.issues = Some(issues);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// True for events that end the run (`QueueOverflow`, `AllDone`).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::QueueOverflow | EventKind::AllDone)
    }
}
