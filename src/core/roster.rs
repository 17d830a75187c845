//! # Roster: supervisor-owned table of worker slots.
//!
//! The roster holds everything the supervisor knows about each worker: the
//! sending half of its acknowledgment channel, its recorded tally once
//! reaped, and how many workers have finished. Workers never see the roster;
//! they own only their counters and the receiving half of their channel.
//!
//! ## Acknowledgment semantics
//! Each channel has capacity 1, which gives the protocol its one-shot shape:
//! - `Delivered` — the permit was placed; the worker will unpark once.
//! - `Coalesced` — a permit was already pending. A duplicate acknowledgment
//!   merges with it and is not observable to the worker (at most one unpark
//!   per notification).
//! - `Gone` — the worker exited and dropped its receiver. Harmless: a late
//!   acknowledgment to a terminated worker has nobody left to release.

use tokio::sync::mpsc;

use crate::workers::WorkerId;

/// Result of attempting to deliver one acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AckOutcome {
    /// Acknowledgment placed; the worker will proceed.
    Delivered,
    /// An undelivered acknowledgment was already pending; merged with it.
    Coalesced,
    /// The worker already exited; nothing to release.
    Gone,
}

/// Per-worker bookkeeping.
struct Slot {
    ack: mpsc::Sender<()>,
    /// Final issue tally, recorded at reap time. `None` until reaped, and
    /// permanently `None` for a worker that crashed without reporting.
    tally: Option<u32>,
    done: bool,
}

/// Fixed table of worker slots, created once at startup.
pub(crate) struct Roster {
    slots: Vec<Slot>,
    finished: usize,
}

impl Roster {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            finished: 0,
        }
    }

    /// Adds a slot and returns the new worker's identity together with the
    /// receiving half of its acknowledgment channel.
    pub(crate) fn register(&mut self) -> (WorkerId, mpsc::Receiver<()>) {
        let id = WorkerId::new(self.slots.len());
        let (tx, rx) = mpsc::channel(1);
        self.slots.push(Slot {
            ack: tx,
            tally: None,
            done: false,
        });
        (id, rx)
    }

    /// Delivers one acknowledgment to `id`.
    pub(crate) fn ack(&self, id: WorkerId) -> AckOutcome {
        let Some(slot) = self.slots.get(id.index()) else {
            return AckOutcome::Gone;
        };
        match slot.ack.try_send(()) {
            Ok(()) => AckOutcome::Delivered,
            Err(mpsc::error::TrySendError::Full(())) => AckOutcome::Coalesced,
            Err(mpsc::error::TrySendError::Closed(())) => AckOutcome::Gone,
        }
    }

    /// Records a reaped worker's final result. Reaping the same worker twice
    /// is ignored; the first recorded result stands.
    pub(crate) fn record(&mut self, id: WorkerId, tally: Option<u32>) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        if slot.done {
            return;
        }
        slot.done = true;
        slot.tally = tally;
        self.finished += 1;
    }

    /// Workers reaped so far.
    pub(crate) fn finished(&self) -> usize {
        self.finished
    }

    /// Total workers in the run.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// True once every worker has been reaped.
    pub(crate) fn all_done(&self) -> bool {
        self.finished == self.slots.len()
    }

    /// Final `(identity, tally)` pairs in roster order.
    pub(crate) fn tallies(&self) -> Vec<(WorkerId, Option<u32>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (WorkerId::new(i), slot.tally))
            .collect()
    }
}
