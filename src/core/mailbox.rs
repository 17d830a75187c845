//! # Mailbox: bounded pending-event queue with a race-free wake.
//!
//! The mailbox is the only state shared between the notification side (worker
//! loops posting their identity) and the dispatch loop that drains it. The
//! posting path is held to interrupt-handler discipline: a single
//! bounds-checked append under a short mutex section, with every fault it can
//! hit recorded as a flag for the dispatch loop to observe. Posting never
//! blocks, never allocates (the buffer is pre-sized), and does nothing else.
//!
//! ## The lost-wakeup race
//! The dispatch loop alternates "drain everything" and "sleep until work".
//! A notification arriving between the last drain and the sleep must not be
//! lost. [`tokio::sync::Notify`] closes that window: `notify_one` with no
//! parked waiter stores a permit, so the next [`Mailbox::wait`] returns
//! immediately instead of parking. Combined with the loop re-draining after
//! every wake, no interleaving of posts and waits can strand an entry.
//!
//! ## Ordering
//! Entries are popped newest-first (stack order). The protocol does not order
//! acknowledgments relative to each other; it only requires every entry
//! present when draining starts to be acknowledged exactly once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::Notify;

use crate::workers::WorkerId;

/// Bounded mailbox of workers with an unacknowledged phase completion.
#[derive(Debug)]
pub struct Mailbox {
    /// Pending worker identities; pre-sized to `capacity`, never reallocated.
    pending: Mutex<Vec<WorkerId>>,
    capacity: usize,
    /// Sticky overflow fault. Set by the posting side, observed and surfaced
    /// by the dispatch loop; a lost notification is protocol-fatal.
    overflowed: AtomicBool,
    /// Wake permit for the dispatch loop.
    bell: Notify,
}

impl Mailbox {
    /// Creates a mailbox holding at most `capacity` pending entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            overflowed: AtomicBool::new(false),
            bell: Notify::new(),
        }
    }

    /// Configured capacity bound.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Posts a phase-completion notification for `id`.
    ///
    /// Appends if capacity remains, otherwise sets the sticky overflow flag
    /// and drops the entry. Always wakes the dispatch loop so that either the
    /// new entry or the fault is observed promptly. Returns whether the entry
    /// was stored.
    pub fn post(&self, id: WorkerId) -> bool {
        let stored = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.len() < self.capacity {
                pending.push(id);
                true
            } else {
                self.overflowed.store(true, Ordering::Release);
                false
            }
        };
        self.bell.notify_one();
        stored
    }

    /// Removes one pending entry, newest first.
    pub fn take(&self) -> Option<WorkerId> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    /// True once any post has been dropped. The flag is sticky; a run that
    /// overflowed cannot become healthy again.
    pub fn overflowed(&self) -> bool {
        self.overflowed.load(Ordering::Acquire)
    }

    /// Parks until a post (or overflow fault) wakes the caller.
    ///
    /// A wake that arrived while nobody was parked is retained and satisfies
    /// the next call immediately; see the module docs on the lost-wakeup race.
    pub async fn wait(&self) {
        self.bell.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn post_then_take() {
        let mb = Mailbox::new(4);
        assert!(mb.post(WorkerId::new(1)));
        assert!(mb.post(WorkerId::new(2)));

        assert_eq!(mb.take(), Some(WorkerId::new(2)));
        assert_eq!(mb.take(), Some(WorkerId::new(1)));
        assert_eq!(mb.take(), None);
        assert!(!mb.overflowed());
    }

    #[test]
    fn overflow_is_sticky_and_keeps_existing_entries() {
        let mb = Mailbox::new(1);
        assert!(mb.post(WorkerId::new(0)));
        assert!(!mb.post(WorkerId::new(1)));
        assert!(mb.overflowed());

        // The stored entry survives; only the overflowing one was dropped.
        assert_eq!(mb.take(), Some(WorkerId::new(0)));
        assert_eq!(mb.take(), None);
        assert!(mb.overflowed());
    }

    #[tokio::test(start_paused = true)]
    async fn wake_posted_before_wait_is_not_lost() {
        let mb = Mailbox::new(2);

        // Post first, wait second: the permit must be retained.
        mb.post(WorkerId::new(0));
        tokio::time::timeout(Duration::from_secs(1), mb.wait())
            .await
            .expect("retained permit satisfies the wait");
        assert_eq!(mb.take(), Some(WorkerId::new(0)));
    }

    #[tokio::test(start_paused = true)]
    async fn wait_parks_until_posted() {
        let mb = Arc::new(Mailbox::new(2));

        // Nothing pending: the wait must time out.
        let idle = tokio::time::timeout(Duration::from_millis(10), mb.wait()).await;
        assert!(idle.is_err());

        let poster = Arc::clone(&mb);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            poster.post(WorkerId::new(7));
        });

        tokio::time::timeout(Duration::from_secs(1), mb.wait())
            .await
            .expect("post wakes the waiter");
        assert_eq!(mb.take(), Some(WorkerId::new(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_still_wakes_the_waiter() {
        let mb = Mailbox::new(1);
        mb.post(WorkerId::new(0));
        mb.wait().await; // consume the first permit
        assert!(!mb.post(WorkerId::new(1)));

        // The dropped post must still wake the loop so the fault is observed.
        tokio::time::timeout(Duration::from_secs(1), mb.wait())
            .await
            .expect("overflow wake");
        assert!(mb.overflowed());
    }
}
