//! Runtime core: the supervision protocol.
//!
//! The only public API from this module is [`Supervisor`], which owns the
//! protocol state and drives the dispatch loop, plus the [`Mailbox`] it
//! shares with worker loops.
//!
//! Internal modules:
//! - [`mailbox`]: bounded pending-event queue with a race-free wake;
//! - [`roster`]: worker slots, acknowledgment delivery, reap bookkeeping;
//! - [`supervisor`]: spawns workers and runs Waiting/Draining/AllDone;
//! - [`shutdown`]: OS shutdown-signal wait.

mod mailbox;
mod roster;
mod shutdown;
mod supervisor;

pub use mailbox::Mailbox;
pub use supervisor::Supervisor;
