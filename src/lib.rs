//! # phasevisor
//!
//! **Phasevisor** coordinates a fixed crew of independent workers through a
//! multi-phase task using asynchronous out-of-band notifications: after each
//! phase a worker notifies the supervisor and blocks until it is explicitly
//! acknowledged, and only then may it start the next phase.
//!
//! The crate's core is the notification/acknowledgment barrier: a bounded
//! pending-event mailbox written by workers and drained only by the
//! supervisor's dispatch loop, combined with a race-free "check, then wait"
//! primitive so that no notification can be lost between the last check and
//! the sleep — the classic lost-wakeup window.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   Worker 0   │   │   Worker 1   │   │   Worker N-1 │
//!     │ (phase loop) │   │ (phase loop) │   │ (phase loop) │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ post(id)         │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Mailbox (bounded pending-event queue + wake permit)              │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor dispatch loop                                         │
//! │  - Draining: pop entry ─► one-shot ack to that worker's channel   │
//! │  - Reap pass: record terminated workers (JoinSet)                 │
//! │  - Waiting: select! { mailbox wake, termination, shutdown }       │
//! └──────┬──────────────────────────────────────┬─────────────────────┘
//!        │ ack (capacity-1 channel per worker)  │ events
//!        ▼                                      ▼
//!   Worker unblocks,                     Bus ─► SubscriberSet
//!   starts next phase                        (LogWriter, custom...)
//! ```
//!
//! ## Lifecycle
//! ```text
//! RunConfig ──► Supervisor::run()
//!
//! validate() ─► spawn N workers ─► loop {
//!   ├─► drain mailbox, acknowledge each pending worker exactly once
//!   ├─► overflow flag? ─► fatal QueueOverflow (cancel crew, terminate run)
//!   ├─► reap terminated workers (crashed ones too)
//!   ├─► all N reaped? ─► AllDone ─► RunReport
//!   └─► park until a notification, a termination, or a shutdown signal
//! }
//! ```
//!
//! ## Example
//! ```rust
//! use phasevisor::{RunConfig, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Two phases, one sub-step each; two workers: one never hits an
//!     // issue, one always does.
//!     let cfg = RunConfig::new(2, 1, vec![0, 100]);
//!
//!     let sup = Supervisor::new(cfg, Vec::new());
//!     let report = sup.run().await?;
//!
//!     assert_eq!(report.worker_count(), 2);
//!     assert_eq!(report.rows()[0].issues, Some(0));
//!     assert_eq!(report.rows()[1].issues, Some(2));
//!     println!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//! | Property          | How it is held                                                    |
//! |-------------------|-------------------------------------------------------------------|
//! | No lost wakeup    | Mailbox wake permits are retained; the loop re-drains before parking |
//! | Exactly-once ack  | At most one outstanding entry per worker; duplicate acks coalesce |
//! | Phase ordering    | A worker parks on its own capacity-1 channel until acknowledged   |
//! | Bounded mailbox   | Overflow is a surfaced, fatal fault — never a silent drop         |
//! | Termination       | Crashed workers are still reaped; AllDone needs exactly N reaps   |

mod config;
mod core;
mod error;
mod events;
mod report;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use config::RunConfig;
pub use core::{Mailbox, Supervisor};
pub use error::{ConfigError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use report::{RunReport, WorkerReport};
pub use subscribers::{Subscribe, SubscriberSet};
pub use workers::WorkerId;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
