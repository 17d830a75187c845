//! # Worker side of the protocol.
//!
//! - [`WorkerId`] — opaque, stable identity used to address acknowledgments
//! - [`Worker`] — per-worker phase state machine (crate-internal; workers are
//!   spawned by the [`Supervisor`](crate::Supervisor) from the run config)
//! - [`Workload`] — one phase of timed sub-steps with random issues

mod worker;
mod workload;

pub use worker::WorkerId;

pub(crate) use worker::{Worker, WorkerOutcome};
pub(crate) use workload::Workload;
