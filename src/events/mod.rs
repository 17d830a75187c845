//! Runtime events: types and broadcast bus.
//!
//! Groups the event **data model** and the **bus** used to publish/subscribe
//! to runtime events emitted by workers and the supervisor.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Supervisor` (acks, overflow, shutdown, all-done) and
//!   worker loops (phase progress, issues, completion).
//! - **Consumer**: `Supervisor::subscriber_listener()`, which fans events out
//!   to the [`SubscriberSet`](crate::subscribers::SubscriberSet).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
