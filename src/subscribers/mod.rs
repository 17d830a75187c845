//! # Event subscribers.
//!
//! Provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out that
//! delivers runtime events broadcast through the [`Bus`](crate::events::Bus).
//!
//! ```text
//! Worker/Supervisor ── publish(Event) ──► Bus ──► subscriber_listener
//!                                                       │
//!                                                 SubscriberSet
//!                                              ┌────────┴────────┐
//!                                              ▼                 ▼
//!                                          LogWriter          custom...
//! ```
//!
//! Subscribers observe; they cannot influence the protocol.

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
