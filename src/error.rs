//! Error types used by the phasevisor runtime.
//!
//! This module defines two error enums:
//!
//! - [`ConfigError`] — startup validation failures, reported before any worker
//!   is spawned.
//! - [`RuntimeError`] — errors raised by the supervision protocol itself.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Startup validation errors.
///
/// Produced by [`RunConfig::validate`](crate::RunConfig::validate) before any
/// worker is created. A run never starts with an invalid configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Phase count outside the accepted `1..=10` range.
    #[error("phase count {got} out of range (1-10)")]
    PhasesOutOfRange {
        /// The rejected value.
        got: u32,
    },

    /// Sub-steps per phase outside the accepted `1..=10` range.
    #[error("sub-steps per phase {got} out of range (1-10)")]
    SubstepsOutOfRange {
        /// The rejected value.
        got: u32,
    },

    /// An issue probability outside the accepted `0..=100` range.
    #[error("issue probability {got} for worker {index} out of range (0-100)")]
    ProbabilityOutOfRange {
        /// Position of the offending probability.
        index: usize,
        /// The rejected value.
        got: u32,
    },

    /// No per-worker probabilities were supplied, so the worker count is zero.
    #[error("no workers configured (at least one issue probability required)")]
    NoWorkers,

    /// The pending-event mailbox cannot hold anything.
    #[error("mailbox capacity must be at least 1")]
    ZeroQueueCapacity,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use phasevisor::ConfigError;
    ///
    /// let err = ConfigError::PhasesOutOfRange { got: 11 };
    /// assert_eq!(err.as_label(), "config_phases_out_of_range");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::PhasesOutOfRange { .. } => "config_phases_out_of_range",
            ConfigError::SubstepsOutOfRange { .. } => "config_substeps_out_of_range",
            ConfigError::ProbabilityOutOfRange { .. } => "config_probability_out_of_range",
            ConfigError::NoWorkers => "config_no_workers",
            ConfigError::ZeroQueueCapacity => "config_zero_queue_capacity",
        }
    }
}

/// # Errors produced by the supervision protocol.
///
/// These are fatal to the run: the supervisor cancels remaining workers and
/// returns the error from [`Supervisor::run`](crate::Supervisor::run).
/// Non-fatal conditions (an acknowledgment addressed to a worker that already
/// exited) are reported as events instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The run was rejected before any worker spawned.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// The pending-event mailbox overflowed.
    ///
    /// A notification was lost, so some worker may never be acknowledged.
    /// The protocol cannot recover from this without backpressure, which the
    /// mailbox deliberately does not have; the run is aborted.
    #[error("pending-event mailbox overflowed (capacity {capacity}); a notification was lost")]
    QueueOverflow {
        /// Configured mailbox capacity that was exceeded.
        capacity: usize,
    },

    /// A shutdown signal arrived before all workers were reaped.
    #[error("interrupted by shutdown signal; {finished} of {total} workers reaped")]
    Interrupted {
        /// Workers reaped before the interrupt.
        finished: usize,
        /// Total workers in the run.
        total: usize,
    },

    /// Cancelled workers did not unwind within the grace period.
    #[error("shutdown grace {grace:?} exceeded; some workers are stuck")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use phasevisor::RuntimeError;
    ///
    /// let err = RuntimeError::QueueOverflow { capacity: 100 };
    /// assert_eq!(err.as_label(), "runtime_queue_overflow");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::InvalidConfig(_) => "runtime_invalid_config",
            RuntimeError::QueueOverflow { .. } => "runtime_queue_overflow",
            RuntimeError::Interrupted { .. } => "runtime_interrupted",
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::InvalidConfig(e) => format!("invalid config: {e}"),
            RuntimeError::QueueOverflow { capacity } => {
                format!("mailbox overflow at capacity {capacity}; notification lost")
            }
            RuntimeError::Interrupted { finished, total } => {
                format!("interrupted; reaped {finished}/{total} workers")
            }
            RuntimeError::GraceExceeded { grace } => {
                format!("grace exceeded after {grace:?}")
            }
        }
    }
}
