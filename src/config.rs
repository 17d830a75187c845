//! # Run configuration.
//!
//! Provides [`RunConfig`], the immutable description of one supervised run:
//! how many phases each worker performs, how long a phase takes, and one
//! issue probability per worker (the worker count is derived from the number
//! of probabilities).
//!
//! The configuration is validated once, by [`RunConfig::validate`], before any
//! worker is spawned. Out-of-range values are a startup error
//! ([`ConfigError`]), never a runtime fault.
//!
//! ## Bounds
//! - `phases` ∈ 1..=10
//! - `substeps` ∈ 1..=10
//! - each probability ∈ 0..=100
//! - at least one probability (worker count ≥ 1)
//! - `queue_capacity` ≥ 1

use std::time::Duration;

use crate::error::ConfigError;

/// Upper bound for `phases` and `substeps`.
const MAX_PHASES: u32 = 10;
const MAX_SUBSTEPS: u32 = 10;

/// Immutable configuration for one supervised run.
///
/// Defines:
/// - **Workload shape**: phases per worker, timed sub-steps per phase
/// - **Worker roster**: one issue probability per worker
/// - **Protocol limits**: pending-event mailbox capacity
/// - **Event system**: bus capacity for event delivery
/// - **Shutdown behavior**: grace period after cancellation
///
/// All fields are public for flexibility; prefer [`RunConfig::new`] plus field
/// tweaks over building the struct literally.
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Number of phases each worker performs (1..=10).
    pub phases: u32,

    /// Timed sub-steps per phase (1..=10).
    ///
    /// Each sub-step sleeps [`RunConfig::step`]; a sub-step that hits an issue
    /// additionally sleeps [`RunConfig::issue_delay`].
    pub substeps: u32,

    /// Per-worker issue probability in percent (0..=100).
    ///
    /// The worker count is `probabilities.len()`; worker `i` runs with
    /// `probabilities[i]`.
    pub probabilities: Vec<u32>,

    /// Base duration of one sub-step.
    pub step: Duration,

    /// Extra delay a worker incurs when a sub-step hits an issue.
    pub issue_delay: Duration,

    /// Capacity of the pending-event mailbox.
    ///
    /// The protocol posts at most one entry per worker at a time, so any value
    /// `>= probabilities.len()` cannot overflow. Exceeding the capacity is a
    /// fatal protocol violation, not a recoverable error.
    pub queue_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items. Minimum value is 1 (clamped by Bus).
    pub bus_capacity: usize,

    /// Maximum time to wait for cancelled workers to unwind after a shutdown
    /// signal before giving up with `RuntimeError::GraceExceeded`.
    pub grace: Duration,
}

impl RunConfig {
    /// Creates a configuration with the given workload shape and roster,
    /// leaving the ambient knobs at their defaults.
    pub fn new(phases: u32, substeps: u32, probabilities: Vec<u32>) -> Self {
        Self {
            phases,
            substeps,
            probabilities,
            ..Self::default()
        }
    }

    /// Number of workers in the run.
    #[inline]
    pub fn worker_count(&self) -> usize {
        self.probabilities.len()
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Checks all bounds, returning the first violation.
    ///
    /// Called by [`Supervisor::run`](crate::Supervisor::run) before any worker
    /// is spawned.
    ///
    /// # Example
    /// ```
    /// use phasevisor::{ConfigError, RunConfig};
    ///
    /// assert!(RunConfig::new(3, 2, vec![0, 50, 100]).validate().is_ok());
    ///
    /// let bad = RunConfig::new(0, 2, vec![50]);
    /// assert_eq!(bad.validate(), Err(ConfigError::PhasesOutOfRange { got: 0 }));
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.phases < 1 || self.phases > MAX_PHASES {
            return Err(ConfigError::PhasesOutOfRange { got: self.phases });
        }
        if self.substeps < 1 || self.substeps > MAX_SUBSTEPS {
            return Err(ConfigError::SubstepsOutOfRange { got: self.substeps });
        }
        if self.probabilities.is_empty() {
            return Err(ConfigError::NoWorkers);
        }
        for (index, &p) in self.probabilities.iter().enumerate() {
            if p > 100 {
                return Err(ConfigError::ProbabilityOutOfRange { index, got: p });
            }
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        Ok(())
    }
}

impl Default for RunConfig {
    /// Default configuration:
    ///
    /// - `phases = 1`, `substeps = 1`, no workers (must be filled in)
    /// - `step = 100ms`, `issue_delay = 50ms`
    /// - `queue_capacity = 100`
    /// - `bus_capacity = 1024`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            phases: 1,
            substeps: 1,
            probabilities: Vec::new(),
            step: Duration::from_millis(100),
            issue_delay: Duration::from_millis(50),
            queue_capacity: 100,
            bus_capacity: 1024,
            grace: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> RunConfig {
        RunConfig::new(2, 3, vec![0, 100])
    }

    #[test]
    fn accepts_bounds() {
        assert!(base().validate().is_ok());
        assert!(RunConfig::new(1, 1, vec![0]).validate().is_ok());
        assert!(RunConfig::new(10, 10, vec![100]).validate().is_ok());
    }

    #[test]
    fn rejects_phases_out_of_range() {
        let mut cfg = base();
        cfg.phases = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::PhasesOutOfRange { got: 0 }));
        cfg.phases = 11;
        assert_eq!(cfg.validate(), Err(ConfigError::PhasesOutOfRange { got: 11 }));
    }

    #[test]
    fn rejects_substeps_out_of_range() {
        let mut cfg = base();
        cfg.substeps = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::SubstepsOutOfRange { got: 0 }));
        cfg.substeps = 11;
        assert_eq!(cfg.validate(), Err(ConfigError::SubstepsOutOfRange { got: 11 }));
    }

    #[test]
    fn rejects_bad_probability() {
        let mut cfg = base();
        cfg.probabilities = vec![50, 101];
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ProbabilityOutOfRange { index: 1, got: 101 })
        );
    }

    #[test]
    fn rejects_empty_roster() {
        let mut cfg = base();
        cfg.probabilities.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn rejects_zero_mailbox() {
        let mut cfg = base();
        cfg.queue_capacity = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroQueueCapacity));
    }

    #[test]
    fn worker_count_tracks_probabilities() {
        assert_eq!(base().worker_count(), 2);
        assert_eq!(RunConfig::default().worker_count(), 0);
    }
}
