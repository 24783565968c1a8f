//! Debounce timer abstraction.
//!
//! The synchronizer owns exactly one timer shared by all debounced keys.
//! Arming restarts the window from zero; there is never more than one
//! deadline outstanding.

use std::time::Duration;

/// A single restartable deadline.
pub trait Scheduler {
    /// Start the window, cancelling any outstanding deadline.
    fn arm(&mut self, delay: Duration);

    /// Drop the outstanding deadline, if any.
    fn cancel(&mut self);

    fn is_armed(&self) -> bool;
}

/// Scheduler driven by explicit virtual time.
///
/// Nothing fires on its own: callers move time forward with
/// [`ManualScheduler::advance`] (or
/// [`Synchronizer::advance`](crate::Synchronizer::advance), which also
/// commits the pending window).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    now: Duration,
    deadline: Option<Duration>,
    arms: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Time left before the deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_sub(self.now))
    }

    /// How many times the timer was armed.
    pub fn arm_count(&self) -> usize {
        self.arms
    }

    /// Move virtual time forward.
    ///
    /// Returns true when the deadline was reached; the timer is then disarmed.
    pub fn advance(&mut self, by: Duration) -> bool {
        self.now += by;
        match self.deadline {
            Some(deadline) if deadline <= self.now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, delay: Duration) {
        self.deadline = Some(self.now + delay);
        self.arms += 1;
    }

    fn cancel(&mut self) {
        self.deadline = None;
    }

    fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}
