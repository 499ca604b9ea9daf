//! Bounded waiting primitives

use portable_atomic::{AtomicBool, Ordering};

/// Why a bounded wait gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitError {
    /// The deadline passed with no data
    TimedOut,
    /// The cancel flag was raised
    Cancelled,
}

/// A point in time after which waiting stops
///
/// Polled from a busy loop, so implementations must be cheap.
pub trait Deadline {
    /// Whether the deadline has passed
    fn expired(&mut self) -> bool;
}

impl<D: Deadline + ?Sized> Deadline for &mut D {
    fn expired(&mut self) -> bool {
        (**self).expired()
    }
}

/// Deadline that expires after a fixed number of polls
///
/// Used on the host where there is no hardware timer.
#[derive(Debug, Clone, Copy)]
pub struct PollBudget {
    remaining: u32,
}

impl PollBudget {
    /// Allow `polls` checks before expiring
    pub const fn new(polls: u32) -> Self {
        Self { remaining: polls }
    }
}

impl Deadline for PollBudget {
    fn expired(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

/// Cancellation request shared with the waiting context
#[derive(Debug, Default)]
pub struct CancelFlag(AtomicBool);

impl CancelFlag {
    /// Create a lowered flag
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Ask any wait in progress to stop
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Lower the flag again
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Whether cancellation was requested
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_budget_expires() {
        let mut budget = PollBudget::new(2);
        assert!(!budget.expired());
        assert!(!budget.expired());
        assert!(budget.expired());
        assert!(budget.expired());
    }

    #[test]
    fn test_cancel_flag() {
        let flag = CancelFlag::new();
        assert!(!flag.is_raised());
        flag.raise();
        assert!(flag.is_raised());
        flag.clear();
        assert!(!flag.is_raised());
    }
}
