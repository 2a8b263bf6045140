//! Bounded reconnect supervision.

/// Default number of reconnects after the first failure.
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// How many consecutive transport failures a session tolerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_retries` reconnects.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Returns the reconnect limit.
    #[must_use]
    pub const fn max_retries(self) -> u32 {
        self.max_retries
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

/// Supervisor decision after a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Resolve and connect again.
    Retry {
        /// Failures so far, including this one.
        failures: u32,
    },
    /// The failure budget is spent.
    GiveUp {
        /// Failures so far, including this one.
        failures: u32,
    },
}

/// Counts consecutive transport failures of one session.
///
/// The counter only grows; there is no backoff between attempts.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    policy: RetryPolicy,
    failures: u32,
}

impl Supervisor {
    /// Creates a supervisor with no recorded failures.
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Returns the number of failures recorded so far.
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    /// Records one failure and decides whether to try again.
    pub const fn record_failure(&mut self) -> Verdict {
        self.failures = self.failures.saturating_add(1);
        if self.failures > self.policy.max_retries() {
            Verdict::GiveUp {
                failures: self.failures,
            }
        } else {
            Verdict::Retry {
                failures: self.failures,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        assert_eq!(RetryPolicy::default().max_retries(), 5);
    }

    #[test]
    fn test_gives_up_after_max_plus_one_failures() {
        let mut supervisor = Supervisor::new(RetryPolicy::default());

        for expected in 1..=5 {
            assert_eq!(
                supervisor.record_failure(),
                Verdict::Retry { failures: expected }
            );
        }
        assert_eq!(supervisor.record_failure(), Verdict::GiveUp { failures: 6 });
    }

    #[test]
    fn test_failures_never_decrease() {
        let mut supervisor = Supervisor::new(RetryPolicy::new(2));
        let mut last = supervisor.failures();
        for _ in 0..10 {
            supervisor.record_failure();
            assert!(supervisor.failures() >= last);
            last = supervisor.failures();
        }
        assert_eq!(last, 10);
    }

    #[test]
    fn test_zero_retries_gives_up_immediately() {
        let mut supervisor = Supervisor::new(RetryPolicy::new(0));
        assert_eq!(supervisor.record_failure(), Verdict::GiveUp { failures: 1 });
    }
}
