//! Bounded polling of a test run.
//!
//! ```text
//!  Created ──warm-up──► Polling ──inProgress=false──► Completed
//!                          │
//!                          └──deadline reached──────► TimedOut
//! ```
//!
//! The deadline is `start + timeout + grace`, measured on the monotonic
//! clock from the end of the warm-up.

use std::time::Duration;

use tokio::time::Instant;

use crate::client::TestRunStatus;

/// Pause between creating a run and the first status check.
pub const WARM_UP: Duration = Duration::from_secs(1);

/// Pause between two status checks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Added to the requested timeout to cover server-side timeout handling.
pub const DEADLINE_GRACE: Duration = Duration::from_secs(10);

/// Timing of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub warm_up: Duration,
    pub interval: Duration,
    pub grace: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            warm_up: WARM_UP,
            interval: POLL_INTERVAL,
            grace: DEADLINE_GRACE,
        }
    }
}

impl PollSchedule {
    /// Deadline for a run with the given server-side timeout, starting at `start`.
    pub fn deadline_from(&self, start: Instant, timeout_millis: u64) -> Instant {
        start + Duration::from_millis(timeout_millis) + self.grace
    }
}

/// Where a test run's polling stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// Run created, no status fetched yet.
    Created,
    /// At least one status fetched, run still in progress.
    Polling,
    /// The server reported the run finished.
    Completed,
    /// The deadline passed while the run was still in progress.
    TimedOut,
}

impl PollState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PollState::Completed | PollState::TimedOut)
    }
}

/// Tracks the poll state machine for a single test run.
#[derive(Debug, Clone)]
pub struct PollTracker {
    state: PollState,
    deadline: Instant,
    success: bool,
    polls: usize,
}

impl PollTracker {
    pub fn new(deadline: Instant) -> Self {
        Self {
            state: PollState::Created,
            deadline,
            success: false,
            polls: 0,
        }
    }

    /// Whether another status fetch should happen at `now`.
    ///
    /// Moves to [`PollState::TimedOut`] once `now` reaches the deadline.
    pub fn should_poll(&mut self, now: Instant) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if now >= self.deadline {
            self.state = PollState::TimedOut;
            return false;
        }
        true
    }

    /// Record a fetched status and return the new state.
    pub fn observe(&mut self, status: &TestRunStatus) -> PollState {
        self.polls += 1;
        self.success = status.success;
        self.state = if status.in_progress {
            PollState::Polling
        } else {
            PollState::Completed
        };
        self.state
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Last observed success flag; `false` until a status says otherwise.
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn polls(&self) -> usize {
        self.polls
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::status;

    #[test]
    fn test_default_schedule() {
        let schedule = PollSchedule::default();
        assert_eq!(schedule.warm_up, Duration::from_secs(1));
        assert_eq!(schedule.interval, Duration::from_secs(2));
        assert_eq!(schedule.grace, Duration::from_secs(10));
    }

    #[test]
    fn test_deadline_adds_grace() {
        let start = Instant::now();
        let deadline = PollSchedule::default().deadline_from(start, 5_000);
        assert_eq!(deadline - start, Duration::from_millis(15_000));
    }

    #[test]
    fn test_completes_when_not_in_progress() {
        let start = Instant::now();
        let mut tracker = PollTracker::new(start + Duration::from_secs(60));
        assert_eq!(tracker.state(), PollState::Created);

        assert!(tracker.should_poll(start));
        assert_eq!(tracker.observe(&status("t1", true, false)), PollState::Polling);
        assert!(tracker.should_poll(start));
        assert_eq!(tracker.observe(&status("t1", false, true)), PollState::Completed);

        assert!(!tracker.should_poll(start));
        assert!(tracker.success());
        assert_eq!(tracker.polls(), 2);
    }

    #[test]
    fn test_times_out_at_deadline() {
        let start = Instant::now();
        let deadline = start + Duration::from_secs(3);
        let mut tracker = PollTracker::new(deadline);

        assert!(tracker.should_poll(start));
        tracker.observe(&status("t1", true, false));

        assert!(!tracker.should_poll(deadline));
        assert_eq!(tracker.state(), PollState::TimedOut);
        assert!(!tracker.success());
    }

    #[test]
    fn test_deadline_already_passed() {
        let start = Instant::now();
        let mut tracker = PollTracker::new(start);
        assert!(!tracker.should_poll(start));
        assert_eq!(tracker.state(), PollState::TimedOut);
        assert_eq!(tracker.polls(), 0);
        assert!(!tracker.success());
    }

    #[test]
    fn test_completed_run_ignores_deadline() {
        let start = Instant::now();
        let deadline = start + Duration::from_secs(1);
        let mut tracker = PollTracker::new(deadline);
        assert!(tracker.should_poll(start));
        tracker.observe(&status("t1", false, false));

        // Stays Completed even when checked after the deadline
        assert!(!tracker.should_poll(deadline + Duration::from_secs(5)));
        assert_eq!(tracker.state(), PollState::Completed);
    }
}
