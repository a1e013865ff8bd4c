use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time for countdowns
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Production clock backed by [`Instant::now`]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Simulated clock for tests and headless runs.
///
/// Clones share the same time, so a test can keep one handle and move the
/// other into the code under test.
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountdownState {
    Running,
    Done,
    Cancelled,
}

/// Cancellable countdown that fires once per interval until `total` runs out.
///
/// The countdown does not own a thread. Its owner polls it with the current
/// time and gets back one due tick per call, so ticks are never merged or
/// skipped when polling falls behind.
#[derive(Clone, Debug)]
pub struct Countdown {
    total: Duration,
    interval: Duration,
    started_at: Instant,
    ticks: u32,
    state: CountdownState,
}

impl Countdown {
    pub fn start(total: Duration, interval: Duration, now: Instant) -> Self {
        let state = if total.is_zero() || interval.is_zero() {
            CountdownState::Done
        } else {
            CountdownState::Running
        };
        Self {
            total,
            interval,
            started_at: now,
            ticks: 0,
            state,
        }
    }

    /// Deliver the next due tick, if any, as the time left until the countdown finishes
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        if self.state != CountdownState::Running {
            return None;
        }

        let next_due = self.started_at + self.interval * (self.ticks + 1);
        if now < next_due {
            return None;
        }

        self.ticks += 1;
        let until_finished = self.total.saturating_sub(self.interval * self.ticks);
        if until_finished.is_zero() {
            self.state = CountdownState::Done;
        }
        Some(until_finished)
    }

    pub fn cancel(&mut self) {
        if self.state == CountdownState::Running {
            self.state = CountdownState::Cancelled;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == CountdownState::Running
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == CountdownState::Cancelled
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
