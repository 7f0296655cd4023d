//! Tick counter that fires after a configured number of ticks.

use crate::id::Ticks;

/// Counts ticks toward a duration and reports when it is reached.
///
/// A running timer increments once per [`advance`](Timer::advance) and fires
/// when the count reaches the duration, starting over from zero. A stopped
/// timer ignores ticks until [`reset`](Timer::reset). A duration of 0 fires
/// on every tick, the same as 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    duration: Ticks,
    elapsed: Ticks,
    stopped: bool,
}

impl Timer {
    pub fn new(duration: Ticks) -> Self {
        Self {
            duration,
            elapsed: 0,
            stopped: false,
        }
    }

    /// Count one tick. Returns `true` when the timer fires.
    pub fn advance(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.elapsed += 1;
        if self.elapsed >= self.duration {
            self.elapsed = 0;
            return true;
        }
        false
    }

    /// Halt counting and zero the counter.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.elapsed = 0;
    }

    /// Resume counting from zero.
    pub fn reset(&mut self) {
        self.stopped = false;
        self.elapsed = 0;
    }

    pub fn duration(&self) -> Ticks {
        self.duration
    }

    /// Ticks counted since the last fire or reset.
    pub fn elapsed(&self) -> Ticks {
        self.elapsed
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}
