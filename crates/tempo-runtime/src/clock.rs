//! Time sources for the game loop

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A source of elapsed time for [`GameLoop`](crate::GameLoop).
///
/// `elapsed` must be monotonically non-decreasing from the last `start`.
/// The loop also funnels its fixed-step wait through `sleep`, so a
/// deterministic implementation can advance scripted time instead of
/// blocking the thread.
pub trait Clock {
    /// Reset the reference epoch.
    fn start(&mut self);

    /// Time elapsed since the last `start` (or since construction).
    fn elapsed(&mut self) -> Duration;

    /// Block until roughly `duration` has passed.
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Monotonic wall clock backed by [`std::time::Instant`].
pub struct FrameClock {
    epoch: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FrameClock {
    fn start(&mut self) {
        self.epoch = Instant::now();
    }

    fn elapsed(&mut self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Deterministic clock driven by a script of raw deltas.
///
/// Each `elapsed` call consumes the next delta from the script and adds it
/// to the running total; when the script runs dry, time stands still.
/// `sleep` never blocks. Useful for headless stepping and loop tests.
pub struct ScriptedClock {
    now: Duration,
    deltas: VecDeque<Duration>,
}

impl ScriptedClock {
    pub fn new(deltas: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            now: Duration::ZERO,
            deltas: deltas.into_iter().collect(),
        }
    }

    /// Append one more delta to the script.
    pub fn push(&mut self, delta: Duration) {
        self.deltas.push_back(delta);
    }
}

impl Clock for ScriptedClock {
    fn start(&mut self) {
        self.now = Duration::ZERO;
    }

    fn elapsed(&mut self) -> Duration {
        if let Some(delta) = self.deltas.pop_front() {
            self.now += delta;
        }
        self.now
    }

    fn sleep(&mut self, _duration: Duration) {
        // time advances only through the script
    }
}
