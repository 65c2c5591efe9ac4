//! Per-tick time record

use std::fmt;
use std::time::Duration;

/// Snapshot of game time handed to every update/draw participant each tick.
///
/// `elapsed` is the logical time covered by the current step: the fixed
/// quantum during fixed-step updates, the full raw delta in variable mode.
/// After a fixed-step tick it is rewritten to the total time the tick
/// covered, so draw code sees the whole span even though each update saw
/// one quantum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameTime {
    /// Total game time since the loop started.
    pub total: Duration,
    /// Logical time covered by the current step.
    pub elapsed: Duration,
    /// True while the simulation is lagging behind real time.
    pub running_slow: bool,
}

impl FrameTime {
    pub fn new(total: Duration, elapsed: Duration) -> Self {
        Self {
            total,
            elapsed,
            running_slow: false,
        }
    }

    /// The elapsed step as fractional seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Delta: {}, Lag: {}",
            self.elapsed.as_secs_f64(),
            self.running_slow
        )
    }
}
