//! Fixed/variable timestep accumulator state machine

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use tempo_core::{Result, TempoError};

use crate::clock::{Clock, FrameClock};
use crate::frame::FrameTime;

/// Number of instantaneous FPS samples averaged into the reported FPS.
const FPS_WINDOW: usize = 100;

/// Consecutive-frame lag threshold that flips `running_slow` on.
const LAG_THRESHOLD: u32 = 5;

/// Receives the update/draw dispatch of one [`GameLoop`] tick.
///
/// Errors are not caught by the loop; they propagate to the caller of
/// `tick` with the accumulator mutations already applied.
pub trait LoopHandler {
    fn update(&mut self, time: &FrameTime) -> Result<()>;

    /// Gate before the draw fan-out. Returning `false` skips `draw` and
    /// `end_draw` for this tick.
    fn begin_draw(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn draw(&mut self, time: &FrameTime) -> Result<()>;

    fn end_draw(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Cloneable handle that asks the loop's owner to stop ticking.
///
/// The request takes effect within the tick in flight: once raised, that
/// tick skips its draw phase (and the FPS sample that goes with it), so a
/// frame the game asked to abandon is never rendered. The owner consumes
/// the flag between ticks.
#[derive(Clone, Default)]
pub struct ExitRequest(Rc<Cell<bool>>);

impl ExitRequest {
    pub fn request(&self) {
        self.0.set(true);
    }

    pub fn is_requested(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn take(&self) -> bool {
        self.0.replace(false)
    }
}

/// The timestep accumulator driving update and draw dispatch.
///
/// In fixed-step mode every update covers exactly the target quantum and
/// a tick runs as many steps as the accumulator affords, sleeping first
/// if not even one quantum has passed. In variable mode a tick runs
/// exactly one update covering whatever real time elapsed.
pub struct GameLoop {
    clock: Box<dyn Clock>,
    is_fixed_time_step: bool,
    target_elapsed_time: Duration,
    max_elapsed_time: Duration,

    accumulated: Duration,
    previous_elapsed: Duration,
    update_frame_lag: u32,
    suppress_draw: bool,
    exit_request: ExitRequest,

    time: FrameTime,
    fps_window: VecDeque<f32>,
    fps: f32,
}

impl GameLoop {
    /// A fixed-step 60 Hz loop over the monotonic wall clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(FrameClock::new()))
    }

    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            is_fixed_time_step: true,
            target_elapsed_time: Duration::from_nanos(16_666_700), // 60 Hz
            max_elapsed_time: Duration::from_millis(500),
            accumulated: Duration::ZERO,
            previous_elapsed: Duration::ZERO,
            update_frame_lag: 0,
            suppress_draw: false,
            exit_request: ExitRequest::default(),
            time: FrameTime::default(),
            fps_window: VecDeque::with_capacity(FPS_WINDOW),
            fps: 0.0,
        }
    }

    pub fn is_fixed_time_step(&self) -> bool {
        self.is_fixed_time_step
    }

    pub fn set_fixed_time_step(&mut self, fixed: bool) {
        self.is_fixed_time_step = fixed;
    }

    pub fn target_elapsed_time(&self) -> Duration {
        self.target_elapsed_time
    }

    pub fn set_target_elapsed_time(&mut self, value: Duration) -> Result<()> {
        if value.is_zero() {
            return Err(TempoError::InvalidConfig(
                "target elapsed time must be greater than zero".into(),
            ));
        }
        self.target_elapsed_time = value;
        Ok(())
    }

    pub fn max_elapsed_time(&self) -> Duration {
        self.max_elapsed_time
    }

    pub fn set_max_elapsed_time(&mut self, value: Duration) -> Result<()> {
        if value < self.target_elapsed_time {
            return Err(TempoError::InvalidConfig(
                "max elapsed time must be at least the target elapsed time".into(),
            ));
        }
        self.max_elapsed_time = value;
        Ok(())
    }

    /// Skip the draw phase of the next tick. Consumed once.
    pub fn suppress_draw(&mut self) {
        self.suppress_draw = true;
    }

    /// Handle game code can hold to request exit from inside a callback.
    pub fn exit_handle(&self) -> ExitRequest {
        self.exit_request.clone()
    }

    pub(crate) fn take_exit_request(&mut self) -> bool {
        self.exit_request.take()
    }

    /// Reported FPS: mean over the bounded sample window.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_time(&self) -> &FrameTime {
        &self.time
    }

    /// Reset the clock epoch and drop any carried time.
    pub fn start(&mut self) {
        self.clock.start();
        self.previous_elapsed = Duration::ZERO;
        self.accumulated = Duration::ZERO;
    }

    /// Run one tick: fold in the raw clock delta, execute zero or more
    /// fixed steps (or one variable step), then the draw phase unless it
    /// was suppressed.
    pub fn tick(&mut self, handler: &mut dyn LoopHandler) -> Result<()> {
        self.advance_clock();

        if self.is_fixed_time_step {
            // Not even one quantum has passed: wait it out and resample,
            // so no zero-length step ever reaches an update.
            while self.accumulated < self.target_elapsed_time {
                let wait = self.target_elapsed_time - self.accumulated;
                self.clock.sleep(wait);
                self.advance_clock();
            }
        }

        // Drop unprocessable backlog rather than spiral.
        if self.accumulated > self.max_elapsed_time {
            self.accumulated = self.max_elapsed_time;
        }

        if self.is_fixed_time_step {
            self.time.elapsed = self.target_elapsed_time;
            let mut step_count: u32 = 0;

            while self.accumulated >= self.target_elapsed_time {
                self.time.total += self.target_elapsed_time;
                self.accumulated -= self.target_elapsed_time;
                step_count += 1;

                handler.update(&self.time)?;
            }

            self.update_frame_lag += step_count.saturating_sub(1);

            if self.time.running_slow && self.update_frame_lag == 0 {
                self.time.running_slow = false;
            } else if self.update_frame_lag >= LAG_THRESHOLD {
                self.time.running_slow = true;
            }

            if step_count == 1 && self.update_frame_lag > 0 {
                self.update_frame_lag -= 1;
            }

            // Draw sees the whole span the tick covered.
            self.time.elapsed = self.target_elapsed_time * step_count;
        } else {
            self.time.elapsed = self.accumulated;
            self.time.total += self.accumulated;
            self.accumulated = Duration::ZERO;

            handler.update(&self.time)?;
        }

        if self.suppress_draw {
            self.suppress_draw = false;
        } else if self.exit_request.is_requested() {
            // an exit raised during update abandons this frame: no draw,
            // no FPS sample
        } else {
            self.do_draw(handler)?;
        }

        Ok(())
    }

    fn advance_clock(&mut self) {
        let current = self.clock.elapsed();
        // A foreign clock may run backwards; treat that as no time passing.
        let raw_delta = current
            .checked_sub(self.previous_elapsed)
            .unwrap_or(Duration::ZERO);
        self.previous_elapsed = current;
        self.accumulated += raw_delta;
    }

    fn do_draw(&mut self, handler: &mut dyn LoopHandler) -> Result<()> {
        let instantaneous = 1.0 / self.time.delta_seconds();

        if self.fps_window.len() == FPS_WINDOW {
            self.fps_window.pop_front();
        }
        self.fps_window.push_back(instantaneous);
        self.fps = self.fps_window.iter().sum::<f32>() / self.fps_window.len() as f32;

        if handler.begin_draw()? {
            handler.draw(&self.time)?;
            handler.end_draw()?;
        }
        Ok(())
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}
