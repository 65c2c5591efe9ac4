//! Game host: wires the loop, the registry, and the window collaborator

use std::time::Duration;

use tempo_core::{Result, TempoError};

use crate::clock::Clock;
use crate::config::GameConfig;
use crate::frame::FrameTime;
use crate::game_loop::{ExitRequest, GameLoop, LoopHandler};
use crate::platform::{GameWindow, PlatformEvent};
use crate::registry::ComponentRegistry;

type LifecycleHook = Box<dyn FnMut() -> Result<()>>;
type FrameHook = Box<dyn FnMut(&FrameTime) -> Result<()>>;

/// Owns one [`GameLoop`], one [`ComponentRegistry`], and the window
/// collaborator, and sequences initialization, the pump loop, exit, and
/// disposal.
///
/// Lifecycle hooks are ordered observer lists: they fire in registration
/// order, and a failing hook propagates out of `run`/`tick` untouched.
pub struct GameHost<W: GameWindow> {
    window: W,
    game_loop: GameLoop,
    components: ComponentRegistry,
    config: GameConfig,

    initialized: bool,
    disposed: bool,

    initialize_hooks: Vec<LifecycleHook>,
    load_hooks: Vec<LifecycleHook>,
    update_hooks: Vec<FrameHook>,
    draw_hooks: Vec<FrameHook>,
    unload_hooks: Vec<LifecycleHook>,
    activated_hooks: Vec<LifecycleHook>,
    deactivated_hooks: Vec<LifecycleHook>,
    exiting_hooks: Vec<LifecycleHook>,
    disposed_hooks: Vec<LifecycleHook>,
}

impl<W: GameWindow> GameHost<W> {
    /// Build a host over the monotonic wall clock.
    pub fn new(config: GameConfig, window: W) -> Result<Self> {
        Self::build(config, window, GameLoop::new())
    }

    /// Build a host over a caller-supplied clock (headless runs, tests).
    pub fn with_clock(config: GameConfig, window: W, clock: Box<dyn Clock>) -> Result<Self> {
        Self::build(config, window, GameLoop::with_clock(clock))
    }

    fn build(config: GameConfig, window: W, mut game_loop: GameLoop) -> Result<Self> {
        config.validate()?;

        game_loop.set_fixed_time_step(config.is_fixed_time_step);
        game_loop.set_target_elapsed_time(config.target_elapsed_time())?;
        game_loop.set_max_elapsed_time(config.max_elapsed_time())?;

        Ok(Self {
            window,
            game_loop,
            components: ComponentRegistry::new(),
            config,
            initialized: false,
            disposed: false,
            initialize_hooks: Vec::new(),
            load_hooks: Vec::new(),
            update_hooks: Vec::new(),
            draw_hooks: Vec::new(),
            unload_hooks: Vec::new(),
            activated_hooks: Vec::new(),
            deactivated_hooks: Vec::new(),
            exiting_hooks: Vec::new(),
            disposed_hooks: Vec::new(),
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    pub fn components_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.components
    }

    pub fn is_active(&self) -> bool {
        self.window.is_active()
    }

    pub fn fps(&self) -> f32 {
        self.game_loop.fps()
    }

    pub fn frame_time(&self) -> &FrameTime {
        self.game_loop.frame_time()
    }

    /// Handle game code can hold to request exit from inside a callback.
    ///
    /// A request raised during an update makes the loop abandon that
    /// tick's draw phase; the run loop then closes the window before the
    /// next tick.
    pub fn exit_handle(&self) -> ExitRequest {
        self.game_loop.exit_handle()
    }

    /// Switch between fixed and variable stepping at runtime.
    pub fn set_fixed_time_step(&mut self, fixed: bool) {
        self.config.is_fixed_time_step = fixed;
        self.game_loop.set_fixed_time_step(fixed);
    }

    /// Change the fixed-step quantum at runtime. Rejects zero.
    pub fn set_target_elapsed_time(&mut self, value: Duration) -> Result<()> {
        self.game_loop.set_target_elapsed_time(value)?;
        self.config.target_elapsed_ms = value.as_secs_f64() * 1000.0;
        Ok(())
    }

    /// Change the per-tick backlog clamp at runtime. Rejects values below
    /// the current target.
    pub fn set_max_elapsed_time(&mut self, value: Duration) -> Result<()> {
        self.game_loop.set_max_elapsed_time(value)?;
        self.config.max_elapsed_ms = value.as_secs_f64() * 1000.0;
        Ok(())
    }

    /// Change how long `tick` sleeps while the window is inactive.
    /// Rejects negative and non-finite values.
    pub fn set_inactive_sleep_ms(&mut self, ms: f64) -> Result<()> {
        if !ms.is_finite() || ms < 0.0 {
            return Err(TempoError::InvalidConfig(
                "inactive sleep time must not be negative".into(),
            ));
        }
        self.config.inactive_sleep_ms = ms;
        Ok(())
    }

    pub fn on_initialize(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.initialize_hooks.push(Box::new(hook));
    }

    pub fn on_load(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.load_hooks.push(Box::new(hook));
    }

    pub fn on_update(&mut self, hook: impl FnMut(&FrameTime) -> Result<()> + 'static) {
        self.update_hooks.push(Box::new(hook));
    }

    pub fn on_draw(&mut self, hook: impl FnMut(&FrameTime) -> Result<()> + 'static) {
        self.draw_hooks.push(Box::new(hook));
    }

    pub fn on_unload(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.unload_hooks.push(Box::new(hook));
    }

    pub fn on_activated(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.activated_hooks.push(Box::new(hook));
    }

    pub fn on_deactivated(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.deactivated_hooks.push(Box::new(hook));
    }

    pub fn on_exiting(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.exiting_hooks.push(Box::new(hook));
    }

    pub fn on_disposed(&mut self, hook: impl FnMut() -> Result<()> + 'static) {
        self.disposed_hooks.push(Box::new(hook));
    }

    /// Initialize once, show the window, and pump until it closes.
    ///
    /// Each pump iteration processes window notifications and then runs
    /// one tick. A failing callback propagates out of this method with no
    /// recovery; disposal still happens when the host is dropped.
    pub fn run(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;

        if !self.initialized {
            self.do_initialize()?;
            self.initialized = true;
        }

        self.window.set_mouse_visible(self.config.is_mouse_visible);
        self.window.show()?;
        self.game_loop.start();

        while !self.window.is_closed() {
            self.process_window_events()?;
            if self.window.is_closed() {
                break;
            }

            self.tick()?;

            if self.game_loop.take_exit_request() {
                self.exit();
            }
        }

        self.do_exiting()
    }

    /// Run one iteration of the loop: consult the clock, dispatch zero or
    /// more updates, then the draw fan-out.
    pub fn tick(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;

        let inactive_sleep = self.config.inactive_sleep_time();
        if !self.window.is_active() && !inactive_sleep.is_zero() {
            std::thread::sleep(inactive_sleep);
        }

        let Self {
            game_loop,
            components,
            update_hooks,
            draw_hooks,
            ..
        } = self;

        let mut frame = HostFrame {
            components,
            update_hooks,
            draw_hooks,
        };
        game_loop.tick(&mut frame)
    }

    /// Request window close and suppress any frame still queued.
    pub fn exit(&mut self) {
        self.window.close();
        self.game_loop.suppress_draw();
    }

    /// Skip the draw phase of the next tick.
    pub fn suppress_draw(&mut self) {
        self.game_loop.suppress_draw();
    }

    /// Tear down the registry and the window collaborator. Idempotent.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        self.components.dispose()?;
        self.window.close();

        for hook in &mut self.disposed_hooks {
            hook()?;
        }
        Ok(())
    }

    fn do_initialize(&mut self) -> Result<()> {
        for hook in &mut self.initialize_hooks {
            hook()?;
        }
        self.components.initialize()?;
        for hook in &mut self.load_hooks {
            hook()?;
        }
        Ok(())
    }

    fn do_exiting(&mut self) -> Result<()> {
        for hook in &mut self.exiting_hooks {
            hook()?;
        }
        for hook in &mut self.unload_hooks {
            hook()?;
        }
        Ok(())
    }

    fn process_window_events(&mut self) -> Result<()> {
        for event in self.window.pump_once() {
            match event {
                PlatformEvent::Activated => {
                    for hook in &mut self.activated_hooks {
                        hook()?;
                    }
                }
                PlatformEvent::Deactivated => {
                    // deactivation drops whatever input the window has
                    // accumulated, so focus regain starts clean
                    self.window.clear_input();
                    for hook in &mut self.deactivated_hooks {
                        hook()?;
                    }
                }
                PlatformEvent::CloseRequested => self.window.close(),
            }
        }
        Ok(())
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed {
            return Err(TempoError::Disposed("GameHost"));
        }
        Ok(())
    }
}

impl<W: GameWindow> Drop for GameHost<W> {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

/// One tick's dispatch view over the host: components first, then the
/// registered hooks, both in order.
struct HostFrame<'a> {
    components: &'a mut ComponentRegistry,
    update_hooks: &'a mut Vec<FrameHook>,
    draw_hooks: &'a mut Vec<FrameHook>,
}

impl LoopHandler for HostFrame<'_> {
    fn update(&mut self, time: &FrameTime) -> Result<()> {
        self.components.update(time)?;
        for hook in self.update_hooks.iter_mut() {
            hook(time)?;
        }
        Ok(())
    }

    fn draw(&mut self, time: &FrameTime) -> Result<()> {
        self.components.draw(time)?;
        for hook in self.draw_hooks.iter_mut() {
            hook(time)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ScriptedClock;
    use crate::component::{DrawableComponent, GameComponent};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct FakeWindow {
        shown: bool,
        closed: bool,
        active: bool,
        mouse_visible: Option<bool>,
        input_clears: u32,
        pump_count: u32,
        close_after_pumps: Option<u32>,
        queued_events: VecDeque<Vec<PlatformEvent>>,
    }

    impl FakeWindow {
        fn new() -> Self {
            Self {
                shown: false,
                closed: false,
                active: true,
                mouse_visible: None,
                input_clears: 0,
                pump_count: 0,
                close_after_pumps: None,
                queued_events: VecDeque::new(),
            }
        }

        fn closing_after(pumps: u32) -> Self {
            Self {
                close_after_pumps: Some(pumps),
                ..Self::new()
            }
        }
    }

    impl GameWindow for FakeWindow {
        fn show(&mut self) -> Result<()> {
            self.shown = true;
            Ok(())
        }

        fn pump_once(&mut self) -> Vec<PlatformEvent> {
            self.pump_count += 1;
            if let Some(limit) = self.close_after_pumps {
                if self.pump_count >= limit {
                    self.closed = true;
                }
            }
            self.queued_events.pop_front().unwrap_or_default()
        }

        fn is_closed(&self) -> bool {
            self.closed
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn close(&mut self) {
            self.closed = true;
        }

        fn set_mouse_visible(&mut self, visible: bool) {
            self.mouse_visible = Some(visible);
        }

        fn clear_input(&mut self) {
            self.input_clears += 1;
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn test_config() -> GameConfig {
        GameConfig {
            target_elapsed_ms: 10.0,
            inactive_sleep_ms: 0.0,
            ..GameConfig::default()
        }
    }

    fn host_with_deltas(window: FakeWindow, deltas: &[u64]) -> GameHost<FakeWindow> {
        let clock = ScriptedClock::new(deltas.iter().map(|&d| ms(d)));
        GameHost::with_clock(test_config(), window, Box::new(clock)).unwrap()
    }

    fn push_hook(log: &Log, entry: &'static str) -> impl FnMut() -> Result<()> {
        let log = log.clone();
        move || {
            log.borrow_mut().push(entry.to_string());
            Ok(())
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let config = GameConfig {
            target_elapsed_ms: -5.0,
            ..GameConfig::default()
        };
        assert!(GameHost::new(config, FakeWindow::new()).is_err());
    }

    #[test]
    fn run_initializes_once_then_pumps_until_closed() {
        let log = Log::default();
        let mut host = host_with_deltas(FakeWindow::closing_after(3), &[10, 10]);

        host.on_initialize(push_hook(&log, "initialize"));
        host.on_load(push_hook(&log, "load"));
        host.on_exiting(push_hook(&log, "exiting"));
        host.on_unload(push_hook(&log, "unload"));
        {
            let log = log.clone();
            host.on_update(move |_| {
                log.borrow_mut().push("update".into());
                Ok(())
            });
        }
        {
            let log = log.clone();
            host.on_draw(move |_| {
                log.borrow_mut().push("draw".into());
                Ok(())
            });
        }

        host.run().unwrap();

        assert!(host.window().shown);
        assert_eq!(
            log.borrow().as_slice(),
            [
                "initialize",
                "load",
                "update",
                "draw",
                "update",
                "draw",
                "exiting",
                "unload"
            ]
        );

        // a second run does not re-initialize
        host.run().unwrap();
        assert_eq!(log.borrow().iter().filter(|e| *e == "initialize").count(), 1);
    }

    #[test]
    fn mouse_visibility_is_applied_on_run() {
        let mut host = host_with_deltas(FakeWindow::closing_after(1), &[]);
        host.run().unwrap();
        assert_eq!(host.window().mouse_visible, Some(false));
    }

    #[test]
    fn deactivation_clears_window_input_and_fires_hooks() {
        let log = Log::default();
        let mut window = FakeWindow::closing_after(2);
        window
            .queued_events
            .push_back(vec![PlatformEvent::Deactivated, PlatformEvent::Activated]);
        window.active = true;

        let mut host = host_with_deltas(window, &[10]);
        host.on_deactivated(push_hook(&log, "deactivated"));
        host.on_activated(push_hook(&log, "activated"));

        host.run().unwrap();

        assert_eq!(host.window().input_clears, 1);
        assert_eq!(log.borrow().as_slice(), ["deactivated", "activated"]);
    }

    #[test]
    fn close_requested_event_ends_the_run() {
        let mut window = FakeWindow::new();
        window
            .queued_events
            .push_back(vec![PlatformEvent::CloseRequested]);

        let mut host = host_with_deltas(window, &[]);
        host.run().unwrap();

        assert!(host.window().is_closed());
        assert_eq!(host.window().pump_count, 1);
    }

    #[test]
    fn exit_handle_stops_the_run_after_the_current_tick() {
        let updates = Rc::new(Cell::new(0u32));
        let mut host = host_with_deltas(FakeWindow::new(), &[10, 10]);

        let exit = host.exit_handle();
        {
            let updates = updates.clone();
            host.on_update(move |_| {
                updates.set(updates.get() + 1);
                if updates.get() == 2 {
                    exit.request();
                }
                Ok(())
            });
        }

        host.run().unwrap();
        assert_eq!(updates.get(), 2);
        assert!(host.window().is_closed());
    }

    #[test]
    fn exit_requested_mid_update_renders_no_frame_after_request() {
        let updates = Rc::new(Cell::new(0u32));
        let draws = Rc::new(Cell::new(0u32));
        let mut host = host_with_deltas(FakeWindow::new(), &[10, 10]);

        let exit = host.exit_handle();
        {
            let updates = updates.clone();
            host.on_update(move |_| {
                updates.set(updates.get() + 1);
                if updates.get() == 2 {
                    exit.request();
                }
                Ok(())
            });
        }
        {
            let draws = draws.clone();
            host.on_draw(move |_| {
                draws.set(draws.get() + 1);
                Ok(())
            });
        }

        host.run().unwrap();

        assert_eq!(updates.get(), 2);
        // the first tick drew; the tick that raised the exit did not
        assert_eq!(draws.get(), 1);
        assert!(host.window().is_closed());
    }

    #[test]
    fn runtime_setters_validate_and_apply() {
        let mut host = host_with_deltas(FakeWindow::new(), &[]);

        assert!(host.set_target_elapsed_time(Duration::ZERO).is_err());
        host.set_target_elapsed_time(ms(20)).unwrap();
        assert!((host.config().target_elapsed_ms - 20.0).abs() < 1e-9);

        assert!(host.set_max_elapsed_time(ms(10)).is_err());
        host.set_max_elapsed_time(ms(40)).unwrap();
        assert!((host.config().max_elapsed_ms - 40.0).abs() < 1e-9);

        assert!(host.set_inactive_sleep_ms(-1.0).is_err());
        assert!(host.set_inactive_sleep_ms(f64::NAN).is_err());
        host.set_inactive_sleep_ms(5.0).unwrap();
        assert!((host.config().inactive_sleep_ms - 5.0).abs() < 1e-9);

        host.set_fixed_time_step(false);
        assert!(!host.config().is_fixed_time_step);
    }

    #[test]
    fn retargeted_step_drives_the_loop() {
        let updates = Rc::new(Cell::new(0u32));
        let mut host = host_with_deltas(FakeWindow::new(), &[40]);
        host.set_target_elapsed_time(ms(20)).unwrap();
        {
            let updates = updates.clone();
            host.on_update(move |_| {
                updates.set(updates.get() + 1);
                Ok(())
            });
        }

        host.tick().unwrap();

        assert_eq!(updates.get(), 2);
        assert_eq!(host.frame_time().elapsed, ms(40));
    }

    #[test]
    fn components_update_before_hooks() {
        let log = Log::default();

        struct Part {
            log: Log,
        }

        impl GameComponent for Part {
            fn update(&mut self, _time: &FrameTime) -> Result<()> {
                self.log.borrow_mut().push("component update".into());
                Ok(())
            }
        }

        impl DrawableComponent for Part {
            fn draw(&mut self, _time: &FrameTime) -> Result<()> {
                self.log.borrow_mut().push("component draw".into());
                Ok(())
            }
        }

        let mut host = host_with_deltas(FakeWindow::new(), &[10]);
        host.components_mut()
            .add_drawable(Box::new(Part { log: log.clone() }));
        {
            let log = log.clone();
            host.on_update(move |_| {
                log.borrow_mut().push("hook update".into());
                Ok(())
            });
        }
        {
            let log = log.clone();
            host.on_draw(move |_| {
                log.borrow_mut().push("hook draw".into());
                Ok(())
            });
        }

        host.tick().unwrap();
        assert_eq!(
            log.borrow().as_slice(),
            [
                "component update",
                "hook update",
                "component draw",
                "hook draw"
            ]
        );
    }

    #[test]
    fn suppress_draw_skips_one_draw_phase() {
        let draws = Rc::new(Cell::new(0u32));
        let mut host = host_with_deltas(FakeWindow::new(), &[10, 10]);
        {
            let draws = draws.clone();
            host.on_draw(move |_| {
                draws.set(draws.get() + 1);
                Ok(())
            });
        }

        host.suppress_draw();
        host.tick().unwrap();
        assert_eq!(draws.get(), 0);

        host.tick().unwrap();
        assert_eq!(draws.get(), 1);
    }

    #[test]
    fn tick_after_dispose_fails() {
        let mut host = host_with_deltas(FakeWindow::new(), &[10]);
        host.dispose().unwrap();

        let err = host.tick().unwrap_err();
        assert!(matches!(err, TempoError::Disposed("GameHost")));
        assert!(host.run().is_err());
    }

    #[test]
    fn dispose_is_idempotent_and_tears_down_the_window() {
        let disposals = Rc::new(Cell::new(0u32));
        let mut host = host_with_deltas(FakeWindow::new(), &[]);
        {
            let disposals = disposals.clone();
            host.on_disposed(move || {
                disposals.set(disposals.get() + 1);
                Ok(())
            });
        }

        host.dispose().unwrap();
        host.dispose().unwrap();

        assert_eq!(disposals.get(), 1);
        assert!(host.window().is_closed());
    }

    #[test]
    fn failing_update_hook_propagates_out_of_run() {
        let mut host = host_with_deltas(FakeWindow::new(), &[10]);
        host.on_update(|_| Err(TempoError::Hook("game logic broke".into())));

        let err = host.run().unwrap_err();
        assert!(matches!(err, TempoError::Hook(_)));
    }
}
