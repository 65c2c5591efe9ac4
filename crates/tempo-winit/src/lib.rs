//! winit-backed window collaborator
//!
//! Implements [`GameWindow`] over winit's pump-events platform extension
//! so [`tempo_runtime::GameHost`] can drive the OS event loop one batch
//! per tick. Tracks focus, close requests, and the set of held keys; the
//! host clears the key set on deactivation.

use std::collections::HashSet;
use std::time::Duration;

use tempo_core::{Result, TempoError};
use tempo_runtime::{GameWindow, PlatformEvent};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

/// Window creation options.
#[derive(Debug, Clone)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Tempo".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// A [`GameWindow`] over a winit event loop.
///
/// The OS window is created lazily on the first pump (winit delivers
/// `Resumed` before anything else); `show` runs that first pump and makes
/// the window visible.
pub struct WinitWindow {
    event_loop: EventLoop<()>,
    state: PumpState,
}

struct PumpState {
    settings: WindowSettings,
    window: Option<Window>,
    active: bool,
    closed: bool,
    mouse_visible: bool,
    pressed: HashSet<KeyCode>,
    events: Vec<PlatformEvent>,
}

impl WinitWindow {
    pub fn new(settings: WindowSettings) -> Result<Self> {
        let event_loop =
            EventLoop::new().map_err(|e| TempoError::Platform(e.to_string()))?;
        Ok(Self {
            event_loop,
            state: PumpState {
                settings,
                window: None,
                active: false,
                closed: false,
                mouse_visible: false,
                pressed: HashSet::new(),
                events: Vec::new(),
            },
        })
    }

    /// Whether a key is currently held, as of the last pump.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.state.pressed.contains(&key)
    }
}

impl ApplicationHandler for PumpState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(self.settings.width, self.settings.height))
            .with_visible(false);

        match event_loop.create_window(attrs) {
            Ok(window) => {
                window.set_cursor_visible(self.mouse_visible);
                self.window = Some(window);
            }
            Err(e) => {
                eprintln!("failed to create window: {e}");
                self.closed = true;
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if Some(window_id) != self.window.as_ref().map(Window::id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.events.push(PlatformEvent::CloseRequested);
            }
            WindowEvent::Focused(focused) => {
                if self.active != focused {
                    self.active = focused;
                    self.events.push(if focused {
                        PlatformEvent::Activated
                    } else {
                        PlatformEvent::Deactivated
                    });
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if event.state.is_pressed() {
                        self.pressed.insert(code);
                    } else {
                        self.pressed.remove(&code);
                    }
                }
            }
            _ => {}
        }
    }
}

impl GameWindow for WinitWindow {
    fn show(&mut self) -> Result<()> {
        // first pump delivers Resumed and creates the OS window
        self.pump_once();
        if self.state.closed {
            return Err(TempoError::Platform(
                "window was closed during startup".to_string(),
            ));
        }
        if let Some(window) = &self.state.window {
            window.set_visible(true);
        }
        Ok(())
    }

    fn pump_once(&mut self) -> Vec<PlatformEvent> {
        if self.state.closed {
            return Vec::new();
        }

        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.state);
        if let PumpStatus::Exit(_) = status {
            self.state.closed = true;
        }

        std::mem::take(&mut self.state.events)
    }

    fn is_closed(&self) -> bool {
        self.state.closed
    }

    fn is_active(&self) -> bool {
        self.state.active
    }

    fn close(&mut self) {
        self.state.closed = true;
        self.state.window = None;
    }

    fn set_mouse_visible(&mut self, visible: bool) {
        self.state.mouse_visible = visible;
        if let Some(window) = &self.state.window {
            window.set_cursor_visible(visible);
        }
    }

    fn clear_input(&mut self) {
        self.state.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_to_a_windowed_size() {
        let settings = WindowSettings::default();
        assert_eq!(settings.width, 800);
        assert_eq!(settings.height, 600);
        assert_eq!(settings.title, "Tempo");
    }
}
