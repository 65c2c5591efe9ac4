//! Window collaborator contract

use tempo_core::Result;

/// Notification surfaced by the window collaborator during a pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    /// The window gained focus.
    Activated,
    /// The window lost focus.
    Deactivated,
    /// The user asked the window to close.
    CloseRequested,
}

/// The platform surface [`GameHost`](crate::GameHost) drives.
///
/// The host owns the loop; the collaborator owns the OS window and any
/// accumulated input state. `pump_once` processes one batch of pending
/// platform events without blocking for long and reports the
/// notifications the host cares about, in the order they arrived.
pub trait GameWindow {
    /// Make the window visible. Called once at the start of `run`.
    fn show(&mut self) -> Result<()>;

    /// Process one batch of pending platform events.
    fn pump_once(&mut self) -> Vec<PlatformEvent>;

    /// True once the window has been closed or torn down.
    fn is_closed(&self) -> bool;

    /// Focus state.
    fn is_active(&self) -> bool;

    /// Request teardown. Takes effect by the next `is_closed` poll.
    fn close(&mut self);

    /// Show or hide the OS cursor over the window.
    fn set_mouse_visible(&mut self, visible: bool);

    /// Drop any accumulated input state (pressed keys, held buttons).
    /// The host calls this when the window deactivates.
    fn clear_input(&mut self);
}
