//! Tempo Runtime - Game loop infrastructure
//!
//! Provides the core game loop building blocks:
//! - `FrameClock` / `Clock` — monotonic time source with a sleep seam
//! - `FrameTime` — the per-tick time record handed to update/draw code
//! - `DispatchList` — ordered update/draw participant collection
//! - `ComponentRegistry` — unified initialize/update/draw/dispose sweeps
//! - `GameLoop` — the fixed/variable timestep accumulator state machine
//! - `GameHost` — wires the loop, the registry, and a window collaborator

mod clock;
mod component;
mod config;
mod dispatch;
mod frame;
mod game_loop;
mod host;
mod platform;
mod registry;

pub use clock::{Clock, FrameClock, ScriptedClock};
pub use component::{DrawableComponent, GameComponent};
pub use config::GameConfig;
pub use dispatch::DispatchList;
pub use frame::FrameTime;
pub use game_loop::{ExitRequest, GameLoop, LoopHandler};
pub use host::GameHost;
pub use platform::{GameWindow, PlatformEvent};
pub use registry::ComponentRegistry;
