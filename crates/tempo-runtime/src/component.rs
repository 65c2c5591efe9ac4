//! Component traits dispatched by the game loop

use tempo_core::Result;

use crate::frame::FrameTime;

/// An update participant owned by a [`ComponentRegistry`](crate::ComponentRegistry).
///
/// Components are swept in ascending `update_order`; ties keep insertion
/// order. A component reporting `enabled() == false` is skipped by the
/// update sweep but still initialized and disposed.
pub trait GameComponent {
    /// Called once before the first update.
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called every logical step the component is enabled for.
    fn update(&mut self, time: &FrameTime) -> Result<()>;

    /// Called when the owning registry is disposed.
    fn dispose(&mut self) -> Result<()> {
        Ok(())
    }

    fn enabled(&self) -> bool {
        true
    }

    /// Sort key for the dispatch list. Read at insertion time only:
    /// changing it afterwards does not reposition the component.
    fn update_order(&self) -> i32 {
        0
    }
}

/// A component that also takes part in the draw sweep.
pub trait DrawableComponent: GameComponent {
    /// Called once per rendered frame while `visible() == true`.
    fn draw(&mut self, time: &FrameTime) -> Result<()>;

    fn visible(&self) -> bool {
        true
    }
}
