//! Component registry: unified sweeps over the dispatch lists

use tempo_core::{Result, TempoError};

use crate::component::{DrawableComponent, GameComponent};
use crate::dispatch::DispatchList;
use crate::frame::FrameTime;

/// Owns the normal and drawable dispatch lists and exposes unified
/// initialize/update/draw/dispose sweeps.
///
/// Updates sweep the normal list first, then the drawable list; draws
/// only touch the drawable list. Every operation fails with
/// [`TempoError::Disposed`] once the registry has been disposed.
pub struct ComponentRegistry {
    normal: DispatchList<dyn GameComponent>,
    drawable: DispatchList<dyn DrawableComponent>,
    disposed: bool,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self {
            normal: DispatchList::new(),
            drawable: DispatchList::new(),
            disposed: false,
        }
    }

    pub fn add(&mut self, component: Box<dyn GameComponent>) {
        self.normal.add(component);
    }

    pub fn add_drawable(&mut self, component: Box<dyn DrawableComponent>) {
        self.drawable.add(component);
    }

    pub fn add_range(&mut self, components: impl IntoIterator<Item = Box<dyn GameComponent>>) {
        self.normal.add_range(components);
    }

    pub fn add_drawable_range(
        &mut self,
        components: impl IntoIterator<Item = Box<dyn DrawableComponent>>,
    ) {
        self.drawable.add_range(components);
    }

    pub fn len(&self) -> usize {
        self.normal.len() + self.drawable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.drawable.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Initialize every component, normal list first.
    pub fn initialize(&mut self) -> Result<()> {
        self.ensure_not_disposed()?;
        self.normal.initialize_all()?;
        self.drawable.initialize_all()
    }

    /// Update every enabled component, normal list first.
    pub fn update(&mut self, time: &FrameTime) -> Result<()> {
        self.ensure_not_disposed()?;
        self.normal.update_enabled(time)?;
        self.drawable.update_enabled(time)
    }

    /// Draw every visible drawable component.
    pub fn draw(&mut self, time: &FrameTime) -> Result<()> {
        self.ensure_not_disposed()?;
        self.drawable.draw_visible(time)
    }

    /// Dispose every component, normal list first. Idempotent.
    pub fn dispose(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        self.normal.dispose_all()?;
        self.drawable.dispose_all()
    }

    fn ensure_not_disposed(&self) -> Result<()> {
        if self.disposed {
            return Err(TempoError::Disposed("ComponentRegistry"));
        }
        Ok(())
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}
