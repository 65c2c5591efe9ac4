//! Ordered dispatch collection

use tempo_core::Result;

use crate::component::{DrawableComponent, GameComponent};
use crate::frame::FrameTime;

/// A growable collection of update/draw participants kept sorted by their
/// `update_order` at insertion time.
///
/// Insertion is stable: a new entry lands before the first entry whose
/// order is strictly greater, so equal keys keep their insertion order.
/// The list never compacts; disposal sweeps every entry once and further
/// `dispose_all` calls are no-ops.
pub struct DispatchList<T: ?Sized> {
    entries: Vec<Box<T>>,
    disposed: bool,
}

impl<T: ?Sized> DispatchList<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            disposed: false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl<T: ?Sized> Default for DispatchList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GameComponent + ?Sized> DispatchList<T> {
    /// Insert `component` at the position preserving ascending order.
    pub fn add(&mut self, component: Box<T>) {
        let order = component.update_order();
        let at = self
            .entries
            .iter()
            .position(|entry| entry.update_order() > order)
            .unwrap_or(self.entries.len());
        self.entries.insert(at, component);
    }

    /// Insert every component, in the given order.
    pub fn add_range(&mut self, components: impl IntoIterator<Item = Box<T>>) {
        for component in components {
            self.add(component);
        }
    }

    /// Initialize every entry, in list order.
    pub fn initialize_all(&mut self) -> Result<()> {
        for entry in &mut self.entries {
            entry.initialize()?;
        }
        Ok(())
    }

    /// Update every enabled entry, in list order. A failing entry aborts
    /// the remainder of the sweep.
    pub fn update_enabled(&mut self, time: &FrameTime) -> Result<()> {
        for entry in &mut self.entries {
            if entry.enabled() {
                entry.update(time)?;
            }
        }
        Ok(())
    }

    /// Dispose every entry, in list order. Idempotent.
    pub fn dispose_all(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;

        for entry in &mut self.entries {
            entry.dispose()?;
        }
        Ok(())
    }
}

impl DispatchList<dyn DrawableComponent> {
    /// Draw every visible entry, in list order.
    pub fn draw_visible(&mut self, time: &FrameTime) -> Result<()> {
        for entry in &mut self.entries {
            if entry.visible() {
                entry.draw(time)?;
            }
        }
        Ok(())
    }
}
