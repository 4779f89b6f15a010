//! Viewport resize events and the live responsive grid.

use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::responsive::{resolve, GridLayout};

type Listener = Rc<RefCell<Box<dyn FnMut(u32)>>>;

#[derive(Default)]
struct ViewportState {
    width: u32,
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Source of viewport width changes
#[derive(Clone, Default)]
pub struct Viewport {
    state: Rc<RefCell<ViewportState>>,
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("width", &self.width())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl Viewport {
    pub fn new(width: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewportState {
                width,
                ..ViewportState::default()
            })),
        }
    }

    pub fn width(&self) -> u32 {
        self.state.borrow().width
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Call `listener` with the new width on every resize until the
    /// returned subscription is dropped
    pub fn subscribe<F>(&self, listener: F) -> ResizeSubscription
    where
        F: FnMut(u32) + 'static,
    {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        state
            .listeners
            .push((id, Rc::new(RefCell::new(Box::new(listener)))));
        ResizeSubscription {
            state: Rc::downgrade(&self.state),
            id,
        }
    }

    /// Change the width and notify listeners
    pub fn resize(&self, width: u32) {
        let listeners: Vec<Listener> = {
            let mut state = self.state.borrow_mut();
            state.width = width;
            state.listeners.iter().map(|(_, l)| Rc::clone(l)).collect()
        };
        for listener in listeners {
            match listener.try_borrow_mut() {
                Ok(mut callback) => (*callback)(width),
                Err(_) => debug!("Skipping re-entrant resize listener"),
            }
        }
    }
}

/// Registered resize listener; dropping it removes the listener
#[must_use = "the listener is removed when the subscription is dropped"]
pub struct ResizeSubscription {
    state: Weak<RefCell<ViewportState>>,
    id: u64,
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        match state.try_borrow_mut() {
            Ok(mut state) => state.listeners.retain(|(id, _)| *id != self.id),
            Err(_) => warn!("Viewport busy, resize listener {} not removed", self.id),
        };
    }
}

/// Grid layout that follows the viewport
pub struct ResponsiveGrid {
    viewport: Viewport,
    layout: Rc<Cell<GridLayout>>,
    options: Rc<Cell<(u32, bool)>>,
    _subscription: ResizeSubscription,
}

impl ResponsiveGrid {
    /// Resolve the layout now and again on every resize
    pub fn attach(viewport: &Viewport, max_columns: u32, dynamic: bool) -> Self {
        let layout = Rc::new(Cell::new(resolve(viewport.width(), max_columns, dynamic)));
        let options = Rc::new(Cell::new((max_columns, dynamic)));

        let subscription = {
            let layout = Rc::clone(&layout);
            let options = Rc::clone(&options);
            viewport.subscribe(move |width| {
                let (max_columns, dynamic) = options.get();
                layout.set(resolve(width, max_columns, dynamic));
            })
        };

        Self {
            viewport: viewport.clone(),
            layout,
            options,
            _subscription: subscription,
        }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout.get()
    }

    /// Change the column preference and re-resolve at the current width
    pub fn set_options(&self, max_columns: u32, dynamic: bool) {
        self.options.set((max_columns, dynamic));
        self.layout
            .set(resolve(self.viewport.width(), max_columns, dynamic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_grid_follows_resize() {
        let viewport = Viewport::new(1440);
        let grid = ResponsiveGrid::attach(&viewport, 4, false);
        assert_eq!(grid.layout().column_count, 4);

        viewport.resize(700);
        assert_eq!(grid.layout().column_count, 3);
        assert!(grid.layout().is_mobile);

        grid.set_options(2, false);
        assert_eq!(grid.layout().column_count, 2);
    }

    #[test]
    fn test_drop_removes_listener() {
        let viewport = Viewport::new(1024);
        let grid = ResponsiveGrid::attach(&viewport, 3, false);
        assert_eq!(viewport.listener_count(), 1);
        drop(grid);
        assert_eq!(viewport.listener_count(), 0);
        viewport.resize(500);
    }

    #[test]
    fn test_listener_removed_on_unwind() {
        let viewport = Viewport::new(1024);
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _grid = ResponsiveGrid::attach(&viewport, 3, false);
            panic!("view construction failed");
        }));
        assert!(result.is_err());
        assert_eq!(viewport.listener_count(), 0);
    }

    #[test]
    fn test_subscription_outlives_viewport() {
        let subscription = {
            let viewport = Viewport::new(800);
            viewport.subscribe(|_| {})
        };
        drop(subscription);
    }
}
