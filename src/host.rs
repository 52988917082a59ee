//! Seams between the adapter and whatever window hosts it
//!
//! [`Host`] is what the adapter needs from its container: repaint scheduling
//! and a cursor. [`HostEvents`] is what the container drives on the adapter.
//! Neither trait mentions a windowing library. The baseview backend in
//! [`crate::window`] is one implementation.

use std::cell::Cell;

use crate::compositor::Canvas;
use crate::input::{KeyInput, PointerInput};
use crate::notify::CursorShape;

/// Services the hosting container provides
///
/// Both calls may arrive while the engine is in the middle of a message
/// send, so implementations only record the request.
pub trait Host {
    /// Schedule a repaint. Repeated requests before the next paint collapse.
    fn request_repaint(&self);

    fn set_cursor(&self, cursor: CursorShape);
}

/// Input and window events the container forwards to the adapter
///
/// The container keeps running its own default handling for every event;
/// none of these calls can veto it.
pub trait HostEvents {
    fn on_pointer(&mut self, event: &PointerInput);
    fn on_key(&mut self, event: &KeyInput);
    fn on_focus(&mut self, focused: bool);
    fn on_resize(&mut self, width: u32, height: u32);
    fn on_paint(&mut self, canvas: &mut Canvas);
}

/// Host state shared between a window and the engine's notification callback
#[derive(Debug, Default)]
pub struct HostState {
    repaint: Cell<bool>,
    cursor: Cell<Option<CursorShape>>,
}

impl HostState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending repaint request, clearing it.
    pub fn take_repaint(&self) -> bool {
        self.repaint.replace(false)
    }

    /// Take the cursor the engine asked for since the last call.
    pub fn take_cursor(&self) -> Option<CursorShape> {
        self.cursor.take()
    }
}

impl Host for HostState {
    fn request_repaint(&self) {
        self.repaint.set(true);
    }

    fn set_cursor(&self, cursor: CursorShape) {
        self.cursor.set(Some(cursor));
    }
}
