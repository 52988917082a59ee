//! Engine notification dispatch
//!
//! Notifications are routed by kind to the [`Host`]. Dispatch keeps no state
//! and never calls back into the engine, so it is safe to run from inside a
//! message send that triggered it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use dpi::{PhysicalPosition, PhysicalSize};

use crate::engine::NotificationCallback;
use crate::host::Host;

/// Notification kinds pushed by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Part of the region needs repainting
    InvalidateRect {
        origin: PhysicalPosition<i32>,
        size: PhysicalSize<u32>,
    },
    /// The engine wants a different cursor
    SetCursor { cursor_id: u32 },
    /// Any kind this adapter does not react to, by raw code
    Other { code: u32 },
}

/// Status handed back to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum NotifyStatus {
    Ignored = 0,
    Handled = 1,
}

/// Host cursor shapes the engine can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    IBeam,
    Wait,
    Cross,
    UpArrow,
    SizeNwse,
    SizeNesw,
    SizeHorizontal,
    SizeVertical,
    SizeAll,
    Forbidden,
    Busy,
    Help,
    PointingHand,
    DragMove,
    DragCopy,
}

/// Map an engine cursor id to a host shape. Unknown ids get the arrow.
pub fn cursor_shape(cursor_id: u32) -> CursorShape {
    match cursor_id {
        1 => CursorShape::IBeam,
        2 => CursorShape::Wait,
        3 => CursorShape::Cross,
        4 => CursorShape::UpArrow,
        5 => CursorShape::SizeNwse,
        6 => CursorShape::SizeNesw,
        7 => CursorShape::SizeHorizontal,
        8 => CursorShape::SizeVertical,
        9 => CursorShape::SizeAll,
        10 => CursorShape::Forbidden,
        11 => CursorShape::Busy,
        12 => CursorShape::Help,
        13 => CursorShape::PointingHand,
        14 => CursorShape::DragMove,
        15 => CursorShape::DragCopy,
        _ => CursorShape::Arrow,
    }
}

/// Route one notification to the host.
pub fn dispatch(host: &dyn Host, notification: &Notification) -> NotifyStatus {
    match notification {
        Notification::InvalidateRect { .. } => {
            host.request_repaint();
            NotifyStatus::Handled
        }
        Notification::SetCursor { cursor_id } => {
            host.set_cursor(cursor_shape(*cursor_id));
            NotifyStatus::Handled
        }
        Notification::Other { code } => {
            tracing::trace!(code, "Ignoring engine notification");
            NotifyStatus::Ignored
        }
    }
}

/// Build the callback registered with the engine.
///
/// A panic in host code is caught here and reported as `Ignored`; nothing
/// unwinds into the engine.
pub fn callback<H: Host + 'static>(host: Rc<H>) -> NotificationCallback {
    Box::new(move |notification: &Notification| {
        match catch_unwind(AssertUnwindSafe(|| dispatch(&*host, notification))) {
            Ok(status) => status as u32,
            Err(_) => {
                tracing::error!(?notification, "Host panicked while handling notification");
                NotifyStatus::Ignored as u32
            }
        }
    })
}
