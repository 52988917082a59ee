//! Recording doubles for the engine and the host

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dpi::{PhysicalPosition, PhysicalSize};
use htmlview_baseview::engine::{EngineOption, NotificationCallback};
use htmlview_baseview::{
    CursorShape, Engine, EngineError, EngineMessage, Host, HtmlView, Notification, PaintRegion,
    RuntimeConfig, ViewOptions,
};

pub const LEFT_COLOR: [u8; 4] = [255, 0, 0, 255];
pub const RIGHT_COLOR: [u8; 4] = [0, 0, 255, 255];

thread_local! {
    pub static GLOBAL_OPTIONS: RefCell<Vec<EngineOption>> = const { RefCell::new(Vec::new()) };
}

/// Everything the fake engine saw, shared with the test
#[derive(Default)]
pub struct EngineLog {
    pub messages: Vec<EngineMessage>,
    /// `true` for every callback registration, `false` for every removal
    pub callback_changes: Vec<bool>,
    pub documents: Vec<String>,
    pub painted: Vec<(PhysicalPosition<i32>, u32, u32)>,
    /// Pushed through the callback during the next send
    pub pending: Vec<Notification>,
    pub statuses: Vec<u32>,
    pub dropped: bool,
    pub config: Option<RuntimeConfig>,
}

pub type SharedLog = Rc<RefCell<EngineLog>>;

/// Engine double: records messages, invalidates on resize and paints two
/// halves of its region in solid colours
pub struct FakeEngine {
    log: SharedLog,
    callback: Option<NotificationCallback>,
    size: PhysicalSize<u32>,
}

impl FakeEngine {
    fn notify(&mut self, notification: Notification) {
        if let Some(callback) = &mut self.callback {
            let status = callback(&notification);
            self.log.borrow_mut().statuses.push(status);
        }
    }
}

impl Engine for FakeEngine {
    fn set_global_option(option: EngineOption) {
        GLOBAL_OPTIONS.with(|options| options.borrow_mut().push(option));
    }

    fn send(&mut self, message: EngineMessage) -> bool {
        self.log.borrow_mut().messages.push(message);

        if let EngineMessage::Size { width, height } = message {
            self.size = PhysicalSize::new(width, height);
            self.notify(Notification::InvalidateRect {
                origin: PhysicalPosition::new(0, 0),
                size: self.size,
            });
        }

        let pending: Vec<Notification> = self.log.borrow_mut().pending.drain(..).collect();
        for notification in pending {
            self.notify(notification);
        }
        true
    }

    fn paint(&mut self) -> Vec<PaintRegion> {
        let PhysicalSize { width, height } = self.size;
        if width == 0 || height == 0 {
            return Vec::new();
        }
        let half = width / 2;
        let regions = vec![
            PaintRegion::solid(LEFT_COLOR, half, height, PhysicalPosition::new(0, 0)),
            PaintRegion::solid(RIGHT_COLOR, width - half, height, PhysicalPosition::new(half as i32, 0)),
        ];
        let mut log = self.log.borrow_mut();
        for region in &regions {
            log.painted.push((region.offset, region.width, region.height));
        }
        regions
    }

    fn set_notification_callback(&mut self, callback: Option<NotificationCallback>) {
        self.log.borrow_mut().callback_changes.push(callback.is_some());
        self.callback = callback;
    }

    fn load_document(&mut self, uri: &str) -> bool {
        self.log.borrow_mut().documents.push(uri.to_string());
        true
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.log.borrow_mut().dropped = true;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Repaint,
    Cursor(CursorShape),
}

#[derive(Default)]
pub struct RecordingHost {
    pub calls: RefCell<Vec<HostCall>>,
}

impl RecordingHost {
    pub fn repaints(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| **call == HostCall::Repaint)
            .count()
    }

    pub fn last_cursor(&self) -> Option<CursorShape> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            HostCall::Cursor(shape) => Some(*shape),
            HostCall::Repaint => None,
        })
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Host for RecordingHost {
    fn request_repaint(&self) {
        self.calls.borrow_mut().push(HostCall::Repaint);
    }

    fn set_cursor(&self, cursor: CursorShape) {
        self.calls.borrow_mut().push(HostCall::Cursor(cursor));
    }
}

pub type TestView = HtmlView<FakeEngine, RecordingHost>;

/// A view over a working fake engine
pub fn active_view(region: PhysicalSize<u32>) -> (TestView, SharedLog, Rc<RecordingHost>) {
    let log = SharedLog::default();
    let host = Rc::new(RecordingHost::default());
    let engine_log = Rc::clone(&log);
    let view = HtmlView::new(Rc::clone(&host), ViewOptions::default(), region, move |config| {
        engine_log.borrow_mut().config = Some(*config);
        Ok(FakeEngine {
            log: engine_log,
            callback: None,
            size: PhysicalSize::new(0, 0),
        })
    });
    (view, log, host)
}

/// A view whose engine could not be created
pub fn inert_view() -> (TestView, Rc<RecordingHost>) {
    let host = Rc::new(RecordingHost::default());
    let view = HtmlView::new(
        Rc::clone(&host),
        ViewOptions::default(),
        PhysicalSize::new(800, 600),
        |_| Err(EngineError::Unavailable("no engine library".into())),
    );
    (view, host)
}
