//! The embedded HTML view
//!
//! [`HtmlView`] binds one engine instance to a host region. It forwards the
//! host's input, geometry and paint requests to the engine and keeps the
//! engine's clock running with the heartbeat.

use std::rc::Rc;
use std::time::Instant;

use dpi::PhysicalSize;

use crate::compositor::{self, Canvas};
use crate::engine::{Engine, EngineError, EngineMessage, RuntimeConfig, ViewOptions};
use crate::heartbeat::Heartbeat;
use crate::host::{Host, HostEvents};
use crate::input::{self, KeyInput, PointerInput};
use crate::lifecycle::{EngineLifecycle, LifecycleState};
use crate::notify;

/// Preferred size of a view
pub const DEFAULT_SIZE: PhysicalSize<u32> = PhysicalSize {
    width: 800,
    height: 600,
};

pub struct HtmlView<E: Engine, H: Host + 'static> {
    lifecycle: EngineLifecycle<E>,
    heartbeat: Heartbeat,
    host: Rc<H>,
    size: PhysicalSize<u32>,
    background: [u8; 4],
}

impl<E: Engine, H: Host + 'static> HtmlView<E, H> {
    /// Bind a new engine instance to a host region.
    ///
    /// If `create` fails the error is logged and the view stays inert: it
    /// accepts every call and does nothing.
    pub fn new<F>(host: Rc<H>, options: ViewOptions, region: PhysicalSize<u32>, create: F) -> Self
    where
        F: FnOnce(&RuntimeConfig) -> Result<E, EngineError>,
    {
        let mut lifecycle = EngineLifecycle::new(options.runtime);
        lifecycle.initialize(region, create, notify::callback(Rc::clone(&host)));

        Self {
            lifecycle,
            heartbeat: Heartbeat::new(options.heartbeat_interval, Instant::now()),
            host,
            size: region,
            background: options.background,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.state() == LifecycleState::Active
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Why the engine could not be created, if it could not
    pub fn creation_error(&self) -> Option<&EngineError> {
        self.lifecycle.error()
    }

    /// Direct access to the engine instance, if one is alive
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.lifecycle.engine_mut()
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// Current region size
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Preferred size for layout
    pub fn size_hint(&self) -> PhysicalSize<u32> {
        DEFAULT_SIZE
    }

    /// Load a document into the engine and schedule a repaint.
    pub fn load(&mut self, uri: &str) -> bool {
        let Some(engine) = self.lifecycle.engine_mut() else {
            return false;
        };
        let loaded = engine.load_document(uri);
        if !loaded {
            tracing::warn!(uri, "Engine did not accept document");
        }
        self.host.request_repaint();
        loaded
    }

    /// Send a heartbeat if one is due. Returns the tick that was sent.
    pub fn heartbeat(&mut self, now: Instant) -> Option<u32> {
        if !self.is_active() {
            return None;
        }
        let tick = self.heartbeat.poll(now)?;
        self.lifecycle.send(EngineMessage::Heartbeat(tick));
        Some(tick)
    }

    /// Stop the heartbeat and destroy the engine. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.heartbeat.stop();
        self.lifecycle.teardown();
    }
}

impl<E: Engine, H: Host + 'static> HostEvents for HtmlView<E, H> {
    fn on_pointer(&mut self, event: &PointerInput) {
        let Some(engine) = self.lifecycle.engine_mut() else {
            return;
        };
        let _ = engine.send(EngineMessage::Mouse(input::pointer_message(event)));
        if event.requests_repaint() {
            self.host.request_repaint();
        }
    }

    fn on_key(&mut self, event: &KeyInput) {
        let Some(engine) = self.lifecycle.engine_mut() else {
            return;
        };
        for message in input::key_messages(event) {
            let _ = engine.send(EngineMessage::Key(message));
        }
    }

    fn on_focus(&mut self, focused: bool) {
        self.lifecycle.send(EngineMessage::Focus(focused));
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.size = PhysicalSize::new(width, height);
        self.lifecycle.resize(width, height);
    }

    fn on_paint(&mut self, canvas: &mut Canvas) {
        compositor::composite(self.lifecycle.engine_mut(), canvas, self.background);
    }
}
