//! HTML view window implementation using baseview
//!
//! Provides the window handler that drives an [`HtmlView`] from baseview's
//! frame and event callbacks and presents its canvas.

use std::rc::Rc;
use std::time::Instant;

use baseview::{
    Event, EventStatus, MouseCursor, Window, WindowHandle, WindowHandler, WindowOpenOptions,
};
use dpi::PhysicalSize;
use raw_window_handle::HasRawWindowHandle;

use crate::compositor::Canvas;
use crate::engine::{Engine, EngineError, RuntimeConfig, ViewOptions};
use crate::event::{EventTranslator, HostEvent};
use crate::host::{Host, HostEvents, HostState};
use crate::notify::CursorShape;
use crate::render::RenderContext;
use crate::view::HtmlView;

type EngineFactory<E> = Box<dyn FnOnce(&RuntimeConfig) -> Result<E, EngineError> + Send>;

/// Handle to an HTML view window running in baseview
pub struct HtmlWindowHandle {
    inner: WindowHandle,
}

impl HtmlWindowHandle {
    /// Close the window, tearing the engine down
    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }
}

/// Builder for windows hosting an embedded HTML engine
pub struct HtmlWindow;

impl HtmlWindow {
    /// Open a window parented to another window (for plugin UIs)
    ///
    /// `factory` runs on the window thread to create the engine instance;
    /// `document` is loaded as soon as the instance exists.
    pub fn open_parented<P, F, E>(
        parent: &P,
        options: WindowOpenOptions,
        view_options: ViewOptions,
        document: impl Into<String>,
        factory: F,
    ) -> HtmlWindowHandle
    where
        P: HasRawWindowHandle,
        F: FnOnce(&RuntimeConfig) -> Result<E, EngineError> + Send + 'static,
        E: Engine + 'static,
    {
        let size = physical_size(&options);
        let document = document.into();

        let inner = Window::open_parented(parent, options, move |_| {
            HtmlHandler::new(Box::new(factory), document, view_options, size)
        });

        HtmlWindowHandle { inner }
    }

    /// Open a standalone window (for testing)
    ///
    /// Note: This blocks the current thread until the window is closed.
    pub fn open_blocking<F, E>(
        options: WindowOpenOptions,
        view_options: ViewOptions,
        document: impl Into<String>,
        factory: F,
    ) where
        F: FnOnce(&RuntimeConfig) -> Result<E, EngineError> + Send + 'static,
        E: Engine + 'static,
    {
        let size = physical_size(&options);
        let document = document.into();

        Window::open_blocking(options, move |_| {
            HtmlHandler::new(Box::new(factory), document, view_options, size)
        });
    }
}

/// Size before baseview reports the real one, assuming a scale of 1.
/// Any `Resized` event replaces it, including one that arrives before the
/// view exists.
fn physical_size(options: &WindowOpenOptions) -> PhysicalSize<u32> {
    PhysicalSize::new(options.size.width as u32, options.size.height as u32)
}

/// Map a requested cursor to baseview's cursor set
pub fn mouse_cursor(shape: CursorShape) -> MouseCursor {
    match shape {
        CursorShape::Arrow | CursorShape::UpArrow => MouseCursor::Default,
        CursorShape::IBeam => MouseCursor::Text,
        CursorShape::Wait => MouseCursor::Working,
        CursorShape::Cross => MouseCursor::Crosshair,
        CursorShape::SizeNwse => MouseCursor::NwseResize,
        CursorShape::SizeNesw => MouseCursor::NeswResize,
        CursorShape::SizeHorizontal => MouseCursor::EwResize,
        CursorShape::SizeVertical => MouseCursor::NsResize,
        CursorShape::SizeAll => MouseCursor::AllScroll,
        CursorShape::Forbidden => MouseCursor::NotAllowed,
        CursorShape::Busy => MouseCursor::PtrWorking,
        CursorShape::Help => MouseCursor::Help,
        CursorShape::PointingHand => MouseCursor::Hand,
        CursorShape::DragMove => MouseCursor::Move,
        CursorShape::DragCopy => MouseCursor::Copy,
    }
}

/// Internal window handler that bridges baseview to the HTML view
///
/// The engine is created on the first frame, on the window thread, once
/// the presentation context exists.
struct HtmlHandler<E: Engine + 'static> {
    /// Engine factory - consumed on first frame
    factory: Option<EngineFactory<E>>,
    /// Document loaded right after creation
    document: String,
    options: ViewOptions,
    view: Option<HtmlView<E, HostState>>,
    host: Rc<HostState>,
    render_ctx: Option<RenderContext>,
    event_translator: EventTranslator,
    canvas: Canvas,
    /// Region size in physical pixels
    size: PhysicalSize<u32>,
}

impl<E: Engine + 'static> HtmlHandler<E> {
    fn new(
        factory: EngineFactory<E>,
        document: String,
        options: ViewOptions,
        size: PhysicalSize<u32>,
    ) -> Self {
        Self {
            factory: Some(factory),
            document,
            options,
            view: None,
            host: Rc::new(HostState::new()),
            render_ctx: None,
            event_translator: EventTranslator::new(1.0),
            canvas: Canvas::new(size.width, size.height, options.background),
            size,
        }
    }

    fn ensure_initialized(&mut self, window: &mut Window) {
        if self.render_ctx.is_none() {
            match unsafe { RenderContext::new(window, self.size.width, self.size.height) } {
                Ok(ctx) => {
                    self.render_ctx = Some(ctx);
                    tracing::info!("GPU context initialized");
                }
                Err(e) => {
                    tracing::error!("Failed to create GPU context: {}", e);
                    return;
                }
            }
        }

        self.create_view();
    }

    /// Create the engine-backed view at the current region size
    fn create_view(&mut self) {
        let Some(factory) = self.factory.take() else {
            return;
        };
        let mut view = HtmlView::new(Rc::clone(&self.host), self.options, self.size, factory);
        if !self.document.is_empty() {
            view.load(&self.document);
        }
        self.view = Some(view);
        self.host.request_repaint();
    }

    /// Track the region size, whether or not the view exists yet
    fn apply_geometry(&mut self, width: u32, height: u32) {
        self.size = PhysicalSize::new(width, height);
        if let Some(ctx) = &mut self.render_ctx {
            ctx.resize(width, height);
        }
    }

    fn handle_host_event(&mut self, event: HostEvent) {
        if let HostEvent::Resize { width, height, .. } = event {
            self.apply_geometry(width, height);
        }

        let Some(view) = &mut self.view else {
            return;
        };

        match event {
            HostEvent::Pointer(input) => view.on_pointer(&input),
            HostEvent::Key(input) => view.on_key(&input),
            HostEvent::Resize { width, height, .. } => {
                view.on_resize(width, height);
                self.host.request_repaint();
            }
            HostEvent::Focus(focused) => view.on_focus(focused),
            HostEvent::Close => view.teardown(),
        }
    }

    fn apply_cursor(&mut self, window: &mut Window) {
        if let Some(shape) = self.host.take_cursor() {
            window.set_mouse_cursor(mouse_cursor(shape));
        }
    }

    fn render_frame(&mut self) {
        let (Some(view), Some(render_ctx)) = (&mut self.view, &mut self.render_ctx) else {
            return;
        };

        self.canvas
            .resize(self.size.width, self.size.height, self.options.background);
        view.on_paint(&mut self.canvas);

        if let Err(e) = render_ctx.present(&self.canvas) {
            tracing::error!("Render error: {}", e);
        }
    }
}

impl<E: Engine + 'static> WindowHandler for HtmlHandler<E> {
    fn on_frame(&mut self, window: &mut Window) {
        self.ensure_initialized(window);

        if let Some(view) = &mut self.view {
            view.heartbeat(Instant::now());
        }
        self.apply_cursor(window);

        if self.host.take_repaint() {
            self.render_frame();
        }
    }

    fn on_event(&mut self, window: &mut Window, event: Event) -> EventStatus {
        if let Some(host_event) = self.event_translator.translate(&event) {
            self.handle_host_event(host_event);
            self.apply_cursor(window);
        }
        // The host keeps its own handling of every event
        EventStatus::Ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::PaintRegion;
    use crate::engine::{EngineMessage, EngineOption, NotificationCallback};

    #[derive(Default)]
    struct SizedEngine {
        sizes: Vec<(u32, u32)>,
    }

    impl Engine for SizedEngine {
        fn set_global_option(_option: EngineOption) {}

        fn send(&mut self, message: EngineMessage) -> bool {
            if let EngineMessage::Size { width, height } = message {
                self.sizes.push((width, height));
            }
            true
        }

        fn paint(&mut self) -> Vec<PaintRegion> {
            Vec::new()
        }

        fn set_notification_callback(&mut self, _callback: Option<NotificationCallback>) {}

        fn load_document(&mut self, _uri: &str) -> bool {
            true
        }
    }

    fn handler() -> HtmlHandler<SizedEngine> {
        HtmlHandler::new(
            Box::new(|_: &RuntimeConfig| Ok::<_, EngineError>(SizedEngine::default())),
            String::new(),
            ViewOptions::default(),
            PhysicalSize::new(800, 600),
        )
    }

    #[test]
    fn test_resize_before_view_is_kept() {
        let mut handler = handler();
        handler.handle_host_event(HostEvent::Resize {
            width: 1600,
            height: 1200,
            scale: 2.0,
        });
        assert!(handler.view.is_none());
        assert_eq!(handler.size, PhysicalSize::new(1600, 1200));

        handler.create_view();
        let view = handler.view.as_mut().expect("view created");
        assert_eq!(view.size(), PhysicalSize::new(1600, 1200));
        let engine = view.engine_mut().expect("engine active");
        assert_eq!(engine.sizes, vec![(1600, 1200)]);
    }

    #[test]
    fn test_resize_after_view_reaches_engine() {
        let mut handler = handler();
        handler.create_view();
        handler.host.take_repaint();

        handler.handle_host_event(HostEvent::Resize {
            width: 400,
            height: 300,
            scale: 1.0,
        });
        assert_eq!(handler.size, PhysicalSize::new(400, 300));
        assert!(handler.host.take_repaint());
        let view = handler.view.as_mut().expect("view created");
        assert_eq!(view.size(), PhysicalSize::new(400, 300));
        let engine = view.engine_mut().expect("engine active");
        assert_eq!(engine.sizes, vec![(800, 600), (400, 300)]);
    }
}
