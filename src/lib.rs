//! HTML Engine Baseview Host
//!
//! This crate embeds a windowless HTML/CSS engine inside a baseview window,
//! so engine-rendered UIs can be used in audio plugin contexts (CLAP, VST3, etc).
//!
//! # Architecture
//!
//! The engine itself is external and reached only through the [`Engine`]
//! trait: it accepts messages, hands back rendered regions and pushes
//! notifications through a callback. This crate is the bridge around it:
//!
//! 1. [`event`] turns baseview events into host-neutral inputs
//! 2. [`HtmlView`] translates them into engine messages ([`input`], [`keymap`])
//!    and keeps the engine's clock running ([`heartbeat`])
//! 3. Engine notifications are routed to the [`Host`] ([`notify`])
//! 4. On repaint, rendered regions are blended onto a [`Canvas`]
//!    ([`compositor`]) and presented through wgpu
//!
//! Everything runs on the window thread. The core modules never touch
//! baseview; [`HostEvents`] and [`Host`] are the seams a different host
//! would implement.
//!
//! # Usage
//!
//! ```ignore
//! use htmlview_baseview::{HtmlWindow, Size, ViewOptions, WindowOpenOptions, WindowScalePolicy};
//!
//! // For CLAP plugins with parent window:
//! HtmlWindow::open_parented(
//!     parent_handle,
//!     WindowOpenOptions {
//!         title: "My Plugin".into(),
//!         size: Size::new(800.0, 600.0),
//!         scale: WindowScalePolicy::SystemScaleFactor,
//!     },
//!     ViewOptions::default(),
//!     "file:///plugin/ui/main.html",
//!     |config| MyEngine::create(config.backend),
//! );
//! ```

pub mod compositor;
pub mod engine;
pub mod event;
pub mod heartbeat;
pub mod host;
pub mod input;
pub mod keymap;
pub mod lifecycle;
pub mod notify;
mod render;
pub mod view;
mod window;

pub use baseview::{Size, WindowOpenOptions, WindowScalePolicy};
pub use compositor::{Canvas, PaintRegion};
pub use engine::{
    Engine, EngineError, EngineMessage, KeyEvent, KeyMessage, KeyboardStates, MouseButtons,
    MouseEvent, MouseMessage, RenderBackend, RuntimeConfig, RuntimeFeatures, ViewOptions,
};
pub use host::{Host, HostEvents, HostState};
pub use notify::{CursorShape, Notification, NotifyStatus};
pub use render::RenderError;
pub use view::{HtmlView, DEFAULT_SIZE};
pub use window::{mouse_cursor, HtmlWindow, HtmlWindowHandle};
