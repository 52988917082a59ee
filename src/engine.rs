//! Message surface of the embedded HTML engine
//!
//! The engine is an external, windowless runtime. Everything this crate knows
//! about it is expressed here: the messages it accepts, the masks those
//! messages carry, the region pull used for painting and the notification
//! callback it pushes back through.

use std::sync::Once;
use std::time::Duration;

use bitflags::bitflags;
use dpi::PhysicalPosition;

use crate::compositor::PaintRegion;
use crate::notify::Notification;

/// Rendering backend the engine rasterizes with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderBackend {
    /// CPU rasterizer. Required for the region pull used by the compositor.
    #[default]
    SkiaRaster,
    /// GPU rasterizer, presented by the engine itself
    SkiaOpenGl,
}

bitflags! {
    /// Mouse buttons, in the engine's wire layout
    ///
    /// For `MouseEvent::Wheel` the same field carries the packed wheel
    /// deltas instead (see [`crate::input::pack_wheel_deltas`]).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MouseButtons: u32 {
        const MAIN = 1;
        const PROP = 2;
        const MIDDLE = 4;
    }
}

bitflags! {
    /// Keyboard modifier state, in the engine's wire layout
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KeyboardStates: u32 {
        const CONTROL = 1;
        const SHIFT = 2;
        const ALT = 4;
    }
}

bitflags! {
    /// Script runtime capabilities granted to loaded documents
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RuntimeFeatures: u32 {
        const FILE_IO = 1;
        const SOCKET_IO = 2;
        const EVAL = 4;
        const SYSINFO = 8;
    }
}

/// Mouse message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MouseEvent {
    Enter = 0,
    Leave = 1,
    Move = 2,
    Up = 3,
    Down = 4,
    DoubleClick = 5,
    Wheel = 6,
}

/// Key message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum KeyEvent {
    Down = 0,
    Up = 1,
    Char = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseMessage {
    pub event: MouseEvent,
    pub buttons: MouseButtons,
    pub modifiers: KeyboardStates,
    /// Region-local position in physical pixels
    pub position: PhysicalPosition<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMessage {
    pub event: KeyEvent,
    /// Engine key code for `Down`/`Up`, a Unicode code point for `Char`
    pub code: u32,
    pub modifiers: KeyboardStates,
}

/// Messages accepted by [`Engine::send`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMessage {
    Create {
        backend: RenderBackend,
        transparent: bool,
    },
    Destroy,
    Size {
        width: u32,
        height: u32,
    },
    Mouse(MouseMessage),
    Key(KeyMessage),
    Focus(bool),
    /// Timer tick in milliseconds
    Heartbeat(u32),
}

/// Process-wide engine options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOption {
    GfxLayer(RenderBackend),
    UxTheming(bool),
    ScriptRuntimeFeatures(RuntimeFeatures),
    DebugMode(bool),
}

/// Callback the engine invokes for every notification it pushes.
///
/// May be called synchronously from inside [`Engine::send`]. The return
/// value is the numeric status handed back to the engine.
pub type NotificationCallback = Box<dyn FnMut(&Notification) -> u32>;

/// A running instance of the embedded engine
///
/// Implementations own one windowless engine instance. All calls happen on
/// the host UI thread.
pub trait Engine {
    /// Set a process-wide option. Only called from [`configure_runtime`].
    fn set_global_option(option: EngineOption)
    where
        Self: Sized;

    /// Deliver one message. The result is informational only.
    fn send(&mut self, message: EngineMessage) -> bool;

    /// Render pending damage and hand back the rendered regions.
    ///
    /// Regions do not overlap. An empty list means nothing needs repainting.
    fn paint(&mut self) -> Vec<PaintRegion>;

    /// Install or remove (`None`) the notification callback.
    fn set_notification_callback(&mut self, callback: Option<NotificationCallback>);

    /// Start loading a document.
    fn load_document(&mut self, uri: &str) -> bool;
}

/// Errors raised while bringing an engine instance up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine library could not be located or loaded
    Unavailable(String),
    /// The library loaded but refused to create an instance
    CreationFailed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(e) => write!(f, "Engine unavailable: {}", e),
            Self::CreationFailed(e) => write!(f, "Engine creation failed: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

/// Engine runtime settings applied when the view comes up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub backend: RenderBackend,
    pub transparent: bool,
    pub ux_theming: bool,
    pub features: RuntimeFeatures,
    pub debug_mode: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend: RenderBackend::SkiaRaster,
            transparent: false,
            ux_theming: true,
            features: RuntimeFeatures::all(),
            debug_mode: true,
        }
    }
}

impl RuntimeConfig {
    /// The process-wide options this configuration sets, in apply order
    pub fn global_options(&self) -> [EngineOption; 4] {
        [
            EngineOption::GfxLayer(self.backend),
            EngineOption::UxTheming(self.ux_theming),
            EngineOption::ScriptRuntimeFeatures(self.features),
            EngineOption::DebugMode(self.debug_mode),
        ]
    }
}

/// Adapter settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    pub runtime: RuntimeConfig,
    /// Interval between heartbeat ticks
    pub heartbeat_interval: Duration,
    /// RGBA colour used for the blank surface
    pub background: [u8; 4],
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            heartbeat_interval: Duration::from_millis(10),
            background: [30, 30, 35, 255],
        }
    }
}

static RUNTIME_CONFIGURED: Once = Once::new();

/// Apply the process-wide engine options.
///
/// Only the first call in a process has any effect. Returns `true` for that
/// call and `false` for every later one.
pub fn configure_runtime<E: Engine>(config: &RuntimeConfig) -> bool {
    let mut applied = false;
    RUNTIME_CONFIGURED.call_once(|| {
        for option in config.global_options() {
            E::set_global_option(option);
        }
        applied = true;
        tracing::debug!(?config, "Engine runtime configured");
    });
    applied
}
