//! Simple example: opens a standalone window backed by a toy engine
//!
//! The toy engine paints a gradient with a button-like tile as one region
//! and asks for a pointing-hand cursor while the pointer is over the tile.
//!
//! Run with: cargo run --example hello

use dpi::{PhysicalPosition, PhysicalSize};
use htmlview_baseview::engine::{EngineOption, NotificationCallback};
use htmlview_baseview::{
    Engine, EngineMessage, HtmlWindow, MouseEvent, Notification, PaintRegion, Size, ViewOptions,
    WindowOpenOptions, WindowScalePolicy,
};

const TILE_ORIGIN: PhysicalPosition<i32> = PhysicalPosition { x: 40, y: 40 };
const TILE_SIZE: PhysicalSize<u32> = PhysicalSize {
    width: 160,
    height: 60,
};
const CURSOR_ARROW: u32 = 0;
const CURSOR_HAND: u32 = 13;

struct DemoEngine {
    callback: Option<NotificationCallback>,
    size: PhysicalSize<u32>,
    hovered: bool,
    pressed: bool,
}

impl DemoEngine {
    fn new() -> Self {
        Self {
            callback: None,
            size: PhysicalSize::new(0, 0),
            hovered: false,
            pressed: false,
        }
    }

    fn notify(&mut self, notification: Notification) {
        if let Some(callback) = &mut self.callback {
            callback(&notification);
        }
    }

    fn invalidate(&mut self) {
        let size = self.size;
        self.notify(Notification::InvalidateRect {
            origin: PhysicalPosition::new(0, 0),
            size,
        });
    }

    fn over_tile(position: PhysicalPosition<i32>) -> bool {
        let x = position.x - TILE_ORIGIN.x;
        let y = position.y - TILE_ORIGIN.y;
        x >= 0 && y >= 0 && (x as u32) < TILE_SIZE.width && (y as u32) < TILE_SIZE.height
    }

    fn tile_color(&self) -> [u8; 4] {
        match (self.pressed, self.hovered) {
            (true, _) => [40, 40, 40, 255],
            (false, true) => [250, 250, 250, 255],
            (false, false) => [200, 200, 210, 255],
        }
    }

    /// One region covering the whole view: a gradient with the tile on top
    fn frame(&self) -> PaintRegion {
        let PhysicalSize { width, height } = self.size;
        let tile = self.tile_color();
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let position = PhysicalPosition::new(x as i32, y as i32);
                if Self::over_tile(position) {
                    pixels.extend_from_slice(&tile);
                } else {
                    let r = (x * 255 / width.max(1)) as u8;
                    let b = (y * 255 / height.max(1)) as u8;
                    pixels.extend_from_slice(&[r, 48, b, 255]);
                }
            }
        }
        PaintRegion::new(pixels, width, height, PhysicalPosition::new(0, 0))
    }
}

impl Engine for DemoEngine {
    fn set_global_option(option: EngineOption) {
        tracing::debug!(?option, "Demo engine option");
    }

    fn send(&mut self, message: EngineMessage) -> bool {
        match message {
            EngineMessage::Size { width, height } => {
                self.size = PhysicalSize::new(width, height);
                self.invalidate();
            }
            EngineMessage::Mouse(mouse) => {
                let over = Self::over_tile(mouse.position);
                if over != self.hovered {
                    self.hovered = over;
                    let cursor_id = if over { CURSOR_HAND } else { CURSOR_ARROW };
                    self.notify(Notification::SetCursor { cursor_id });
                    self.invalidate();
                }
                match mouse.event {
                    MouseEvent::Down if over => self.pressed = true,
                    MouseEvent::Up => self.pressed = false,
                    _ => {}
                }
            }
            EngineMessage::Destroy => tracing::info!("Demo engine destroyed"),
            _ => {}
        }
        true
    }

    fn paint(&mut self) -> Vec<PaintRegion> {
        if self.size.width == 0 || self.size.height == 0 {
            return Vec::new();
        }
        vec![self.frame()]
    }

    fn set_notification_callback(&mut self, callback: Option<NotificationCallback>) {
        self.callback = callback;
    }

    fn load_document(&mut self, uri: &str) -> bool {
        tracing::info!(uri, "Demo engine loading document");
        true
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    println!("Opening window...");

    let options = WindowOpenOptions {
        title: "HTML View Baseview Example".into(),
        size: Size::new(400.0, 300.0),
        scale: WindowScalePolicy::SystemScaleFactor,
    };

    // This blocks until the window is closed
    HtmlWindow::open_blocking(options, ViewOptions::default(), "demo.html", |_| {
        Ok(DemoEngine::new())
    });

    println!("Window closed.");
}
