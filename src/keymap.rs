//! Host key to engine key-code translation
//!
//! Scan-code overrides are consulted first so left/right modifier variants
//! and the context-menu key survive. The generic virtual-key table covers
//! the non-character keys. Anything else passes its raw host value through.

/// Engine key codes
pub mod codes {
    pub const ESCAPE: u32 = 256;
    pub const ENTER: u32 = 257;
    pub const TAB: u32 = 258;
    pub const BACKSPACE: u32 = 259;
    pub const INSERT: u32 = 260;
    pub const DELETE: u32 = 261;
    pub const RIGHT: u32 = 262;
    pub const LEFT: u32 = 263;
    pub const DOWN: u32 = 264;
    pub const UP: u32 = 265;
    pub const PAGE_UP: u32 = 266;
    pub const PAGE_DOWN: u32 = 267;
    pub const HOME: u32 = 268;
    pub const END: u32 = 269;
    pub const CAPS_LOCK: u32 = 280;
    pub const SCROLL_LOCK: u32 = 281;
    pub const NUM_LOCK: u32 = 282;
    pub const PRINT_SCREEN: u32 = 283;
    pub const PAUSE: u32 = 284;
    /// F1. F2..F25 follow consecutively.
    pub const F1: u32 = 290;
    pub const F25: u32 = 314;
    pub const LEFT_SHIFT: u32 = 340;
    pub const LEFT_CONTROL: u32 = 341;
    pub const LEFT_ALT: u32 = 342;
    pub const RIGHT_SHIFT: u32 = 344;
    pub const RIGHT_CONTROL: u32 = 345;
    pub const MENU: u32 = 348;
}

/// Platform-neutral virtual key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VirtualKey {
    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    PageUp,
    PageDown,
    Home,
    End,
    CapsLock,
    ScrollLock,
    NumLock,
    PrintScreen,
    Pause,
    /// Function key, 1-based
    F(u8),
    /// Shift without a known side
    Shift,
    /// Alt without a known side
    Alt,
    /// Anything without an entry in the table
    Other,
}

/// Physical key positions that override the generic table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCode {
    ShiftLeft,
    ShiftRight,
    ControlLeft,
    ControlRight,
    ContextMenu,
    Other,
}

fn scan_code_override(scan: ScanCode) -> Option<u32> {
    match scan {
        ScanCode::ShiftLeft => Some(codes::LEFT_SHIFT),
        ScanCode::ShiftRight => Some(codes::RIGHT_SHIFT),
        ScanCode::ControlLeft => Some(codes::LEFT_CONTROL),
        ScanCode::ControlRight => Some(codes::RIGHT_CONTROL),
        ScanCode::ContextMenu => Some(codes::MENU),
        ScanCode::Other => None,
    }
}

fn virtual_key_code(key: VirtualKey) -> Option<u32> {
    let code = match key {
        VirtualKey::Escape => codes::ESCAPE,
        VirtualKey::Enter => codes::ENTER,
        VirtualKey::Tab => codes::TAB,
        VirtualKey::Backspace => codes::BACKSPACE,
        VirtualKey::Insert => codes::INSERT,
        VirtualKey::Delete => codes::DELETE,
        VirtualKey::ArrowLeft => codes::LEFT,
        VirtualKey::ArrowRight => codes::RIGHT,
        VirtualKey::ArrowUp => codes::UP,
        VirtualKey::ArrowDown => codes::DOWN,
        VirtualKey::PageUp => codes::PAGE_UP,
        VirtualKey::PageDown => codes::PAGE_DOWN,
        VirtualKey::Home => codes::HOME,
        VirtualKey::End => codes::END,
        VirtualKey::CapsLock => codes::CAPS_LOCK,
        VirtualKey::ScrollLock => codes::SCROLL_LOCK,
        VirtualKey::NumLock => codes::NUM_LOCK,
        VirtualKey::PrintScreen => codes::PRINT_SCREEN,
        VirtualKey::Pause => codes::PAUSE,
        VirtualKey::F(n @ 1..=25) => codes::F1 + u32::from(n) - 1,
        VirtualKey::F(_) => return None,
        VirtualKey::Shift => codes::LEFT_SHIFT,
        VirtualKey::Alt => codes::LEFT_ALT,
        VirtualKey::Other => return None,
    };
    Some(code)
}

/// Translate a host key into an engine key code.
///
/// `raw` is the host's own value for the key and is returned unchanged when
/// neither the scan code nor the virtual key has an entry.
pub fn translate_key(key: VirtualKey, scan: ScanCode, raw: u32) -> u32 {
    scan_code_override(scan)
        .or_else(|| virtual_key_code(key))
        .unwrap_or(raw)
}
