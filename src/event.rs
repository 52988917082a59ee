//! Event translation from baseview to host-neutral input
//!
//! Converts baseview events into the pointer and key inputs the view
//! understands. Baseview reports neither button positions nor double clicks,
//! so the translator tracks the pointer and synthesizes double clicks.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use baseview::{Event, MouseButton, MouseEvent, ScrollDelta, WindowEvent};
use dpi::PhysicalPosition;
use keyboard_types::{Code, Key, KeyState, KeyboardEvent, Modifiers};

use crate::engine::MouseButtons;
use crate::input::{KeyInput, PointerInput, PointerKind, WHEEL_UNITS_PER_LINE};
use crate::keymap::{ScanCode, VirtualKey};

/// Longest gap between the presses of a double click
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

/// Farthest the pointer may travel between the presses, in physical pixels
pub const DOUBLE_CLICK_DISTANCE: f64 = 4.0;

/// Translate a baseview mouse button to the engine button bit
pub fn translate_mouse_button(button: MouseButton) -> MouseButtons {
    match button {
        MouseButton::Left => MouseButtons::MAIN,
        MouseButton::Right => MouseButtons::PROP,
        MouseButton::Middle => MouseButtons::MIDDLE,
        MouseButton::Back | MouseButton::Forward | MouseButton::Other(_) => MouseButtons::empty(),
    }
}

/// Translate a logical key to the virtual key the key map knows
pub fn translate_virtual_key(key: &Key) -> VirtualKey {
    match key {
        Key::Escape => VirtualKey::Escape,
        Key::Enter => VirtualKey::Enter,
        Key::Tab => VirtualKey::Tab,
        Key::Backspace => VirtualKey::Backspace,
        Key::Insert => VirtualKey::Insert,
        Key::Delete => VirtualKey::Delete,
        Key::ArrowLeft => VirtualKey::ArrowLeft,
        Key::ArrowRight => VirtualKey::ArrowRight,
        Key::ArrowUp => VirtualKey::ArrowUp,
        Key::ArrowDown => VirtualKey::ArrowDown,
        Key::PageUp => VirtualKey::PageUp,
        Key::PageDown => VirtualKey::PageDown,
        Key::Home => VirtualKey::Home,
        Key::End => VirtualKey::End,
        Key::CapsLock => VirtualKey::CapsLock,
        Key::ScrollLock => VirtualKey::ScrollLock,
        Key::NumLock => VirtualKey::NumLock,
        Key::PrintScreen => VirtualKey::PrintScreen,
        Key::Pause => VirtualKey::Pause,
        Key::F1 => VirtualKey::F(1),
        Key::F2 => VirtualKey::F(2),
        Key::F3 => VirtualKey::F(3),
        Key::F4 => VirtualKey::F(4),
        Key::F5 => VirtualKey::F(5),
        Key::F6 => VirtualKey::F(6),
        Key::F7 => VirtualKey::F(7),
        Key::F8 => VirtualKey::F(8),
        Key::F9 => VirtualKey::F(9),
        Key::F10 => VirtualKey::F(10),
        Key::F11 => VirtualKey::F(11),
        Key::F12 => VirtualKey::F(12),
        Key::Shift => VirtualKey::Shift,
        Key::Alt => VirtualKey::Alt,
        _ => VirtualKey::Other,
    }
}

/// Translate the physical key position to the overriding scan codes
pub fn translate_scan_code(code: Code) -> ScanCode {
    match code {
        Code::ShiftLeft => ScanCode::ShiftLeft,
        Code::ShiftRight => ScanCode::ShiftRight,
        Code::ControlLeft => ScanCode::ControlLeft,
        Code::ControlRight => ScanCode::ControlRight,
        Code::ContextMenu => ScanCode::ContextMenu,
        _ => ScanCode::Other,
    }
}

/// First raw value handed to named keys, just above the Unicode range
pub const NAMED_KEY_BASE: u32 = 0x0011_0000;

/// Host value for keys the key map does not know.
///
/// Single characters report their upper-case code point, which is also
/// what the engine uses for letter and digit keys. Other keys get a value
/// derived from their physical code, or from the key itself when the code
/// is unidentified, so distinct keys stay distinct.
pub fn raw_key_value(key: &Key, code: Code) -> u32 {
    if let Key::Character(text) = key {
        let mut chars = text.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return ch.to_uppercase().next().unwrap_or(ch) as u32;
        }
    }

    let mut hasher = DefaultHasher::new();
    match (code, key) {
        (Code::Unidentified, Key::Unidentified) => return 0,
        (Code::Unidentified, key) => key.hash(&mut hasher),
        (code, _) => code.hash(&mut hasher),
    }
    let span = u64::from(u32::MAX - NAMED_KEY_BASE) + 1;
    NAMED_KEY_BASE + (hasher.finish() % span) as u32
}

/// Translate a baseview keyboard event to a key input
pub fn translate_key_event(event: &KeyboardEvent) -> KeyInput {
    let text = match (&event.key, event.state) {
        (Key::Character(text), KeyState::Down) if !event.is_composing => text.clone(),
        _ => String::new(),
    };

    KeyInput {
        state: event.state,
        key: translate_virtual_key(&event.key),
        scan: translate_scan_code(event.code),
        raw: raw_key_value(&event.key, event.code),
        text,
        modifiers: event.modifiers,
    }
}

/// Host-side events for the view
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Pointer(PointerInput),
    Key(KeyInput),
    Resize { width: u32, height: u32, scale: f64 },
    Focus(bool),
    Close,
}

struct Press {
    button: MouseButtons,
    at: Instant,
    position: PhysicalPosition<f64>,
}

/// Event translator that maintains pointer state between events
pub struct EventTranslator {
    /// Last pointer position in physical pixels
    pointer: PhysicalPosition<f64>,
    held: MouseButtons,
    modifiers: Modifiers,
    scale_factor: f64,
    last_press: Option<Press>,
}

impl EventTranslator {
    pub fn new(scale_factor: f64) -> Self {
        Self {
            pointer: PhysicalPosition::new(0.0, 0.0),
            held: MouseButtons::empty(),
            modifiers: Modifiers::empty(),
            scale_factor,
            last_press: None,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// Translate a baseview event.
    /// Returns None if the event has no counterpart on the view.
    pub fn translate(&mut self, event: &Event) -> Option<HostEvent> {
        self.translate_at(event, Instant::now())
    }

    /// Like [`translate`](Self::translate) with an explicit timestamp
    pub fn translate_at(&mut self, event: &Event, now: Instant) -> Option<HostEvent> {
        match event {
            Event::Mouse(mouse) => self.translate_mouse(mouse, now),
            Event::Keyboard(kb) => {
                self.modifiers = kb.modifiers;
                Some(HostEvent::Key(translate_key_event(kb)))
            }
            Event::Window(win) => self.translate_window(win),
        }
    }

    fn pointer_input(&self, kind: PointerKind, button: MouseButtons) -> PointerInput {
        PointerInput {
            kind,
            position: self.pointer,
            button,
            held: self.held,
            modifiers: self.modifiers,
        }
    }

    fn is_double_click(&self, button: MouseButtons, now: Instant) -> bool {
        let Some(press) = &self.last_press else {
            return false;
        };
        let dx = press.position.x - self.pointer.x;
        let dy = press.position.y - self.pointer.y;
        press.button == button
            && now.saturating_duration_since(press.at) <= DOUBLE_CLICK_INTERVAL
            && dx.hypot(dy) <= DOUBLE_CLICK_DISTANCE
    }

    fn translate_mouse(&mut self, event: &MouseEvent, now: Instant) -> Option<HostEvent> {
        let input = match event {
            MouseEvent::CursorMoved { position, modifiers } => {
                self.pointer = PhysicalPosition::new(
                    position.x * self.scale_factor,
                    position.y * self.scale_factor,
                );
                self.modifiers = *modifiers;
                self.pointer_input(PointerKind::Move, MouseButtons::empty())
            }

            MouseEvent::ButtonPressed { button, modifiers } => {
                self.modifiers = *modifiers;
                let btn = translate_mouse_button(*button);
                let kind = if self.is_double_click(btn, now) {
                    // A third press starts a new click sequence
                    self.last_press = None;
                    PointerKind::DoubleClick
                } else {
                    self.last_press = Some(Press {
                        button: btn,
                        at: now,
                        position: self.pointer,
                    });
                    PointerKind::Down
                };
                self.held |= btn;
                self.pointer_input(kind, btn)
            }

            MouseEvent::ButtonReleased { button, modifiers } => {
                self.modifiers = *modifiers;
                let btn = translate_mouse_button(*button);
                self.held.remove(btn);
                self.pointer_input(PointerKind::Up, btn)
            }

            MouseEvent::WheelScrolled { delta, modifiers } => {
                self.modifiers = *modifiers;
                let (delta_x, delta_y) = match delta {
                    ScrollDelta::Lines { x, y } => (
                        f64::from(*x) * WHEEL_UNITS_PER_LINE,
                        f64::from(*y) * WHEEL_UNITS_PER_LINE,
                    ),
                    ScrollDelta::Pixels { x, y } => (f64::from(*x), f64::from(*y)),
                };
                self.pointer_input(PointerKind::Wheel { delta_x, delta_y }, MouseButtons::empty())
            }

            MouseEvent::CursorEntered => self.pointer_input(PointerKind::Enter, MouseButtons::empty()),

            MouseEvent::CursorLeft => {
                self.last_press = None;
                self.pointer_input(PointerKind::Leave, MouseButtons::empty())
            }

            _ => return None, // Drag and drop is not forwarded
        };
        Some(HostEvent::Pointer(input))
    }

    fn translate_window(&mut self, event: &WindowEvent) -> Option<HostEvent> {
        match event {
            WindowEvent::Resized(info) => {
                self.scale_factor = info.scale();
                Some(HostEvent::Resize {
                    width: info.physical_size().width,
                    height: info.physical_size().height,
                    scale: info.scale(),
                })
            }
            WindowEvent::Focused => Some(HostEvent::Focus(true)),
            WindowEvent::Unfocused => Some(HostEvent::Focus(false)),
            WindowEvent::WillClose => Some(HostEvent::Close),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baseview::Point;

    fn moved(x: f64, y: f64) -> Event {
        Event::Mouse(MouseEvent::CursorMoved {
            position: Point::new(x, y),
            modifiers: Modifiers::empty(),
        })
    }

    fn pressed(button: MouseButton, modifiers: Modifiers) -> Event {
        Event::Mouse(MouseEvent::ButtonPressed { button, modifiers })
    }

    fn released(button: MouseButton) -> Event {
        Event::Mouse(MouseEvent::ButtonReleased {
            button,
            modifiers: Modifiers::empty(),
        })
    }

    fn pointer(event: Option<HostEvent>) -> PointerInput {
        match event {
            Some(HostEvent::Pointer(input)) => input,
            other => panic!("expected pointer input, got {:?}", other),
        }
    }

    #[test]
    fn test_position_scaled_to_physical() {
        let mut translator = EventTranslator::new(2.0);
        let input = pointer(translator.translate(&moved(5.25, 10.0)));
        assert_eq!(input.kind, PointerKind::Move);
        assert_eq!(input.position, PhysicalPosition::new(10.5, 20.0));
    }

    #[test]
    fn test_press_tracks_held_buttons() {
        let mut translator = EventTranslator::new(1.0);
        let now = Instant::now();
        translator.translate_at(&moved(10.0, 10.0), now);

        let down = pointer(translator.translate_at(&pressed(MouseButton::Left, Modifiers::SHIFT), now));
        assert_eq!(down.kind, PointerKind::Down);
        assert_eq!(down.button, MouseButtons::MAIN);
        assert_eq!(down.held, MouseButtons::MAIN);
        assert_eq!(down.modifiers, Modifiers::SHIFT);
        assert_eq!(down.position, PhysicalPosition::new(10.0, 10.0));

        let later = now + Duration::from_secs(1);
        let right = pointer(translator.translate_at(&pressed(MouseButton::Right, Modifiers::empty()), later));
        assert_eq!(right.held, MouseButtons::MAIN | MouseButtons::PROP);

        let up = pointer(translator.translate_at(&released(MouseButton::Left), later));
        assert_eq!(up.kind, PointerKind::Up);
        assert_eq!(up.button, MouseButtons::MAIN);
        assert_eq!(up.held, MouseButtons::PROP);
    }

    #[test]
    fn test_double_click_synthesized() {
        let mut translator = EventTranslator::new(1.0);
        let now = Instant::now();
        let first = pointer(translator.translate_at(&pressed(MouseButton::Left, Modifiers::empty()), now));
        translator.translate_at(&released(MouseButton::Left), now);
        let second_at = now + Duration::from_millis(200);
        let second = pointer(translator.translate_at(&pressed(MouseButton::Left, Modifiers::empty()), second_at));
        translator.translate_at(&released(MouseButton::Left), second_at);
        let third = pointer(translator.translate_at(&pressed(MouseButton::Left, Modifiers::empty()), second_at));

        assert_eq!(first.kind, PointerKind::Down);
        assert_eq!(second.kind, PointerKind::DoubleClick);
        assert_eq!(third.kind, PointerKind::Down);
    }

    #[test]
    fn test_slow_or_distant_press_is_not_double_click() {
        let mut translator = EventTranslator::new(1.0);
        let now = Instant::now();
        translator.translate_at(&pressed(MouseButton::Left, Modifiers::empty()), now);
        translator.translate_at(&released(MouseButton::Left), now);
        let slow = now + DOUBLE_CLICK_INTERVAL + Duration::from_millis(1);
        let input = pointer(translator.translate_at(&pressed(MouseButton::Left, Modifiers::empty()), slow));
        assert_eq!(input.kind, PointerKind::Down);

        translator.translate_at(&released(MouseButton::Left), slow);
        translator.translate_at(&moved(50.0, 50.0), slow);
        let input = pointer(translator.translate_at(&pressed(MouseButton::Left, Modifiers::empty()), slow));
        assert_eq!(input.kind, PointerKind::Down);
    }

    #[test]
    fn test_wheel_lines_scaled_to_angle_units() {
        let mut translator = EventTranslator::new(1.0);
        let event = Event::Mouse(MouseEvent::WheelScrolled {
            delta: ScrollDelta::Lines { x: 0.0, y: -1.0 },
            modifiers: Modifiers::CONTROL,
        });
        let input = pointer(translator.translate(&event));
        assert_eq!(input.kind, PointerKind::Wheel { delta_x: 0.0, delta_y: -120.0 });
        assert_eq!(input.modifiers, Modifiers::CONTROL);
    }

    #[test]
    fn test_key_event_translation() {
        let event = KeyboardEvent {
            state: KeyState::Down,
            key: Key::Character("q".into()),
            code: Code::KeyQ,
            ..Default::default()
        };
        let input = translate_key_event(&event);
        assert_eq!(input.key, VirtualKey::Other);
        assert_eq!(input.raw, 'Q' as u32);
        assert_eq!(input.text, "q");

        let release = KeyboardEvent {
            state: KeyState::Up,
            ..event
        };
        assert_eq!(translate_key_event(&release).text, "");
    }

    #[test]
    fn test_key_names_and_codes() {
        assert_eq!(translate_virtual_key(&Key::F12), VirtualKey::F(12));
        assert_eq!(translate_virtual_key(&Key::Shift), VirtualKey::Shift);
        assert_eq!(translate_virtual_key(&Key::Control), VirtualKey::Other);
        assert_eq!(translate_scan_code(Code::ShiftRight), ScanCode::ShiftRight);
        assert_eq!(translate_scan_code(Code::KeyA), ScanCode::Other);
        assert!(raw_key_value(&Key::Character("ab".into()), Code::Unidentified) >= NAMED_KEY_BASE);
        assert_eq!(raw_key_value(&Key::Unidentified, Code::Unidentified), 0);
        assert_eq!(raw_key_value(&Key::Character("z".into()), Code::KeyZ), 'Z' as u32);
    }

    #[test]
    fn test_named_keys_get_distinct_raw_values() {
        let keys = [
            raw_key_value(&Key::Meta, Code::MetaLeft),
            raw_key_value(&Key::Meta, Code::MetaRight),
            raw_key_value(&Key::AltGraph, Code::AltRight),
            raw_key_value(&Key::MediaPlayPause, Code::MediaPlayPause),
            raw_key_value(&Key::AudioVolumeUp, Code::Unidentified),
            raw_key_value(&Key::AudioVolumeDown, Code::Unidentified),
        ];
        for (i, a) in keys.iter().enumerate() {
            assert!(*a >= NAMED_KEY_BASE, "{:#x} collides with character codes", a);
            for b in &keys[i + 1..] {
                assert_ne!(a, b);
            }
        }
        // Stable for the same key
        assert_eq!(keys[0], raw_key_value(&Key::Meta, Code::MetaLeft));
    }

    #[test]
    fn test_focus_events() {
        let mut translator = EventTranslator::new(1.0);
        assert_eq!(
            translator.translate(&Event::Window(WindowEvent::Focused)),
            Some(HostEvent::Focus(true))
        );
        assert_eq!(
            translator.translate(&Event::Window(WindowEvent::Unfocused)),
            Some(HostEvent::Focus(false))
        );
    }
}
