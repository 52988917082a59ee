//! Host input to engine message translation
//!
//! Host-neutral pointer and key inputs are turned into the engine's mouse
//! and key messages. The bit layouts live in small pure helpers so they can
//! be checked without any window around.
//!
//! Wheel wire layout (one `u32` carried in the mouse message's button field):
//!
//! ```text
//!  31            16 15             0
//! +----------------+----------------+
//! |  horizontal dx |  vertical dy   |   each an i16, two's complement
//! +----------------+----------------+
//! ```

use dpi::PhysicalPosition;
use keyboard_types::{KeyState, Modifiers};

use crate::engine::{KeyEvent, KeyMessage, KeyboardStates, MouseButtons, MouseEvent, MouseMessage};
use crate::keymap::{self, ScanCode, VirtualKey};

/// Wheel angle units per scrolled line
pub const WHEEL_UNITS_PER_LINE: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerKind {
    Down,
    Up,
    DoubleClick,
    Move,
    Enter,
    Leave,
    /// Deltas in wheel angle units, positive = right / up
    Wheel { delta_x: f64, delta_y: f64 },
}

/// A pointer event in region-local physical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub position: PhysicalPosition<f64>,
    /// Button that changed state with this event, empty if none
    pub button: MouseButtons,
    /// Buttons held after this event
    pub held: MouseButtons,
    pub modifiers: Modifiers,
}

impl PointerInput {
    /// Button and wheel input repaints right away instead of waiting for
    /// the engine to invalidate.
    pub fn requests_repaint(&self) -> bool {
        matches!(
            self.kind,
            PointerKind::Down | PointerKind::Up | PointerKind::DoubleClick | PointerKind::Wheel { .. }
        )
    }
}

/// A key press or release
#[derive(Debug, Clone, PartialEq)]
pub struct KeyInput {
    pub state: KeyState,
    pub key: VirtualKey,
    pub scan: ScanCode,
    /// Host value passed through when the key has no engine code
    pub raw: u32,
    /// Text produced by a key press, empty for releases
    pub text: String,
    pub modifiers: Modifiers,
}

/// Fold host modifiers into the engine's modifier mask.
pub fn keyboard_states(mods: Modifiers) -> KeyboardStates {
    let mut result = KeyboardStates::empty();
    if mods.contains(Modifiers::SHIFT) {
        result |= KeyboardStates::SHIFT;
    }
    if mods.contains(Modifiers::CONTROL) {
        result |= KeyboardStates::CONTROL;
    }
    if mods.contains(Modifiers::ALT) {
        result |= KeyboardStates::ALT;
    }
    result
}

/// The transition button and the held set each contribute their bits.
pub fn button_mask(transition: MouseButtons, held: MouseButtons) -> MouseButtons {
    transition | held
}

/// Truncate a wheel delta and clamp it to the signed 16-bit range.
pub fn clamp_wheel_delta(delta: f64) -> i16 {
    delta.trunc().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}

/// Pack horizontal and vertical wheel deltas into the wire value.
pub fn pack_wheel_deltas(delta_x: f64, delta_y: f64) -> u32 {
    let dx = clamp_wheel_delta(delta_x) as u16 as u32;
    let dy = clamp_wheel_delta(delta_y) as u16 as u32;
    (dx << 16) | dy
}

/// Split a packed wheel value back into (horizontal, vertical).
pub fn unpack_wheel_deltas(packed: u32) -> (i16, i16) {
    ((packed >> 16) as u16 as i16, (packed & 0xFFFF) as u16 as i16)
}

/// Truncate a position to whole device pixels.
pub fn region_position(position: PhysicalPosition<f64>) -> PhysicalPosition<i32> {
    PhysicalPosition::new(position.x as i32, position.y as i32)
}

/// Build the engine mouse message for a pointer input.
pub fn pointer_message(input: &PointerInput) -> MouseMessage {
    let position = region_position(input.position);
    let modifiers = keyboard_states(input.modifiers);
    let buttons = button_mask(input.button, input.held);

    match input.kind {
        PointerKind::Down => mouse(MouseEvent::Down, buttons, modifiers, position),
        PointerKind::Up => mouse(MouseEvent::Up, buttons, modifiers, position),
        PointerKind::DoubleClick => mouse(MouseEvent::DoubleClick, buttons, modifiers, position),
        PointerKind::Move => mouse(MouseEvent::Move, buttons, modifiers, position),
        PointerKind::Enter => mouse(MouseEvent::Enter, buttons, modifiers, position),
        PointerKind::Leave => mouse(
            MouseEvent::Leave,
            MouseButtons::empty(),
            KeyboardStates::empty(),
            PhysicalPosition::new(0, 0),
        ),
        PointerKind::Wheel { delta_x, delta_y } => mouse(
            MouseEvent::Wheel,
            MouseButtons::from_bits_retain(pack_wheel_deltas(delta_x, delta_y)),
            modifiers,
            position,
        ),
    }
}

fn mouse(
    event: MouseEvent,
    buttons: MouseButtons,
    modifiers: KeyboardStates,
    position: PhysicalPosition<i32>,
) -> MouseMessage {
    MouseMessage {
        event,
        buttons,
        modifiers,
        position,
    }
}

/// Build the engine key messages for a key input.
///
/// A press yields the translated key-down followed by one character message
/// per code point of its text. A release yields a single key-up.
pub fn key_messages(input: &KeyInput) -> Vec<KeyMessage> {
    let code = keymap::translate_key(input.key, input.scan, input.raw);
    let modifiers = keyboard_states(input.modifiers);

    match input.state {
        KeyState::Down => {
            let mut messages = Vec::with_capacity(1 + input.text.len());
            messages.push(KeyMessage {
                event: KeyEvent::Down,
                code,
                modifiers,
            });
            messages.extend(input.text.chars().map(|ch| KeyMessage {
                event: KeyEvent::Char,
                code: ch as u32,
                modifiers: KeyboardStates::empty(),
            }));
            messages
        }
        KeyState::Up => vec![KeyMessage {
            event: KeyEvent::Up,
            code,
            modifiers,
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pointer(kind: PointerKind, x: f64, y: f64) -> PointerInput {
        PointerInput {
            kind,
            position: PhysicalPosition::new(x, y),
            button: MouseButtons::empty(),
            held: MouseButtons::empty(),
            modifiers: Modifiers::empty(),
        }
    }

    fn key(state: KeyState, key: VirtualKey, raw: u32, text: &str) -> KeyInput {
        KeyInput {
            state,
            key,
            scan: ScanCode::Other,
            raw,
            text: text.to_string(),
            modifiers: Modifiers::empty(),
        }
    }

    #[test]
    fn test_wheel_packing_layout() {
        let packed = pack_wheel_deltas(-120.0, 240.0);
        assert_eq!(packed >> 16, 0xFF88);
        assert_eq!(packed & 0xFFFF, 240);
        assert_eq!(unpack_wheel_deltas(packed), (-120, 240));
    }

    #[test]
    fn test_wheel_deltas_clamp_independently() {
        let packed = pack_wheel_deltas(1.0e9, -1.0e9);
        assert_eq!(unpack_wheel_deltas(packed), (i16::MAX, i16::MIN));

        let packed = pack_wheel_deltas(0.0, -1.0);
        assert_eq!(packed >> 16, 0);
        assert_eq!(unpack_wheel_deltas(packed), (0, -1));
    }

    #[test]
    fn test_wheel_deltas_truncate() {
        assert_eq!(clamp_wheel_delta(12.9), 12);
        assert_eq!(clamp_wheel_delta(-12.9), -12);
        assert_eq!(clamp_wheel_delta(f64::NAN), 0);
    }

    #[test]
    fn test_button_mask_union() {
        assert_eq!(
            button_mask(MouseButtons::PROP, MouseButtons::MAIN),
            MouseButtons::MAIN | MouseButtons::PROP
        );
        // Released button still reported on its own up event
        assert_eq!(button_mask(MouseButtons::MIDDLE, MouseButtons::empty()), MouseButtons::MIDDLE);
    }

    #[test]
    fn test_modifier_mask() {
        let mods = Modifiers::SHIFT | Modifiers::ALT | Modifiers::META;
        assert_eq!(keyboard_states(mods), KeyboardStates::SHIFT | KeyboardStates::ALT);
        assert_eq!(keyboard_states(Modifiers::CONTROL), KeyboardStates::CONTROL);
    }

    #[test]
    fn test_pointer_position_truncated() {
        let msg = pointer_message(&pointer(PointerKind::Move, 10.9, 20.2));
        assert_eq!(msg.event, MouseEvent::Move);
        assert_eq!(msg.position, PhysicalPosition::new(10, 20));
    }

    #[test]
    fn test_leave_is_blank() {
        let mut input = pointer(PointerKind::Leave, 55.0, 66.0);
        input.held = MouseButtons::MAIN;
        input.modifiers = Modifiers::SHIFT;
        let msg = pointer_message(&input);
        assert_eq!(msg.event, MouseEvent::Leave);
        assert!(msg.buttons.is_empty());
        assert!(msg.modifiers.is_empty());
        assert_eq!(msg.position, PhysicalPosition::new(0, 0));
    }

    #[test]
    fn test_wheel_message_carries_packed_deltas() {
        let input = pointer(PointerKind::Wheel { delta_x: 0.0, delta_y: -120.0 }, 3.0, 4.0);
        let msg = pointer_message(&input);
        assert_eq!(msg.event, MouseEvent::Wheel);
        assert_eq!(unpack_wheel_deltas(msg.buttons.bits()), (0, -120));
        assert!(input.requests_repaint());
    }

    #[test]
    fn test_repaint_only_for_buttons_and_wheel() {
        assert!(pointer(PointerKind::Down, 0.0, 0.0).requests_repaint());
        assert!(pointer(PointerKind::DoubleClick, 0.0, 0.0).requests_repaint());
        assert!(!pointer(PointerKind::Move, 0.0, 0.0).requests_repaint());
        assert!(!pointer(PointerKind::Enter, 0.0, 0.0).requests_repaint());
        assert!(!pointer(PointerKind::Leave, 0.0, 0.0).requests_repaint());
    }

    #[test]
    fn test_key_down_then_chars() {
        let mut input = key(KeyState::Down, VirtualKey::Other, 'A' as u32, "aé");
        input.modifiers = Modifiers::SHIFT;
        let messages = key_messages(&input);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].event, KeyEvent::Down);
        assert_eq!(messages[0].code, 'A' as u32);
        assert_eq!(messages[0].modifiers, KeyboardStates::SHIFT);
        assert_eq!(messages[1].event, KeyEvent::Char);
        assert_eq!(messages[1].code, 'a' as u32);
        assert!(messages[1].modifiers.is_empty());
        assert_eq!(messages[2].code, 'é' as u32);
    }

    #[test]
    fn test_key_up_single_message() {
        let messages = key_messages(&key(KeyState::Up, VirtualKey::Escape, 0, "ignored"));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event, KeyEvent::Up);
        assert_eq!(messages[0].code, keymap::codes::ESCAPE);
    }
}
