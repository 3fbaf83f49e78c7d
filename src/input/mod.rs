//! Translation of native pointer/keyboard state into runtime payloads.

pub mod keyboard;

use bitflags::bitflags;
use crossterm::event::{KeyModifiers, MouseButton};

use crate::native::{MOUSE_BUTTONS_MASK, ModifierState, ScrollDirection};

bitflags! {
    /// Pressed pointer buttons as reported to the runtime.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MouseButtons: u8 {
        const PRIMARY = 1 << 0;
        const MIDDLE = 1 << 1;
        const SECONDARY = 1 << 2;
    }
}

pub fn key_modifiers(state: ModifierState) -> KeyModifiers {
    let mut mods = KeyModifiers::NONE;
    if state.contains(ModifierState::SHIFT) {
        mods |= KeyModifiers::SHIFT;
    }
    if state.contains(ModifierState::CONTROL) {
        mods |= KeyModifiers::CONTROL;
    }
    if state.contains(ModifierState::MOD1) {
        mods |= KeyModifiers::ALT;
    }
    if state.intersects(ModifierState::MOD4 | ModifierState::SUPER) {
        mods |= KeyModifiers::SUPER;
    }
    if state.contains(ModifierState::META) {
        mods |= KeyModifiers::META;
    }
    mods
}

/// Buttons held in `state`, restricted to the three primary buttons.
pub fn pressed_buttons(state: ModifierState) -> MouseButtons {
    let state = state & MOUSE_BUTTONS_MASK;
    let mut buttons = MouseButtons::empty();
    if state.contains(ModifierState::BUTTON1) {
        buttons |= MouseButtons::PRIMARY;
    }
    if state.contains(ModifierState::BUTTON2) {
        buttons |= MouseButtons::MIDDLE;
    }
    if state.contains(ModifierState::BUTTON3) {
        buttons |= MouseButtons::SECONDARY;
    }
    buttons
}

/// State bit for a toolkit button number; wheel and extra buttons map to none.
pub fn button_mask(button: u32) -> ModifierState {
    match button {
        1 => ModifierState::BUTTON1,
        2 => ModifierState::BUTTON2,
        3 => ModifierState::BUTTON3,
        _ => ModifierState::empty(),
    }
}

pub fn mouse_button(button: u32) -> Option<MouseButton> {
    match button {
        1 => Some(MouseButton::Left),
        2 => Some(MouseButton::Middle),
        3 => Some(MouseButton::Right),
        _ => None,
    }
}

/// The button reported with a drag: primary wins over middle over secondary.
pub fn dominant_button(buttons: MouseButtons) -> Option<MouseButton> {
    if buttons.contains(MouseButtons::PRIMARY) {
        Some(MouseButton::Left)
    } else if buttons.contains(MouseButtons::MIDDLE) {
        Some(MouseButton::Middle)
    } else if buttons.contains(MouseButtons::SECONDARY) {
        Some(MouseButton::Right)
    } else {
        None
    }
}

/// Unit wheel deltas `(dx, dy)`; Shift turns vertical scrolling horizontal.
pub fn scroll_deltas(direction: ScrollDirection, state: ModifierState) -> (f64, f64) {
    let (dx, dy) = match direction {
        ScrollDirection::Up => (0.0, 1.0),
        ScrollDirection::Down => (0.0, -1.0),
        ScrollDirection::Left => (1.0, 0.0),
        ScrollDirection::Right => (-1.0, 0.0),
    };
    if state.contains(ModifierState::SHIFT) {
        (dy, dx)
    } else {
        (dx, dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_buttons_never_count_as_pressed() {
        let state = ModifierState::BUTTON1 | ModifierState::BUTTON4 | ModifierState::BUTTON5;
        assert_eq!(pressed_buttons(state), MouseButtons::PRIMARY);
    }

    #[test]
    fn super_and_mod4_both_map_to_super() {
        assert_eq!(key_modifiers(ModifierState::MOD4), KeyModifiers::SUPER);
        assert_eq!(key_modifiers(ModifierState::SUPER), KeyModifiers::SUPER);
        assert_eq!(
            key_modifiers(ModifierState::SHIFT | ModifierState::MOD1),
            KeyModifiers::SHIFT | KeyModifiers::ALT
        );
    }

    #[test]
    fn shift_swaps_scroll_axes() {
        assert_eq!(
            scroll_deltas(ScrollDirection::Up, ModifierState::empty()),
            (0.0, 1.0)
        );
        assert_eq!(
            scroll_deltas(ScrollDirection::Up, ModifierState::SHIFT),
            (1.0, 0.0)
        );
        assert_eq!(
            scroll_deltas(ScrollDirection::Right, ModifierState::empty()),
            (-1.0, 0.0)
        );
    }

    #[test]
    fn drag_button_priority() {
        assert_eq!(
            dominant_button(MouseButtons::SECONDARY | MouseButtons::MIDDLE),
            Some(MouseButton::Middle)
        );
        assert_eq!(dominant_button(MouseButtons::empty()), None);
    }
}
