// Keysym translation for key events. X keysyms arrive raw from the display
// client; this module turns them into crossterm key codes plus the character
// a press produces, which is what the view peer consumes.
use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, ModifierKeyCode};

use super::key_modifiers;
use crate::native::{KeyEvent, ModifierState};
use crate::peer::KeyNotification;

/// Result of translating one native key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatedKey {
    pub notification: KeyNotification,
    /// Character to report as typed after a press.
    pub typed: Option<char>,
}

pub fn key_code(keyval: u32) -> Option<KeyCode> {
    let code = match keyval {
        0xff08 => KeyCode::Backspace,
        0xff09 => KeyCode::Tab,
        0xfe20 => KeyCode::BackTab,
        0xff0d | 0xff8d => KeyCode::Enter,
        0xff13 => KeyCode::Pause,
        0xff14 => KeyCode::ScrollLock,
        0xff1b => KeyCode::Esc,
        0xff50 => KeyCode::Home,
        0xff51 => KeyCode::Left,
        0xff52 => KeyCode::Up,
        0xff53 => KeyCode::Right,
        0xff54 => KeyCode::Down,
        0xff55 => KeyCode::PageUp,
        0xff56 => KeyCode::PageDown,
        0xff57 => KeyCode::End,
        0xff61 => KeyCode::PrintScreen,
        0xff63 => KeyCode::Insert,
        0xff67 => KeyCode::Menu,
        0xff7f => KeyCode::NumLock,
        0xffe5 => KeyCode::CapsLock,
        0xffff => KeyCode::Delete,
        0xffe1 => KeyCode::Modifier(ModifierKeyCode::LeftShift),
        0xffe2 => KeyCode::Modifier(ModifierKeyCode::RightShift),
        0xffe3 => KeyCode::Modifier(ModifierKeyCode::LeftControl),
        0xffe4 => KeyCode::Modifier(ModifierKeyCode::RightControl),
        0xffe7 => KeyCode::Modifier(ModifierKeyCode::LeftMeta),
        0xffe8 => KeyCode::Modifier(ModifierKeyCode::RightMeta),
        0xffe9 => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
        0xffea => KeyCode::Modifier(ModifierKeyCode::RightAlt),
        0xffeb => KeyCode::Modifier(ModifierKeyCode::LeftSuper),
        0xffec => KeyCode::Modifier(ModifierKeyCode::RightSuper),
        // F1..F24
        0xffbe..=0xffd5 => KeyCode::F((keyval - 0xffbe + 1) as u8),
        // keypad digits
        0xffb0..=0xffb9 => KeyCode::Char(char::from(b'0' + (keyval - 0xffb0) as u8)),
        _ => return keysym_char(keyval).map(|c| KeyCode::Char(c.to_ascii_lowercase())),
    };
    Some(code)
}

/// Unicode value of a printable keysym.
fn keysym_char(keyval: u32) -> Option<char> {
    match keyval {
        0x20..=0x7e | 0xa0..=0xff => char::from_u32(keyval),
        0x0100_0000..=0x0110_ffff => char::from_u32(keyval - 0x0100_0000),
        0xffb0..=0xffb9 => char::from_u32(u32::from(b'0') + keyval - 0xffb0),
        _ => None,
    }
}

/// Character produced by a key, including control codes.
///
/// With Control held, `a`..`z` become the matching control characters.
pub fn key_text(keyval: u32, state: ModifierState) -> Option<char> {
    let c = match keyval {
        0xff08 => '\u{8}',
        0xff09 => '\t',
        0xff0d | 0xff8d => '\r',
        0xff1b => '\u{1b}',
        0xffff => '\u{7f}',
        _ => keysym_char(keyval)?,
    };
    if c.is_ascii_lowercase() && state.contains(ModifierState::CONTROL) {
        return char::from_u32(c as u32 - u32::from(b'a') + 1);
    }
    Some(c)
}

/// Modifier bit that a modifier key itself contributes.
pub fn modifier_for_key(code: &KeyCode) -> KeyModifiers {
    match code {
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
            KeyModifiers::SHIFT
        }
        KeyCode::Modifier(ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl) => {
            KeyModifiers::CONTROL
        }
        KeyCode::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt) => {
            KeyModifiers::ALT
        }
        KeyCode::Modifier(ModifierKeyCode::LeftSuper | ModifierKeyCode::RightSuper) => {
            KeyModifiers::SUPER
        }
        KeyCode::Modifier(ModifierKeyCode::LeftMeta | ModifierKeyCode::RightMeta) => {
            KeyModifiers::META
        }
        _ => KeyModifiers::NONE,
    }
}

/// Translate a native key event.
///
/// The native state describes modifiers before the event, while the runtime
/// expects them after it: pressing Shift reports SHIFT, releasing it does not.
pub fn translate_key(event: &KeyEvent) -> TranslatedKey {
    let code = key_code(event.keyval);
    let mut modifiers = key_modifiers(event.state);
    if let Some(code) = &code {
        let own = modifier_for_key(code);
        if event.press {
            modifiers |= own;
        } else {
            modifiers.remove(own);
        }
    }
    let text = key_text(event.keyval, event.state);
    let kind = if event.press {
        KeyEventKind::Press
    } else {
        KeyEventKind::Release
    };
    TranslatedKey {
        notification: KeyNotification {
            kind,
            code,
            text,
            modifiers,
        },
        typed: if event.press { text } else { None },
    }
}
