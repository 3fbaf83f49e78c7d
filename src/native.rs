//! Native display-server event vocabulary.
//!
//! These are the raw, toolkit-shaped events that arrive on the event thread
//! and get routed to a context's `process_*` entry points. Field meanings
//! follow the display protocol: button/modifier state describes the state
//! *just before* the event, coordinates are window-relative (`x`, `y`) and
//! root-relative (`x_root`, `y_root`).

use bitflags::bitflags;

/// Opaque native window handle issued by the display client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeWindow(pub u64);

/// Identifier of a physical screen as reported by the display client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScreenId(pub u64);

bitflags! {
    /// Keyboard modifier and pointer button state carried by input events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierState: u32 {
        const SHIFT = 1 << 0;
        const LOCK = 1 << 1;
        const CONTROL = 1 << 2;
        const MOD1 = 1 << 3;
        const MOD4 = 1 << 6;
        const BUTTON1 = 1 << 8;
        const BUTTON2 = 1 << 9;
        const BUTTON3 = 1 << 10;
        const BUTTON4 = 1 << 11;
        const BUTTON5 = 1 << 12;
        const SUPER = 1 << 26;
        const META = 1 << 28;
    }
}

/// Only the three primary buttons participate in button-state derivation.
pub const MOUSE_BUTTONS_MASK: ModifierState = ModifierState::BUTTON1
    .union(ModifierState::BUTTON2)
    .union(ModifierState::BUTTON3);

bitflags! {
    /// Window-manager state bits reported by window-state events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmState: u32 {
        const WITHDRAWN = 1 << 0;
        const ICONIFIED = 1 << 1;
        const MAXIMIZED = 1 << 2;
        const STICKY = 1 << 3;
        const FULLSCREEN = 1 << 4;
        const ABOVE = 1 << 5;
        const BELOW = 1 << 6;
        const FOCUSED = 1 << 7;
    }
}

bitflags! {
    /// Decoration functions the window manager offers for a window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WmFunctions: u32 {
        const ALL = 1 << 0;
        const RESIZE = 1 << 1;
        const MOVE = 1 << 2;
        const MINIMIZE = 1 << 3;
        const MAXIMIZE = 1 << 4;
        const CLOSE = 1 << 5;
    }
}

/// Window properties whose change is announced by a property-notify event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyAtom {
    /// `_NET_WM_STATE`
    WmState,
    /// `_NET_FRAME_EXTENTS`
    FrameExtents,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureEvent {
    /// Frame origin as placed by the window manager.
    pub x: i32,
    pub y: i32,
    /// Client (content) area size.
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposeEvent {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub press: bool,
    /// Toolkit button number: 1 primary, 2 middle, 3 secondary.
    pub button: u32,
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
    pub state: ModifierState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionEvent {
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
    pub state: ModifierState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollEvent {
    pub direction: ScrollDirection,
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
    pub state: ModifierState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossingEvent {
    pub enter: bool,
    pub x: f64,
    pub y: f64,
    pub x_root: f64,
    pub y_root: f64,
    pub state: ModifierState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub press: bool,
    /// X keysym value.
    pub keyval: u32,
    pub hardware_keycode: u16,
    pub state: ModifierState,
}

impl KeyEvent {
    pub fn press(keyval: u32, state: ModifierState) -> Self {
        Self {
            press: true,
            keyval,
            hardware_keycode: 0,
            state,
        }
    }

    pub fn release(keyval: u32, state: ModifierState) -> Self {
        Self {
            press: false,
            ..Self::press(keyval, state)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStateEvent {
    pub changed: WmState,
    pub new_state: WmState,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NativeEventKind {
    Property(PropertyAtom),
    Configure(ConfigureEvent),
    Map,
    Focus { focus_in: bool },
    Destroy,
    Delete,
    Expose(ExposeEvent),
    Button(ButtonEvent),
    Motion(MotionEvent),
    Scroll(ScrollEvent),
    Crossing(CrossingEvent),
    Key(KeyEvent),
    WindowState(WindowStateEvent),
    ScreenChanged,
}

/// A native event addressed to one window.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeEvent {
    pub window: NativeWindow,
    pub kind: NativeEventKind,
}

impl NativeEvent {
    pub fn new(window: NativeWindow, kind: NativeEventKind) -> Self {
        Self { window, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_button_mask_excludes_wheel_buttons() {
        assert!(MOUSE_BUTTONS_MASK.contains(ModifierState::BUTTON3));
        assert!(!MOUSE_BUTTONS_MASK.contains(ModifierState::BUTTON4));
        assert!(!MOUSE_BUTTONS_MASK.contains(ModifierState::BUTTON5));
    }

    #[test]
    fn key_release_keeps_keyval() {
        let k = KeyEvent::release(0x61, ModifierState::SHIFT);
        assert!(!k.press);
        assert_eq!(k.keyval, 0x61);
        assert_eq!(k.state, ModifierState::SHIFT);
    }
}
