//! Managed-runtime peer surface.
//!
//! Every context holds up to two opaque peers: the *window* peer (stage-level
//! notifications such as move, resize, focus, state) and the *view* peer
//! (content-level notifications such as input and repaint). Payloads are
//! fixed value types so the runtime never sees toolkit event structures.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEventKind, KeyModifiers, MouseButton};

use crate::input::MouseButtons;
use crate::native::ScreenId;

/// Window state reported with resize and state-change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Minimized,
    Maximized,
    Restored,
}

/// Stacking layer of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Normal,
    Floating,
    TopMost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusChange {
    Gained,
    Lost,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WindowNotification {
    Resize {
        state: WindowState,
        width: i32,
        height: i32,
    },
    Move {
        x: i32,
        y: i32,
    },
    Focus(FocusChange),
    /// Focus arrived while the window is disabled (e.g. behind a modal).
    FocusDisabled,
    FocusUngrab,
    StateChanged(WindowState),
    /// The user or window manager changed this window's own level.
    LevelChanged(Level),
    /// The effective always-on-top state changed through an ancestor.
    EffectiveOnTop(bool),
    CloseRequested,
    Destroyed,
    MovedToScreen(ScreenId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseAction {
    Down,
    Up,
    Drag,
    Move,
    Enter,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseNotification {
    pub action: MouseAction,
    pub button: Option<MouseButton>,
    pub x: i32,
    pub y: i32,
    pub x_abs: i32,
    pub y_abs: i32,
    pub modifiers: KeyModifiers,
    pub buttons: MouseButtons,
    pub popup_trigger: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollNotification {
    pub x: i32,
    pub y: i32,
    pub x_abs: i32,
    pub y_abs: i32,
    pub dx: f64,
    pub dy: f64,
    pub modifiers: KeyModifiers,
    pub buttons: MouseButtons,
    pub multiplier_x: f64,
    pub multiplier_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotification {
    pub kind: KeyEventKind,
    pub code: Option<KeyCode>,
    pub text: Option<char>,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewNotification {
    Mouse(MouseNotification),
    Menu {
        x: i32,
        y: i32,
        x_abs: i32,
        y_abs: i32,
        keyboard_trigger: bool,
    },
    Scroll(ScrollNotification),
    Key(KeyNotification),
    /// A character produced by a key press, delivered after the press.
    KeyTyped {
        text: char,
        modifiers: KeyModifiers,
    },
    InputMethodCommit(String),
    Repaint {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    Resize {
        width: i32,
        height: i32,
    },
    Removed,
}

pub trait WindowPeer {
    fn notify(&self, notification: WindowNotification);

    /// Pulled on demand; a disabled window ignores close and focus requests.
    fn is_enabled(&self) -> bool {
        true
    }
}

pub trait ViewPeer {
    fn notify(&self, notification: ViewNotification);
}

/// Peer that records everything it receives.
///
/// Shared through `Rc` so a caller can keep inspecting it after handing a
/// clone to a context.
#[derive(Debug, Default)]
pub struct RecordingPeer {
    window: RefCell<Vec<WindowNotification>>,
    view: RefCell<Vec<ViewNotification>>,
    disabled: Cell<bool>,
}

impl RecordingPeer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.disabled.set(!enabled);
    }

    pub fn window_events(&self) -> Vec<WindowNotification> {
        self.window.borrow().clone()
    }

    pub fn view_events(&self) -> Vec<ViewNotification> {
        self.view.borrow().clone()
    }

    /// Drain both queues.
    pub fn clear(&self) {
        self.window.borrow_mut().clear();
        self.view.borrow_mut().clear();
    }

    pub fn has_window_event(&self, notification: &WindowNotification) -> bool {
        self.window.borrow().iter().any(|n| n == notification)
    }
}

impl WindowPeer for RecordingPeer {
    fn notify(&self, notification: WindowNotification) {
        self.window.borrow_mut().push(notification);
    }

    fn is_enabled(&self) -> bool {
        !self.disabled.get()
    }
}

impl ViewPeer for RecordingPeer {
    fn notify(&self, notification: ViewNotification) {
        self.view.borrow_mut().push(notification);
    }
}
