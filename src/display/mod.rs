//! Display-protocol façade.
//!
//! Contexts never talk to the toolkit or the display connection directly;
//! they issue synchronous, fire-and-forget requests through `DisplayClient`.
//! Anything the server confirms later (configure, map, property changes)
//! comes back as a `NativeEvent` through an `EventSource` and is routed like
//! every other native event.

pub mod sim;

use std::time::Duration;

use crate::geometry::{FrameExtents, SizeHints};
use crate::native::{KeyEvent, NativeEvent, NativeWindow, ScreenId, WmFunctions};

/// What kind of native window to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
    TopLevel {
        /// Override-redirect: no decorations, not managed by the WM.
        popup: bool,
        utility: bool,
        decorated: bool,
        transparent: bool,
        functions: WmFunctions,
    },
    /// Embedded into `parent` at the given offset.
    Child {
        parent: NativeWindow,
        x: i32,
        y: i32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Text,
    Crosshair,
    Hand,
    Move,
    Wait,
    ResizeNorthSouth,
    ResizeEastWest,
    ResizeNorthWestSouthEast,
    ResizeNorthEastSouthWest,
    Hidden,
    /// Cursor object previously created by the display client.
    Custom(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA pixels.
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BgColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrabKind {
    /// Pointer only, held for the duration of a mouse drag.
    Pointer,
    /// Exclusive pointer and keyboard grab.
    PointerAndKeyboard,
}

/// Input context created by the input method for one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputContextId(pub u64);

/// Outcome of offering a key event to the input method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImeFilter {
    /// Not handled; translate normally.
    Passthrough,
    /// Swallowed as part of an ongoing composition.
    Consumed,
    /// Swallowed, and composition produced text.
    Committed(String),
}

/// `_NET_WM_STATE` flags relevant to the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetWmState {
    pub hidden: bool,
    pub above: bool,
}

pub trait DisplayClient {
    fn create_window(&self, spec: WindowSpec) -> NativeWindow;
    /// Release the native window. Issued once, when the context is freed.
    fn destroy_window(&self, window: NativeWindow);

    fn show(&self, window: NativeWindow);
    fn hide(&self, window: NativeWindow);

    /// Move the frame origin.
    fn move_window(&self, window: NativeWindow, x: i32, y: i32);
    /// Resize the client area.
    fn resize(&self, window: NativeWindow, width: i32, height: i32);
    fn set_size_hints(&self, window: NativeWindow, hints: SizeHints);

    fn set_title(&self, window: NativeWindow, title: &str);
    fn set_opacity(&self, window: NativeWindow, alpha: f64);
    fn set_icon(&self, window: NativeWindow, icon: Option<&Icon>);
    fn set_cursor(&self, window: NativeWindow, cursor: Cursor);
    fn set_background(&self, window: NativeWindow, color: BgColor);
    fn set_accept_focus(&self, window: NativeWindow, accept: bool);
    /// Ask the window manager to activate (focus and raise) the window.
    fn activate(&self, window: NativeWindow);

    fn set_keep_above(&self, window: NativeWindow, above: bool);
    fn set_transient_for(&self, window: NativeWindow, parent: Option<NativeWindow>);
    fn set_modal_hint(&self, window: NativeWindow, modal: bool);
    fn set_fullscreen(&self, window: NativeWindow, fullscreen: bool);
    fn set_maximized(&self, window: NativeWindow, maximized: bool);
    fn set_iconified(&self, window: NativeWindow, iconified: bool);
    fn set_functions(&self, _window: NativeWindow, _functions: WmFunctions) {}
    fn restack(&self, window: NativeWindow, above: bool);

    /// Send `_NET_REQUEST_FRAME_EXTENTS`; the reply is a property event.
    fn request_frame_extents(&self, window: NativeWindow);
    /// Read `_NET_FRAME_EXTENTS`; `None` when unset or unreadable.
    fn frame_extents(&self, window: NativeWindow) -> Option<FrameExtents>;
    /// Read `_NET_WM_STATE`.
    fn net_wm_state(&self, window: NativeWindow) -> Option<NetWmState>;

    fn grab(&self, window: NativeWindow, kind: GrabKind) -> bool;
    fn ungrab(&self, kind: GrabKind);

    fn screen_at(&self, x: i32, y: i32) -> Option<ScreenId>;

    /// Blit a `width`x`height` ARGB32 buffer, over `background` when set.
    fn draw(
        &self,
        window: NativeWindow,
        data: &[u8],
        width: u32,
        height: u32,
        background: Option<BgColor>,
    );
    /// Derive the input shape from the buffer's alpha channel.
    fn apply_shape_mask(&self, window: NativeWindow, data: &[u8], width: u32, height: u32);

    fn create_input_context(&self, _window: NativeWindow) -> Option<InputContextId> {
        None
    }
    fn reset_input_context(&self, _ic: InputContextId) {}
    fn set_input_focus(&self, _ic: InputContextId, _focused: bool) {}
    fn filter_key(&self, _ic: InputContextId, _event: &KeyEvent) -> ImeFilter {
        ImeFilter::Passthrough
    }
    fn destroy_input_context(&self, _ic: InputContextId) {}
}

/// Source of native events for the event loop.
pub trait EventSource {
    fn poll_event(&self) -> Option<NativeEvent>;

    /// Block for up to `timeout` waiting for the next event. Sources that
    /// cannot block fall back to a plain poll.
    fn wait_event(&self, timeout: Duration) -> Option<NativeEvent> {
        let _ = timeout;
        self.poll_event()
    }
}

impl<T: EventSource + ?Sized> EventSource for std::rc::Rc<T> {
    fn poll_event(&self) -> Option<NativeEvent> {
        (**self).poll_event()
    }

    fn wait_event(&self, timeout: Duration) -> Option<NativeEvent> {
        (**self).wait_event(timeout)
    }
}
