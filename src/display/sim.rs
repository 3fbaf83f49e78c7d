//! In-memory display server with a minimal window manager.
//!
//! `SimulatedDisplay` answers every `DisplayClient` request the way a
//! reparenting window manager would: mapping a decorated window publishes
//! frame extents, geometry changes of mapped windows produce configure
//! events, state changes produce window-state and property events. Events
//! are queued and handed out through `EventSource`, so callers observe the
//! same asynchronous ordering as with a real server.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::time::Duration;

use super::{
    BgColor, Cursor, DisplayClient, EventSource, GrabKind, Icon, ImeFilter, InputContextId,
    NetWmState, WindowSpec,
};
use crate::geometry::{FrameExtents, SizeHints};
use crate::native::{
    ConfigureEvent, KeyEvent, NativeEvent, NativeEventKind, NativeWindow, PropertyAtom, ScreenId,
    WindowStateEvent, WmFunctions, WmState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimScreen {
    pub id: ScreenId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SimScreen {
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// Server-side view of one window.
#[derive(Debug, Clone, PartialEq)]
pub struct SimWindow {
    pub spec: WindowSpec,
    pub mapped: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub title: String,
    pub opacity: f64,
    pub keep_above: bool,
    pub transient_for: Option<NativeWindow>,
    pub modal: bool,
    pub fullscreen: bool,
    pub maximized: bool,
    pub iconified: bool,
    pub accept_focus: bool,
    pub hints: Option<SizeHints>,
    pub functions: WmFunctions,
    pub cursor: Cursor,
    pub icon: Option<Icon>,
    pub background: Option<BgColor>,
    pub extents: Option<FrameExtents>,
    pub draws: usize,
    pub shape_masks: usize,
    saved_rect: Option<(i32, i32, i32, i32)>,
}

impl SimWindow {
    fn new(spec: WindowSpec) -> Self {
        let (x, y, functions) = match spec {
            WindowSpec::TopLevel { functions, .. } => (0, 0, functions),
            WindowSpec::Child { x, y, .. } => (x, y, WmFunctions::empty()),
        };
        Self {
            spec,
            mapped: false,
            x,
            y,
            width: 1,
            height: 1,
            title: String::new(),
            opacity: 1.0,
            keep_above: false,
            transient_for: None,
            modal: false,
            fullscreen: false,
            maximized: false,
            iconified: false,
            accept_focus: true,
            hints: None,
            functions,
            cursor: Cursor::Default,
            icon: None,
            background: None,
            extents: None,
            draws: 0,
            shape_masks: 0,
            saved_rect: None,
        }
    }

    fn decorated(&self) -> bool {
        matches!(
            self.spec,
            WindowSpec::TopLevel {
                decorated: true,
                popup: false,
                ..
            }
        )
    }

    fn wm_state(&self) -> WmState {
        let mut state = WmState::empty();
        state.set(WmState::ICONIFIED, self.iconified);
        state.set(WmState::MAXIMIZED, self.maximized);
        state.set(WmState::FULLSCREEN, self.fullscreen);
        state.set(WmState::ABOVE, self.keep_above);
        state
    }

    fn configure(&self) -> ConfigureEvent {
        ConfigureEvent {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Requests observed by the server, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Create(NativeWindow),
    Destroy(NativeWindow),
    Show(NativeWindow),
    Hide(NativeWindow),
    Move(NativeWindow),
    Resize(NativeWindow),
    RequestFrameExtents(NativeWindow),
    Grab(NativeWindow, GrabKind),
    Ungrab(GrabKind),
    Activate(NativeWindow),
    Restack(NativeWindow, bool),
    CreateInputContext(InputContextId),
    DestroyInputContext(InputContextId),
}

#[derive(Debug)]
struct SimState {
    next_window: u64,
    next_ic: u64,
    windows: BTreeMap<NativeWindow, SimWindow>,
    events: VecDeque<NativeEvent>,
    requests: Vec<Request>,
    extents: FrameExtents,
    extents_supported: bool,
    screens: Vec<SimScreen>,
    grab: Option<(NativeWindow, GrabKind)>,
    input_method: bool,
    input_contexts: BTreeMap<InputContextId, NativeWindow>,
    compose_keys: BTreeSet<u32>,
    commit_keys: BTreeMap<u32, String>,
}

pub struct SimulatedDisplay {
    state: RefCell<SimState>,
}

impl Default for SimulatedDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDisplay {
    /// One 1920x1080 screen, a WM that reports `10,10,30,10` frame extents,
    /// and an input method.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SimState {
                next_window: 1,
                next_ic: 1,
                windows: BTreeMap::new(),
                events: VecDeque::new(),
                requests: Vec::new(),
                extents: FrameExtents::new(10, 10, 30, 10),
                extents_supported: true,
                screens: vec![SimScreen {
                    id: ScreenId(0),
                    x: 0,
                    y: 0,
                    width: 1920,
                    height: 1080,
                }],
                grab: None,
                input_method: true,
                input_contexts: BTreeMap::new(),
                compose_keys: BTreeSet::new(),
                commit_keys: BTreeMap::new(),
            }),
        }
    }

    pub fn with_frame_extents(self, extents: FrameExtents) -> Self {
        self.state.borrow_mut().extents = extents;
        self
    }

    /// A window manager without `_NET_REQUEST_FRAME_EXTENTS` support.
    pub fn without_frame_extents(self) -> Self {
        self.state.borrow_mut().extents_supported = false;
        self
    }

    pub fn without_input_method(self) -> Self {
        self.state.borrow_mut().input_method = false;
        self
    }

    pub fn with_screen(self, screen: SimScreen) -> Self {
        self.state.borrow_mut().screens.push(screen);
        self
    }

    /// Keys the input method swallows while composing.
    pub fn ime_compose_key(&self, keyval: u32) {
        self.state.borrow_mut().compose_keys.insert(keyval);
    }

    /// Key that completes a composition with `text`.
    pub fn ime_commit_key(&self, keyval: u32, text: &str) {
        self.state
            .borrow_mut()
            .commit_keys
            .insert(keyval, text.to_string());
    }

    /// Tear a window down on the server side, as another client or the
    /// window manager would. The client only learns of it from the
    /// `Destroy` event, which is not queued here.
    pub fn destroy_from_server(&self, window: NativeWindow) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&window);
        if state.grab.is_some_and(|(w, _)| w == window) {
            state.grab = None;
        }
    }

    /// Inject an event as if the server had sent it.
    pub fn deliver(&self, event: NativeEvent) {
        self.state.borrow_mut().events.push_back(event);
    }

    pub fn window(&self, window: NativeWindow) -> Option<SimWindow> {
        self.state.borrow().windows.get(&window).cloned()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.state.borrow().requests.clone()
    }

    pub fn count_requests(&self, request: Request) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| **r == request)
            .count()
    }

    pub fn pending_events(&self) -> usize {
        self.state.borrow().events.len()
    }

    pub fn discard_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    pub fn active_grab(&self) -> Option<(NativeWindow, GrabKind)> {
        self.state.borrow().grab
    }

    pub fn live_input_contexts(&self) -> usize {
        self.state.borrow().input_contexts.len()
    }

    fn with_window<F>(&self, window: NativeWindow, f: F)
    where
        F: FnOnce(&mut SimWindow, &mut VecDeque<NativeEvent>),
    {
        let mut state = self.state.borrow_mut();
        let SimState {
            windows, events, ..
        } = &mut *state;
        if let Some(w) = windows.get_mut(&window) {
            f(w, events);
        }
    }

    fn push_configure(window: NativeWindow, w: &SimWindow, events: &mut VecDeque<NativeEvent>) {
        if w.mapped {
            events.push_back(NativeEvent::new(
                window,
                NativeEventKind::Configure(w.configure()),
            ));
        }
    }

    fn push_state(
        window: NativeWindow,
        changed: WmState,
        w: &SimWindow,
        events: &mut VecDeque<NativeEvent>,
    ) {
        events.push_back(NativeEvent::new(
            window,
            NativeEventKind::WindowState(WindowStateEvent {
                changed,
                new_state: w.wm_state(),
            }),
        ));
    }

    fn screen_rect(&self, x: i32, y: i32) -> (i32, i32, i32, i32) {
        let state = self.state.borrow();
        let screen = state
            .screens
            .iter()
            .find(|s| s.contains(x, y))
            .or_else(|| state.screens.first());
        screen
            .map(|s| (s.x, s.y, s.width, s.height))
            .unwrap_or((0, 0, 1, 1))
    }

    fn publish_extents(&self, window: NativeWindow) {
        let mut state = self.state.borrow_mut();
        if !state.extents_supported {
            return;
        }
        let extents = state.extents;
        let SimState {
            windows, events, ..
        } = &mut *state;
        if let Some(w) = windows.get_mut(&window)
            && w.decorated()
        {
            w.extents = Some(extents);
            events.push_back(NativeEvent::new(
                window,
                NativeEventKind::Property(PropertyAtom::FrameExtents),
            ));
        }
    }

    fn log(&self, request: Request) {
        self.state.borrow_mut().requests.push(request);
    }
}

impl DisplayClient for SimulatedDisplay {
    fn create_window(&self, spec: WindowSpec) -> NativeWindow {
        let window = {
            let mut state = self.state.borrow_mut();
            let window = NativeWindow(state.next_window);
            state.next_window += 1;
            state.windows.insert(window, SimWindow::new(spec));
            window
        };
        self.log(Request::Create(window));
        window
    }

    fn destroy_window(&self, window: NativeWindow) {
        let mut state = self.state.borrow_mut();
        state.windows.remove(&window);
        if state.grab.is_some_and(|(w, _)| w == window) {
            state.grab = None;
        }
        state.requests.push(Request::Destroy(window));
    }

    fn show(&self, window: NativeWindow) {
        self.log(Request::Show(window));
        let first_map = self
            .window(window)
            .is_some_and(|w| !w.mapped && w.extents.is_none());
        if first_map {
            self.publish_extents(window);
        }
        self.with_window(window, |w, events| {
            if w.mapped {
                return;
            }
            w.mapped = true;
            events.push_back(NativeEvent::new(window, NativeEventKind::Map));
            Self::push_configure(window, w, events);
        });
    }

    fn hide(&self, window: NativeWindow) {
        self.log(Request::Hide(window));
        self.with_window(window, |w, _| w.mapped = false);
    }

    fn move_window(&self, window: NativeWindow, x: i32, y: i32) {
        self.log(Request::Move(window));
        self.with_window(window, |w, events| {
            w.x = x;
            w.y = y;
            Self::push_configure(window, w, events);
        });
    }

    fn resize(&self, window: NativeWindow, width: i32, height: i32) {
        self.log(Request::Resize(window));
        self.with_window(window, |w, events| {
            let (mut width, mut height) = (width.max(1), height.max(1));
            if let Some(hints) = w.hints {
                width = width.max(hints.min_width);
                height = height.max(hints.min_height);
                if let Some(max) = hints.max_width {
                    width = width.min(max);
                }
                if let Some(max) = hints.max_height {
                    height = height.min(max);
                }
            }
            w.width = width;
            w.height = height;
            Self::push_configure(window, w, events);
        });
    }

    fn set_size_hints(&self, window: NativeWindow, hints: SizeHints) {
        self.with_window(window, |w, _| w.hints = Some(hints));
    }

    fn set_title(&self, window: NativeWindow, title: &str) {
        self.with_window(window, |w, _| w.title = title.to_string());
    }

    fn set_opacity(&self, window: NativeWindow, alpha: f64) {
        self.with_window(window, |w, _| w.opacity = alpha.clamp(0.0, 1.0));
    }

    fn set_icon(&self, window: NativeWindow, icon: Option<&Icon>) {
        self.with_window(window, |w, _| w.icon = icon.cloned());
    }

    fn set_cursor(&self, window: NativeWindow, cursor: Cursor) {
        self.with_window(window, |w, _| w.cursor = cursor);
    }

    fn set_background(&self, window: NativeWindow, color: BgColor) {
        self.with_window(window, |w, _| w.background = Some(color));
    }

    fn set_accept_focus(&self, window: NativeWindow, accept: bool) {
        self.with_window(window, |w, _| w.accept_focus = accept);
    }

    fn activate(&self, window: NativeWindow) {
        self.log(Request::Activate(window));
        self.with_window(window, |w, events| {
            if w.mapped && w.accept_focus {
                events.push_back(NativeEvent::new(
                    window,
                    NativeEventKind::Focus { focus_in: true },
                ));
            }
        });
    }

    fn set_keep_above(&self, window: NativeWindow, above: bool) {
        self.with_window(window, |w, events| {
            if w.keep_above == above {
                return;
            }
            w.keep_above = above;
            events.push_back(NativeEvent::new(
                window,
                NativeEventKind::Property(PropertyAtom::WmState),
            ));
        });
    }

    fn set_transient_for(&self, window: NativeWindow, parent: Option<NativeWindow>) {
        self.with_window(window, |w, _| w.transient_for = parent);
    }

    fn set_modal_hint(&self, window: NativeWindow, modal: bool) {
        self.with_window(window, |w, _| w.modal = modal);
    }

    fn set_fullscreen(&self, window: NativeWindow, fullscreen: bool) {
        let Some(current) = self.window(window) else {
            return;
        };
        if current.fullscreen == fullscreen {
            return;
        }
        let screen = self.screen_rect(current.x, current.y);
        self.with_window(window, |w, events| {
            w.fullscreen = fullscreen;
            if fullscreen {
                w.saved_rect = Some((w.x, w.y, w.width, w.height));
                (w.x, w.y, w.width, w.height) = screen;
            } else if let Some(rect) = w.saved_rect.take() {
                (w.x, w.y, w.width, w.height) = rect;
            }
            Self::push_configure(window, w, events);
            Self::push_state(window, WmState::FULLSCREEN, w, events);
        });
    }

    fn set_maximized(&self, window: NativeWindow, maximized: bool) {
        let Some(current) = self.window(window) else {
            return;
        };
        if current.maximized == maximized {
            return;
        }
        let (sx, sy, sw, sh) = self.screen_rect(current.x, current.y);
        let extents = current.extents.unwrap_or_default();
        self.with_window(window, |w, events| {
            w.maximized = maximized;
            if maximized {
                w.saved_rect = Some((w.x, w.y, w.width, w.height));
                w.x = sx;
                w.y = sy;
                w.width = sw - extents.horizontal();
                w.height = sh - extents.vertical();
            } else if let Some(rect) = w.saved_rect.take() {
                (w.x, w.y, w.width, w.height) = rect;
            }
            Self::push_configure(window, w, events);
            Self::push_state(window, WmState::MAXIMIZED, w, events);
        });
    }

    fn set_iconified(&self, window: NativeWindow, iconified: bool) {
        self.with_window(window, |w, events| {
            if w.iconified == iconified {
                return;
            }
            w.iconified = iconified;
            Self::push_state(window, WmState::ICONIFIED, w, events);
        });
    }

    fn set_functions(&self, window: NativeWindow, functions: WmFunctions) {
        self.with_window(window, |w, _| w.functions = functions);
    }

    fn restack(&self, window: NativeWindow, above: bool) {
        self.log(Request::Restack(window, above));
    }

    fn request_frame_extents(&self, window: NativeWindow) {
        self.log(Request::RequestFrameExtents(window));
        self.publish_extents(window);
    }

    fn frame_extents(&self, window: NativeWindow) -> Option<FrameExtents> {
        self.window(window).and_then(|w| w.extents)
    }

    fn net_wm_state(&self, window: NativeWindow) -> Option<NetWmState> {
        self.window(window).map(|w| NetWmState {
            hidden: w.iconified,
            above: w.keep_above,
        })
    }

    fn grab(&self, window: NativeWindow, kind: GrabKind) -> bool {
        self.log(Request::Grab(window, kind));
        let viewable = self.window(window).is_some_and(|w| w.mapped);
        if viewable {
            self.state.borrow_mut().grab = Some((window, kind));
        }
        viewable
    }

    fn ungrab(&self, kind: GrabKind) {
        self.log(Request::Ungrab(kind));
        self.state.borrow_mut().grab = None;
    }

    fn screen_at(&self, x: i32, y: i32) -> Option<ScreenId> {
        self.state
            .borrow()
            .screens
            .iter()
            .find(|s| s.contains(x, y))
            .map(|s| s.id)
    }

    fn draw(
        &self,
        window: NativeWindow,
        _data: &[u8],
        _width: u32,
        _height: u32,
        background: Option<BgColor>,
    ) {
        self.with_window(window, |w, _| {
            w.draws += 1;
            if background.is_some() {
                w.background = background;
            }
        });
    }

    fn apply_shape_mask(&self, window: NativeWindow, _data: &[u8], _width: u32, _height: u32) {
        self.with_window(window, |w, _| w.shape_masks += 1);
    }

    fn create_input_context(&self, window: NativeWindow) -> Option<InputContextId> {
        let ic = {
            let mut state = self.state.borrow_mut();
            if !state.input_method || !state.windows.contains_key(&window) {
                return None;
            }
            let ic = InputContextId(state.next_ic);
            state.next_ic += 1;
            state.input_contexts.insert(ic, window);
            ic
        };
        self.log(Request::CreateInputContext(ic));
        Some(ic)
    }

    fn filter_key(&self, ic: InputContextId, event: &KeyEvent) -> ImeFilter {
        let state = self.state.borrow();
        if !state.input_contexts.contains_key(&ic) || !event.press {
            return ImeFilter::Passthrough;
        }
        if let Some(text) = state.commit_keys.get(&event.keyval) {
            return ImeFilter::Committed(text.clone());
        }
        if state.compose_keys.contains(&event.keyval) {
            return ImeFilter::Consumed;
        }
        ImeFilter::Passthrough
    }

    fn destroy_input_context(&self, ic: InputContextId) {
        self.state.borrow_mut().input_contexts.remove(&ic);
        self.log(Request::DestroyInputContext(ic));
    }
}

impl EventSource for SimulatedDisplay {
    fn poll_event(&self) -> Option<NativeEvent> {
        self.state.borrow_mut().events.pop_front()
    }

    /// Nothing else feeds the queue while the event thread waits, so an
    /// empty queue stays empty; sleep out the timeout like an idle server.
    fn wait_event(&self, timeout: Duration) -> Option<NativeEvent> {
        if let Some(event) = self.poll_event() {
            return Some(event);
        }
        std::thread::sleep(timeout);
        self.poll_event()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled() -> WindowSpec {
        WindowSpec::TopLevel {
            popup: false,
            utility: false,
            decorated: true,
            transparent: false,
            functions: WmFunctions::ALL,
        }
    }

    fn drain(display: &SimulatedDisplay) -> Vec<NativeEventKind> {
        std::iter::from_fn(|| display.poll_event())
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn first_map_publishes_extents_then_map_then_configure() {
        let display = SimulatedDisplay::new();
        let w = display.create_window(titled());
        display.resize(w, 200, 100);
        assert!(drain(&display).is_empty(), "unmapped windows stay silent");

        display.show(w);
        let kinds = drain(&display);
        assert_eq!(
            kinds,
            vec![
                NativeEventKind::Property(PropertyAtom::FrameExtents),
                NativeEventKind::Map,
                NativeEventKind::Configure(ConfigureEvent {
                    x: 0,
                    y: 0,
                    width: 200,
                    height: 100
                }),
            ]
        );
        assert_eq!(
            display.frame_extents(w),
            Some(FrameExtents::new(10, 10, 30, 10))
        );
    }

    #[test]
    fn undecorated_windows_get_no_extents() {
        let display = SimulatedDisplay::new();
        let w = display.create_window(WindowSpec::TopLevel {
            popup: false,
            utility: false,
            decorated: false,
            transparent: false,
            functions: WmFunctions::ALL,
        });
        display.request_frame_extents(w);
        assert_eq!(display.frame_extents(w), None);
        assert_eq!(display.pending_events(), 0);
    }

    #[test]
    fn resize_respects_size_hints() {
        let display = SimulatedDisplay::new();
        let w = display.create_window(titled());
        display.set_size_hints(w, SizeHints::fixed(300, 200));
        display.resize(w, 800, 600);
        let sim = display.window(w).unwrap();
        assert_eq!((sim.width, sim.height), (300, 200));
    }

    #[test]
    fn grab_requires_mapped_window() {
        let display = SimulatedDisplay::new();
        let w = display.create_window(titled());
        assert!(!display.grab(w, GrabKind::PointerAndKeyboard));
        display.show(w);
        assert!(display.grab(w, GrabKind::PointerAndKeyboard));
        assert_eq!(
            display.active_grab(),
            Some((w, GrabKind::PointerAndKeyboard))
        );
        display.ungrab(GrabKind::PointerAndKeyboard);
        assert_eq!(display.active_grab(), None);
    }

    #[test]
    fn fullscreen_round_trip_restores_rect() {
        let display = SimulatedDisplay::new();
        let w = display.create_window(titled());
        display.show(w);
        display.move_window(w, 40, 50);
        display.resize(w, 640, 480);
        display.set_fullscreen(w, true);
        let sim = display.window(w).unwrap();
        assert_eq!((sim.width, sim.height), (1920, 1080));
        display.set_fullscreen(w, false);
        let sim = display.window(w).unwrap();
        assert_eq!((sim.x, sim.y, sim.width, sim.height), (40, 50, 640, 480));
    }
}
