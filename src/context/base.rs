//! State and behavior common to every window context.

use std::collections::BTreeSet;
use std::rc::Rc;

use crossterm::event::KeyModifiers;

use crate::config::ContextConfig;
use crate::display::{BgColor, Cursor, DisplayClient, GrabKind, ImeFilter};
use crate::geometry::WindowGeometry;
use crate::ime::ImeState;
use crate::input::keyboard::translate_key;
use crate::input::{
    MouseButtons, button_mask, dominant_button, key_modifiers, mouse_button, pressed_buttons,
    scroll_deltas,
};
use crate::native::{
    ButtonEvent, CrossingEvent, ExposeEvent, KeyEvent, MOUSE_BUTTONS_MASK, MotionEvent,
    NativeWindow, ScrollEvent, WindowStateEvent, WmFunctions, WmState,
};
use crate::peer::{
    FocusChange, MouseAction, MouseNotification, ScrollNotification, ViewNotification, ViewPeer,
    WindowNotification, WindowPeer, WindowState,
};

use super::{ContextId, TreeRequest};

pub struct ContextBase {
    display: Rc<dyn DisplayClient>,
    config: ContextConfig,
    native: NativeWindow,
    pub(crate) geometry: WindowGeometry,
    children: BTreeSet<ContextId>,
    window_peer: Option<Rc<dyn WindowPeer>>,
    view_peer: Option<Rc<dyn ViewPeer>>,
    ime: ImeState,

    events_processing: usize,
    can_be_deleted: bool,
    destroyed_by_server: bool,

    visible: bool,
    hidden_by_owner: bool,
    pub(crate) iconified: bool,
    pub(crate) maximized: bool,
    mouse_entered: bool,
    focus_grabbed: bool,
    drag_grabbed: bool,
    bg_color: Option<BgColor>,
    cursor: Cursor,
    pub(crate) functions: WmFunctions,
    tree_requests: Vec<TreeRequest>,
}

impl ContextBase {
    pub fn new(
        display: Rc<dyn DisplayClient>,
        config: ContextConfig,
        native: NativeWindow,
        window_peer: Option<Rc<dyn WindowPeer>>,
    ) -> Self {
        Self {
            display,
            config,
            native,
            geometry: WindowGeometry::new(),
            children: BTreeSet::new(),
            window_peer,
            view_peer: None,
            ime: ImeState::new(),
            events_processing: 0,
            can_be_deleted: false,
            destroyed_by_server: false,
            visible: false,
            hidden_by_owner: false,
            iconified: false,
            maximized: false,
            mouse_entered: false,
            focus_grabbed: false,
            drag_grabbed: false,
            bg_color: None,
            cursor: Cursor::Default,
            functions: WmFunctions::empty(),
            tree_requests: Vec::new(),
        }
    }

    pub fn display(&self) -> &dyn DisplayClient {
        self.display.as_ref()
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn native_window(&self) -> NativeWindow {
        self.native
    }

    pub fn geometry(&self) -> &WindowGeometry {
        &self.geometry
    }

    pub fn window_peer(&self) -> Option<Rc<dyn WindowPeer>> {
        self.window_peer.clone()
    }

    pub fn view_peer(&self) -> Option<Rc<dyn ViewPeer>> {
        self.view_peer.clone()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn background(&self) -> Option<BgColor> {
        self.bg_color
    }

    pub fn is_iconified(&self) -> bool {
        self.iconified
    }

    pub fn is_maximized(&self) -> bool {
        self.maximized
    }

    pub fn has_focus_grab(&self) -> bool {
        self.focus_grabbed
    }

    pub fn hidden_by_owner(&self) -> bool {
        self.hidden_by_owner
    }

    pub fn set_hidden_by_owner(&mut self, hidden: bool) {
        self.hidden_by_owner = hidden;
    }

    pub(crate) fn notify_window(&self, notification: WindowNotification) {
        if let Some(peer) = &self.window_peer {
            peer.notify(notification);
        }
    }

    pub(crate) fn notify_view(&self, notification: ViewNotification) {
        if let Some(peer) = &self.view_peer {
            peer.notify(notification);
        }
    }

    pub(crate) fn request(&mut self, request: TreeRequest) {
        self.tree_requests.push(request);
    }

    pub fn take_tree_requests(&mut self) -> Vec<TreeRequest> {
        std::mem::take(&mut self.tree_requests)
    }

    pub fn is_enabled(&self) -> bool {
        self.window_peer
            .as_ref()
            .is_some_and(|peer| peer.is_enabled())
    }

    pub fn has_ime(&self) -> bool {
        self.ime.enabled()
    }

    pub fn filter_ime(&mut self, event: &KeyEvent) -> bool {
        if !self.has_ime() {
            return false;
        }
        match self.ime.filter(self.display.as_ref(), event) {
            ImeFilter::Passthrough => false,
            ImeFilter::Consumed => true,
            ImeFilter::Committed(text) => {
                self.notify_view(ViewNotification::InputMethodCommit(text));
                true
            }
        }
    }

    pub fn enable_or_reset_ime(&mut self) {
        if !self.config.ime() || self.can_be_deleted {
            return;
        }
        self.ime.enable_or_reset(self.display.as_ref(), self.native);
    }

    pub fn disable_ime(&mut self) {
        self.ime.disable(self.display.as_ref());
    }

    pub fn paint_buffer(&self, data: &[u8], width: u32, height: u32) {
        self.display
            .draw(self.native, data, width, height, self.bg_color);
    }

    /// Runtime visibility change. An explicit request overrides any earlier
    /// hide done on the owner's behalf.
    pub fn set_visible(&mut self, visible: bool) {
        if self.can_be_deleted {
            return;
        }
        self.hidden_by_owner = false;
        self.visible = visible;
        if visible {
            self.display.show(self.native);
        } else {
            self.display.hide(self.native);
            self.release_hover();
        }
    }

    /// Synthesize an exit for a view that is going away under the pointer.
    fn release_hover(&mut self) {
        if !self.mouse_entered {
            return;
        }
        self.mouse_entered = false;
        self.notify_view(ViewNotification::Mouse(MouseNotification {
            action: MouseAction::Exit,
            button: None,
            x: 0,
            y: 0,
            x_abs: 0,
            y_abs: 0,
            modifiers: KeyModifiers::NONE,
            buttons: MouseButtons::empty(),
            popup_trigger: false,
        }));
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_view(&mut self, view: Option<Rc<dyn ViewPeer>>) -> bool {
        self.release_hover();
        self.view_peer = view;
        true
    }

    pub fn detach_peers(&mut self) {
        self.view_peer = None;
        self.window_peer = None;
    }

    pub fn grab_focus(&mut self) -> bool {
        if self.can_be_deleted {
            return false;
        }
        if !self.focus_grabbed {
            self.focus_grabbed = self
                .display
                .grab(self.native, GrabKind::PointerAndKeyboard);
        }
        self.focus_grabbed
    }

    pub fn ungrab_focus(&mut self) {
        if self.focus_grabbed {
            self.focus_grabbed = false;
            if !self.drag_grabbed {
                self.display.ungrab(GrabKind::PointerAndKeyboard);
            }
        }
        self.notify_window(WindowNotification::FocusUngrab);
    }

    fn grab_mouse_drag(&mut self) {
        if !self.drag_grabbed && !self.focus_grabbed {
            self.drag_grabbed = self.display.grab(self.native, GrabKind::Pointer);
        }
    }

    fn ungrab_mouse_drag(&mut self) {
        if self.drag_grabbed {
            self.drag_grabbed = false;
            self.display.ungrab(GrabKind::Pointer);
        }
    }

    pub fn set_cursor(&mut self, cursor: Cursor) {
        if self.can_be_deleted {
            return;
        }
        self.cursor = cursor;
        self.display.set_cursor(self.native, cursor);
    }

    pub fn set_background(&mut self, color: BgColor) {
        if self.can_be_deleted {
            return;
        }
        self.bg_color = Some(color);
        self.display.set_background(self.native, color);
    }

    pub fn set_gravity(&mut self, x: f32, y: f32) {
        if self.can_be_deleted {
            return;
        }
        self.geometry.gravity_x = x;
        self.geometry.gravity_y = y;
    }

    pub fn process_focus(&mut self, focus_in: bool) {
        if self.can_be_deleted {
            return;
        }
        if !focus_in && self.focus_grabbed {
            self.ungrab_focus();
            self.request(TreeRequest::FocusGrabReleased);
        }
        self.ime.set_focus(self.display.as_ref(), focus_in);
        if !focus_in {
            self.notify_window(WindowNotification::Focus(FocusChange::Lost));
        } else if self.is_enabled() {
            self.notify_window(WindowNotification::Focus(FocusChange::Gained));
        } else {
            self.notify_window(WindowNotification::FocusDisabled);
        }
    }

    /// Mark the context dead and tell both peers. Memory is released by the
    /// registry once no event handler is running on the context.
    pub fn process_destroy(&mut self) {
        if self.can_be_deleted {
            return;
        }
        if self.focus_grabbed {
            self.ungrab_focus();
        }
        self.ungrab_mouse_drag();
        self.ime.release(self.display.as_ref());
        self.children.clear();
        self.notify_window(WindowNotification::Destroyed);
        self.notify_view(ViewNotification::Removed);
        self.detach_peers();
        self.can_be_deleted = true;
    }

    /// The server already destroyed the native window; freeing the context
    /// must not destroy it a second time.
    pub fn mark_destroyed_by_server(&mut self) {
        self.destroyed_by_server = true;
    }

    pub fn process_delete(&mut self) {
        if self.can_be_deleted {
            return;
        }
        if self.is_enabled() {
            self.notify_window(WindowNotification::CloseRequested);
        }
    }

    pub fn process_expose(&mut self, event: &ExposeEvent) {
        if self.can_be_deleted {
            return;
        }
        self.notify_view(ViewNotification::Repaint {
            x: event.x,
            y: event.y,
            width: event.width,
            height: event.height,
        });
    }

    pub fn notify_repaint(&self) {
        self.notify_view(ViewNotification::Repaint {
            x: 0,
            y: 0,
            width: self.geometry.content_width,
            height: self.geometry.content_height,
        });
    }

    pub fn process_mouse_button(&mut self, event: &ButtonEvent) {
        if self.can_be_deleted {
            return;
        }
        // The native state is the state before the event; the runtime wants
        // the state after it.
        let mut state = event.state;
        let mask = button_mask(event.button);
        if event.press {
            state |= mask;
        } else {
            state.remove(mask);
        }

        if event.press && self.focus_grabbed && !self.contains_point(event.x, event.y) {
            // A click outside a grabbing window dismisses the grab.
            self.ungrab_focus();
            self.request(TreeRequest::FocusGrabReleased);
            return;
        }

        if event.press {
            self.grab_mouse_drag();
        } else if event.state.intersects(MOUSE_BUTTONS_MASK) && !state.intersects(MOUSE_BUTTONS_MASK)
        {
            self.ungrab_mouse_drag();
        }

        let Some(button) = mouse_button(event.button) else {
            return;
        };
        let popup_trigger = event.button == 3 && event.press;
        self.notify_view(ViewNotification::Mouse(MouseNotification {
            action: if event.press {
                MouseAction::Down
            } else {
                MouseAction::Up
            },
            button: Some(button),
            x: event.x as i32,
            y: event.y as i32,
            x_abs: event.x_root as i32,
            y_abs: event.y_root as i32,
            modifiers: key_modifiers(state),
            buttons: pressed_buttons(state),
            popup_trigger,
        }));
        if popup_trigger {
            self.notify_view(ViewNotification::Menu {
                x: event.x as i32,
                y: event.y as i32,
                x_abs: event.x_root as i32,
                y_abs: event.y_root as i32,
                keyboard_trigger: false,
            });
        }
    }

    pub fn process_mouse_motion(&mut self, event: &MotionEvent) {
        if self.can_be_deleted {
            return;
        }
        let buttons = pressed_buttons(event.state);
        let is_drag = !buttons.is_empty();
        if is_drag && !self.drag_grabbed {
            self.grab_mouse_drag();
        }
        self.notify_view(ViewNotification::Mouse(MouseNotification {
            action: if is_drag {
                MouseAction::Drag
            } else {
                MouseAction::Move
            },
            button: dominant_button(buttons),
            x: event.x as i32,
            y: event.y as i32,
            x_abs: event.x_root as i32,
            y_abs: event.y_root as i32,
            modifiers: key_modifiers(event.state),
            buttons,
            popup_trigger: false,
        }));
    }

    pub fn process_mouse_scroll(&mut self, event: &ScrollEvent) {
        if self.can_be_deleted {
            return;
        }
        let (dx, dy) = scroll_deltas(event.direction, event.state);
        let multiplier = self.config.scroll_multiplier();
        self.notify_view(ViewNotification::Scroll(ScrollNotification {
            x: event.x as i32,
            y: event.y as i32,
            x_abs: event.x_root as i32,
            y_abs: event.y_root as i32,
            dx,
            dy,
            modifiers: key_modifiers(event.state),
            buttons: pressed_buttons(event.state),
            multiplier_x: multiplier,
            multiplier_y: multiplier,
        }));
    }

    pub fn process_mouse_cross(&mut self, event: &CrossingEvent) {
        if self.can_be_deleted || self.view_peer.is_none() {
            return;
        }
        let mut state = event.state;
        if event.enter {
            // Buttons held while entering belong to a drag that started elsewhere.
            state.remove(MOUSE_BUTTONS_MASK);
        }
        if event.enter == self.mouse_entered {
            return;
        }
        self.mouse_entered = event.enter;
        self.notify_view(ViewNotification::Mouse(MouseNotification {
            action: if event.enter {
                MouseAction::Enter
            } else {
                MouseAction::Exit
            },
            button: None,
            x: event.x as i32,
            y: event.y as i32,
            x_abs: event.x_root as i32,
            y_abs: event.y_root as i32,
            modifiers: key_modifiers(state),
            buttons: pressed_buttons(state),
            popup_trigger: false,
        }));
    }

    pub fn process_key(&mut self, event: &KeyEvent) {
        if self.can_be_deleted {
            return;
        }
        let translated = translate_key(event);
        let modifiers = translated.notification.modifiers;
        self.notify_view(ViewNotification::Key(translated.notification));
        if let Some(text) = translated.typed {
            self.notify_view(ViewNotification::KeyTyped { text, modifiers });
        }
    }

    /// Apply a window-state event. Returns the new above flag when only the
    /// keep-above bit changed, for the caller's on-top handling.
    pub fn process_state(&mut self, event: &WindowStateEvent) -> Option<bool> {
        if self.can_be_deleted {
            return None;
        }
        if event
            .changed
            .intersects(WmState::ICONIFIED | WmState::MAXIMIZED)
        {
            if event.changed.contains(WmState::ICONIFIED) {
                self.iconified = event.new_state.contains(WmState::ICONIFIED);
                self.request(TreeRequest::ShowChildren(!self.iconified));
            }
            if event.changed.contains(WmState::MAXIMIZED) {
                self.maximized = event.new_state.contains(WmState::MAXIMIZED);
            }
            let state = if self.iconified {
                WindowState::Minimized
            } else if self.maximized {
                WindowState::Maximized
            } else {
                if !self.functions.is_empty()
                    && !self.functions.contains(WmFunctions::ALL)
                    && !self
                        .functions
                        .contains(WmFunctions::MINIMIZE | WmFunctions::MAXIMIZE)
                {
                    // Drop functions enabled only for a programmatic minimize/maximize.
                    self.display.set_functions(self.native, self.functions);
                }
                WindowState::Restored
            };
            self.notify_state(state);
            None
        } else if event.changed.contains(WmState::ABOVE) {
            Some(event.new_state.contains(WmState::ABOVE))
        } else {
            None
        }
    }

    pub fn notify_state(&mut self, state: WindowState) {
        let mut state = state;
        if state == WindowState::Restored {
            if self.maximized {
                state = WindowState::Maximized;
            }
            self.notify_repaint();
        }
        self.notify_window(WindowNotification::StateChanged(state));
    }

    pub fn add_child(&mut self, child: ContextId) {
        self.children.insert(child);
    }

    pub fn remove_child(&mut self, child: ContextId) {
        self.children.remove(&child);
    }

    pub fn children(&self) -> Vec<ContextId> {
        self.children.iter().copied().collect()
    }

    pub fn increment_events_counter(&mut self) {
        self.events_processing += 1;
    }

    pub fn decrement_events_counter(&mut self) {
        match self.events_processing.checked_sub(1) {
            Some(count) => self.events_processing = count,
            None => tracing::warn!(window = ?self.native, "event counter underflow ignored"),
        }
    }

    pub fn events_count(&self) -> usize {
        self.events_processing
    }

    pub fn is_dead(&self) -> bool {
        self.can_be_deleted
    }

    fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= 0.0
            && y >= 0.0
            && x < f64::from(self.geometry.content_width)
            && y < f64::from(self.geometry.content_height)
    }
}

impl Drop for ContextBase {
    fn drop(&mut self) {
        // The input context must go before the window it is bound to.
        self.ime.release(self.display.as_ref());
        if self.focus_grabbed {
            self.display.ungrab(GrabKind::PointerAndKeyboard);
        }
        if !self.destroyed_by_server {
            self.display.destroy_window(self.native);
        }
        tracing::debug!(window = ?self.native, "freed window context");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::WindowSpec;
    use crate::display::sim::{Request, SimulatedDisplay};
    use crate::native::{ModifierState, ScrollDirection};
    use crate::peer::RecordingPeer;
    use crossterm::event::{KeyCode, MouseButton};

    fn base() -> (Rc<SimulatedDisplay>, Rc<RecordingPeer>, ContextBase) {
        let display = Rc::new(SimulatedDisplay::new());
        let native = display.create_window(WindowSpec::TopLevel {
            popup: false,
            utility: false,
            decorated: true,
            transparent: false,
            functions: WmFunctions::ALL,
        });
        let peer = RecordingPeer::new();
        let mut base = ContextBase::new(
            display.clone(),
            ContextConfig::default(),
            native,
            Some(peer.clone()),
        );
        base.set_view(Some(peer.clone()));
        base.geometry.set_content_size(Some(100), Some(100));
        (display, peer, base)
    }

    fn button(press: bool, button: u32, state: ModifierState) -> ButtonEvent {
        ButtonEvent {
            press,
            button,
            x: 5.0,
            y: 6.0,
            x_root: 105.0,
            y_root: 106.0,
            state,
        }
    }

    fn mouse_events(peer: &RecordingPeer) -> Vec<MouseNotification> {
        peer.view_events()
            .into_iter()
            .filter_map(|n| match n {
                ViewNotification::Mouse(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn press_reports_state_after_event() {
        let (_display, peer, mut base) = base();
        base.process_mouse_button(&button(true, 1, ModifierState::empty()));
        let m = mouse_events(&peer)[0];
        assert_eq!(m.action, MouseAction::Down);
        assert_eq!(m.button, Some(MouseButton::Left));
        assert_eq!(m.buttons, MouseButtons::PRIMARY);
        assert_eq!((m.x, m.y, m.x_abs, m.y_abs), (5, 6, 105, 106));

        base.process_mouse_button(&button(false, 1, ModifierState::BUTTON1));
        let m = mouse_events(&peer)[1];
        assert_eq!(m.action, MouseAction::Up);
        assert!(m.buttons.is_empty());
    }

    #[test]
    fn drag_grab_spans_press_to_last_release() {
        let (display, _peer, mut base) = base();
        display.show(base.native_window());
        base.process_mouse_button(&button(true, 1, ModifierState::empty()));
        assert_eq!(
            display.active_grab(),
            Some((base.native_window(), GrabKind::Pointer))
        );
        base.process_mouse_button(&button(true, 3, ModifierState::BUTTON1));
        base.process_mouse_button(&button(false, 1, ModifierState::BUTTON1 | ModifierState::BUTTON3));
        assert!(display.active_grab().is_some(), "secondary still held");
        base.process_mouse_button(&button(false, 3, ModifierState::BUTTON3));
        assert_eq!(display.active_grab(), None);
    }

    #[test]
    fn secondary_press_is_popup_trigger_and_opens_menu() {
        let (_display, peer, mut base) = base();
        base.process_mouse_button(&button(true, 3, ModifierState::empty()));
        let events = peer.view_events();
        assert!(matches!(
            events[0],
            ViewNotification::Mouse(MouseNotification {
                popup_trigger: true,
                ..
            })
        ));
        assert!(matches!(
            events[1],
            ViewNotification::Menu {
                keyboard_trigger: false,
                ..
            }
        ));
    }

    #[test]
    fn wheel_buttons_are_not_reported_as_mouse_events() {
        let (_display, peer, mut base) = base();
        base.process_mouse_button(&button(true, 4, ModifierState::empty()));
        assert!(mouse_events(&peer).is_empty());
    }

    #[test]
    fn enter_masks_buttons_and_is_deduplicated() {
        let (_display, peer, mut base) = base();
        let cross = CrossingEvent {
            enter: true,
            x: 1.0,
            y: 1.0,
            x_root: 1.0,
            y_root: 1.0,
            state: ModifierState::BUTTON1 | ModifierState::SHIFT,
        };
        base.process_mouse_cross(&cross);
        base.process_mouse_cross(&cross);
        let events = mouse_events(&peer);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, MouseAction::Enter);
        assert!(events[0].buttons.is_empty());
        assert_eq!(events[0].modifiers, KeyModifiers::SHIFT);
    }

    #[test]
    fn hiding_while_hovered_sends_exit() {
        let (_display, peer, mut base) = base();
        base.process_mouse_cross(&CrossingEvent {
            enter: true,
            x: 0.0,
            y: 0.0,
            x_root: 0.0,
            y_root: 0.0,
            state: ModifierState::empty(),
        });
        base.set_visible(false);
        let events = mouse_events(&peer);
        assert_eq!(events.last().map(|m| m.action), Some(MouseAction::Exit));
    }

    #[test]
    fn scroll_uses_configured_multiplier() {
        let (_display, peer, mut base) = base();
        base.process_mouse_scroll(&ScrollEvent {
            direction: ScrollDirection::Down,
            x: 0.0,
            y: 0.0,
            x_root: 0.0,
            y_root: 0.0,
            state: ModifierState::empty(),
        });
        match &peer.view_events()[0] {
            ViewNotification::Scroll(s) => {
                assert_eq!((s.dx, s.dy), (0.0, -1.0));
                assert_eq!(s.multiplier_y, 40.0);
            }
            other => panic!("expected scroll, got {other:?}"),
        }
    }

    #[test]
    fn key_press_sends_press_then_typed() {
        let (_display, peer, mut base) = base();
        base.process_key(&KeyEvent::press(u32::from(b'x'), ModifierState::empty()));
        let events = peer.view_events();
        assert!(matches!(
            events[0],
            ViewNotification::Key(k) if k.code == Some(KeyCode::Char('x'))
        ));
        assert!(matches!(
            events[1],
            ViewNotification::KeyTyped { text: 'x', .. }
        ));
    }

    #[test]
    fn ime_consumes_composing_keys() {
        let (display, peer, mut base) = base();
        display.ime_compose_key(u32::from(b'k'));
        display.ime_commit_key(u32::from(b' '), "か");
        base.enable_or_reset_ime();
        assert!(base.has_ime());

        assert!(base.filter_ime(&KeyEvent::press(u32::from(b'k'), ModifierState::empty())));
        assert!(base.filter_ime(&KeyEvent::press(u32::from(b' '), ModifierState::empty())));
        assert!(!base.filter_ime(&KeyEvent::press(u32::from(b'z'), ModifierState::empty())));
        assert_eq!(
            peer.view_events(),
            vec![ViewNotification::InputMethodCommit("か".to_string())]
        );

        base.disable_ime();
        assert!(!base.filter_ime(&KeyEvent::press(u32::from(b'k'), ModifierState::empty())));
    }

    #[test]
    fn focus_on_disabled_window_reports_focus_disabled() {
        let (_display, peer, mut base) = base();
        peer.set_enabled(false);
        base.process_focus(true);
        base.process_focus(false);
        assert_eq!(
            peer.window_events(),
            vec![
                WindowNotification::FocusDisabled,
                WindowNotification::Focus(FocusChange::Lost)
            ]
        );
    }

    #[test]
    fn focus_out_releases_focus_grab() {
        let (display, peer, mut base) = base();
        display.show(base.native_window());
        assert!(base.grab_focus());
        base.process_focus(false);
        assert!(!base.has_focus_grab());
        assert_eq!(display.active_grab(), None);
        assert!(peer.has_window_event(&WindowNotification::FocusUngrab));
        assert_eq!(base.take_tree_requests(), vec![TreeRequest::FocusGrabReleased]);
    }

    #[test]
    fn delete_only_requests_close() {
        let (_display, peer, mut base) = base();
        base.process_delete();
        assert!(!base.is_dead());
        assert_eq!(peer.window_events(), vec![WindowNotification::CloseRequested]);
    }

    #[test]
    fn destroyed_context_ignores_further_events() {
        let (_display, peer, mut base) = base();
        base.process_destroy();
        assert!(base.is_dead());
        peer.clear();
        base.process_key(&KeyEvent::press(u32::from(b'a'), ModifierState::empty()));
        base.process_delete();
        base.process_focus(true);
        assert!(peer.view_events().is_empty());
        assert!(peer.window_events().is_empty());
    }

    #[test]
    fn counter_never_goes_negative() {
        let (_display, _peer, mut base) = base();
        base.decrement_events_counter();
        assert_eq!(base.events_count(), 0);
        base.increment_events_counter();
        base.increment_events_counter();
        base.decrement_events_counter();
        assert_eq!(base.events_count(), 1);
    }

    #[test]
    fn drop_releases_input_context_before_window() {
        let (display, _peer, mut base) = base();
        let native = base.native_window();
        base.enable_or_reset_ime();
        drop(base);
        let requests = display.requests();
        let ic_pos = requests
            .iter()
            .position(|r| matches!(r, Request::DestroyInputContext(_)))
            .expect("input context released");
        let win_pos = requests
            .iter()
            .position(|r| *r == Request::Destroy(native))
            .expect("window destroyed");
        assert!(ic_pos < win_pos);
    }

    #[test]
    fn iconify_state_hides_children_and_reports_minimized() {
        let (_display, peer, mut base) = base();
        base.process_state(&WindowStateEvent {
            changed: WmState::ICONIFIED,
            new_state: WmState::ICONIFIED,
        });
        assert_eq!(
            base.take_tree_requests(),
            vec![TreeRequest::ShowChildren(false)]
        );
        assert!(peer.has_window_event(&WindowNotification::StateChanged(
            WindowState::Minimized
        )));
    }

    #[test]
    fn above_change_is_returned_to_caller() {
        let (_display, _peer, mut base) = base();
        let above = base.process_state(&WindowStateEvent {
            changed: WmState::ABOVE,
            new_state: WmState::ABOVE,
        });
        assert_eq!(above, Some(true));
    }
}
