//! Window contexts and the capability interface they share.
//!
//! `WindowContext` is the operation table every caller (event dispatch,
//! runtime requests) goes through. Operations that only need the shared base
//! state have default bodies delegating to `ContextBase`; the concrete
//! variants override what differs. Work that spans several contexts
//! (ownership propagation) is queued as a `TreeRequest` and carried out by
//! the registry, which is the only place that can see more than one context.

pub mod base;
pub mod child;
pub mod top;

use std::rc::Rc;

use crate::display::{BgColor, Cursor, Icon};
use crate::error::ContextError;
use crate::geometry::WindowGeometry;
use crate::native::{
    ButtonEvent, ConfigureEvent, CrossingEvent, ExposeEvent, KeyEvent, MotionEvent,
    NativeEventKind, NativeWindow, PropertyAtom, ScrollEvent, WindowStateEvent,
};
use crate::peer::{Level, ViewPeer, WindowPeer, WindowState};

pub use base::ContextBase;
pub use child::ChildContext;
pub use top::{TopLevelContext, TopLevelParams};

slotmap::new_key_type! {
    /// Handle to a live context in the registry.
    pub struct ContextId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    #[default]
    Titled,
    Untitled,
    /// Undecorated with a per-pixel input shape.
    Transparent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowType {
    #[default]
    Normal,
    Utility,
    Popup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    TopLevel,
    Child,
}

/// Follow-up work that involves other contexts in the ownership tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeRequest {
    /// This context's on-top flag changed; refresh its descendants.
    PropagateOnTop,
    /// Hide (`false`) or restore (`true`) owned windows.
    ShowChildren(bool),
    /// The context dropped its focus grab on its own (focus out or a click
    /// outside the window).
    FocusGrabReleased,
}

/// A runtime bounds request.
///
/// `width`/`height` are outer window sizes, `content_width`/`content_height`
/// are view sizes; an outer size wins when both are given for an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundsRequest {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub content_width: Option<i32>,
    pub content_height: Option<i32>,
}

impl BoundsRequest {
    pub fn content(width: i32, height: i32) -> Self {
        Self {
            content_width: Some(width),
            content_height: Some(height),
            ..Self::default()
        }
    }

    pub fn window(width: i32, height: i32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn position(x: i32, y: i32) -> Self {
        Self::default().at(x, y)
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn has_size(&self) -> bool {
        self.width.is_some()
            || self.height.is_some()
            || self.content_width.is_some()
            || self.content_height.is_some()
    }

    pub fn has_position(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// Reject buffers that cannot hold `width * height` ARGB32 pixels.
pub fn check_buffer(data: &[u8], width: u32, height: u32) -> Result<(), ContextError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4));
    match expected {
        Some(expected) if data.len() >= expected => Ok(()),
        expected => Err(ContextError::BufferTooSmall {
            width,
            height,
            expected: expected.unwrap_or(usize::MAX),
            actual: data.len(),
        }),
    }
}

pub trait WindowContext {
    fn base(&self) -> &ContextBase;
    fn base_mut(&mut self) -> &mut ContextBase;
    fn kind(&self) -> ContextKind;

    fn as_top_level(&self) -> Option<&TopLevelContext> {
        None
    }

    fn as_top_level_mut(&mut self) -> Option<&mut TopLevelContext> {
        None
    }

    fn is_enabled(&self) -> bool {
        self.base().is_enabled()
    }

    fn has_ime(&self) -> bool {
        self.base().has_ime()
    }

    /// Offer a key event to the input method; `true` when it was consumed.
    fn filter_ime(&mut self, event: &KeyEvent) -> bool {
        self.base_mut().filter_ime(event)
    }

    fn enable_or_reset_ime(&mut self) {
        self.base_mut().enable_or_reset_ime();
    }

    fn disable_ime(&mut self) {
        self.base_mut().disable_ime();
    }

    /// Blit a caller-owned ARGB32 buffer. The buffer is not retained.
    fn paint(&mut self, data: &[u8], width: u32, height: u32) {
        if self.base().is_dead() || !self.is_visible() {
            return;
        }
        if let Err(err) = check_buffer(data, width, height) {
            tracing::warn!(%err, "dropping paint request");
            return;
        }
        self.apply_shape_mask(data, width, height);
        self.base().paint_buffer(data, width, height);
    }

    fn apply_shape_mask(&mut self, _data: &[u8], _width: u32, _height: u32) {}

    fn get_geometry(&self) -> WindowGeometry {
        *self.base().geometry()
    }

    fn enter_fullscreen(&mut self) {}

    fn exit_fullscreen(&mut self) {}

    fn set_visible(&mut self, visible: bool) {
        self.base_mut().set_visible(visible);
    }

    fn is_visible(&self) -> bool {
        self.base().is_visible()
    }

    fn set_bounds(&mut self, request: BoundsRequest);

    fn set_resizable(&mut self, _resizable: bool) {}

    fn request_focus(&mut self) {}

    fn set_focusable(&mut self, _focusable: bool) {}

    fn grab_focus(&mut self) -> bool {
        self.base_mut().grab_focus()
    }

    fn ungrab_focus(&mut self) {
        self.base_mut().ungrab_focus();
    }

    fn set_title(&mut self, _title: &str) {}

    fn set_alpha(&mut self, _alpha: f64) {}

    fn set_enabled(&mut self, _enabled: bool) {}

    fn set_minimum_size(&mut self, _width: Option<i32>, _height: Option<i32>) {}

    fn set_maximum_size(&mut self, _width: Option<i32>, _height: Option<i32>) {}

    fn set_minimized(&mut self, _minimized: bool) {}

    fn set_maximized(&mut self, _maximized: bool) {}

    fn set_icon(&mut self, _icon: Option<&Icon>) {}

    fn restack(&mut self, _above: bool) {}

    fn set_cursor(&mut self, cursor: Cursor) {
        self.base_mut().set_cursor(cursor);
    }

    fn set_modal(&mut self, _modal: bool, _parent: Option<NativeWindow>) {}

    fn set_gravity(&mut self, x: f32, y: f32) {
        self.base_mut().set_gravity(x, y);
    }

    fn set_level(&mut self, _level: Level) {}

    fn set_background(&mut self, color: BgColor) {
        self.base_mut().set_background(color);
    }

    fn process_property_notify(&mut self, _atom: &PropertyAtom) {}

    fn process_configure(&mut self, event: &ConfigureEvent);

    fn process_map(&mut self) {}

    fn process_focus(&mut self, focus_in: bool) {
        self.base_mut().process_focus(focus_in);
    }

    fn process_destroy(&mut self) {
        self.base_mut().process_destroy();
    }

    fn process_delete(&mut self) {
        self.base_mut().process_delete();
    }

    fn process_expose(&mut self, event: &ExposeEvent) {
        self.base_mut().process_expose(event);
    }

    fn process_mouse_button(&mut self, event: &ButtonEvent) {
        self.base_mut().process_mouse_button(event);
    }

    fn process_mouse_motion(&mut self, event: &MotionEvent) {
        self.base_mut().process_mouse_motion(event);
    }

    fn process_mouse_scroll(&mut self, event: &ScrollEvent) {
        self.base_mut().process_mouse_scroll(event);
    }

    fn process_mouse_cross(&mut self, event: &CrossingEvent) {
        self.base_mut().process_mouse_cross(event);
    }

    fn process_key(&mut self, event: &KeyEvent) {
        self.base_mut().process_key(event);
    }

    fn process_state(&mut self, event: &WindowStateEvent) {
        if let Some(above) = self.base_mut().process_state(event) {
            self.notify_on_top(above);
        }
    }

    fn process_screen_changed(&mut self) {}

    fn notify_state(&mut self, state: WindowState) {
        self.base_mut().notify_state(state);
    }

    fn notify_on_top(&mut self, _top: bool) {}

    fn add_child(&mut self, child: ContextId) {
        self.base_mut().add_child(child);
    }

    fn remove_child(&mut self, child: ContextId) {
        self.base_mut().remove_child(child);
    }

    fn children(&self) -> Vec<ContextId> {
        self.base().children()
    }

    fn set_view(&mut self, view: Option<Rc<dyn ViewPeer>>) -> bool {
        self.base_mut().set_view(view)
    }

    fn native_window(&self) -> NativeWindow {
        self.base().native_window()
    }

    fn view_peer(&self) -> Option<Rc<dyn ViewPeer>> {
        self.base().view_peer()
    }

    fn window_peer(&self) -> Option<Rc<dyn WindowPeer>> {
        self.base().window_peer()
    }

    fn owner(&self) -> Option<ContextId> {
        None
    }

    fn embedded_x(&self) -> i32 {
        0
    }

    fn embedded_y(&self) -> i32 {
        0
    }

    fn increment_events_counter(&mut self) {
        self.base_mut().increment_events_counter();
    }

    fn decrement_events_counter(&mut self) {
        self.base_mut().decrement_events_counter();
    }

    fn events_count(&self) -> usize {
        self.base().events_count()
    }

    fn is_dead(&self) -> bool {
        self.base().is_dead()
    }

    fn take_tree_requests(&mut self) -> Vec<TreeRequest> {
        self.base_mut().take_tree_requests()
    }
}

/// Route one native event to the matching `process_*` entry point.
///
/// Key events are offered to the input method first and only translated
/// when it passes them through.
pub fn deliver(ctx: &mut dyn WindowContext, kind: &NativeEventKind) {
    match kind {
        NativeEventKind::Property(atom) => ctx.process_property_notify(atom),
        NativeEventKind::Configure(event) => ctx.process_configure(event),
        NativeEventKind::Map => ctx.process_map(),
        NativeEventKind::Focus { focus_in } => ctx.process_focus(*focus_in),
        NativeEventKind::Destroy => ctx.process_destroy(),
        NativeEventKind::Delete => ctx.process_delete(),
        NativeEventKind::Expose(event) => ctx.process_expose(event),
        NativeEventKind::Button(event) => ctx.process_mouse_button(event),
        NativeEventKind::Motion(event) => ctx.process_mouse_motion(event),
        NativeEventKind::Scroll(event) => ctx.process_mouse_scroll(event),
        NativeEventKind::Crossing(event) => ctx.process_mouse_cross(event),
        NativeEventKind::Key(event) => {
            if !ctx.filter_ime(event) {
                ctx.process_key(event);
            }
        }
        NativeEventKind::WindowState(event) => ctx.process_state(event),
        NativeEventKind::ScreenChanged => ctx.process_screen_changed(),
    }
}
