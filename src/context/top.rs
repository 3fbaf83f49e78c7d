//! Top-level (window-manager managed) window context.
//!
//! Owns the reconciliation between what the runtime asked for and what the
//! window manager confirmed. Sizes go to the display as content sizes and
//! positions as frame origins; until `_NET_FRAME_EXTENTS` arrives the
//! adjustment is zero and requests are provisional. When the extents land,
//! the adjustment is applied retroactively: a content-size request keeps its
//! content size, an outer-size request is re-derived so the outer size holds.

use std::rc::Rc;

use crate::config::ContextConfig;
use crate::display::{DisplayClient, Icon, WindowSpec};
use crate::geometry::{FrameExtents, WindowGeometry};
use crate::native::{
    ConfigureEvent, NativeWindow, PropertyAtom, ScreenId, WindowStateEvent, WmFunctions, WmState,
};
use crate::peer::{
    FocusChange, Level, ViewNotification, WindowNotification, WindowPeer, WindowState,
};

use super::{
    BoundsRequest, ContextBase, ContextId, ContextKind, FrameType, TreeRequest, WindowContext,
    WindowType,
};

/// Largest inset accepted from the window manager.
const MAX_FRAME_EXTENT: i32 = 512;

pub struct TopLevelParams {
    pub window_peer: Option<Rc<dyn WindowPeer>>,
    pub frame_type: FrameType,
    pub window_type: WindowType,
    pub functions: WmFunctions,
}

impl Default for TopLevelParams {
    fn default() -> Self {
        Self {
            window_peer: None,
            frame_type: FrameType::Titled,
            window_type: WindowType::Normal,
            functions: WmFunctions::ALL,
        }
    }
}

impl TopLevelParams {
    pub fn new(window_peer: Rc<dyn WindowPeer>) -> Self {
        Self {
            window_peer: Some(window_peer),
            ..Self::default()
        }
    }

    pub fn with_frame_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = frame_type;
        self
    }

    pub fn with_window_type(mut self, window_type: WindowType) -> Self {
        self.window_type = window_type;
        self
    }

    pub fn with_functions(mut self, functions: WmFunctions) -> Self {
        self.functions = functions;
        self
    }
}

pub struct TopLevelContext {
    base: ContextBase,
    screen: Option<ScreenId>,
    frame_type: FrameType,
    window_type: WindowType,

    owner: Option<ContextId>,
    map_received: bool,

    on_top: bool,
    inherited_on_top: bool,
    level: Level,

    fullscreen: bool,
    pre_fullscreen: Option<WindowGeometry>,

    /// Outer sizes requested before extents were known, per axis.
    pending_window_size: (Option<i32>, Option<i32>),

    focusable: bool,
    modal: bool,
}

impl TopLevelContext {
    pub fn new(
        display: Rc<dyn DisplayClient>,
        config: ContextConfig,
        params: TopLevelParams,
    ) -> Self {
        let popup = params.window_type == WindowType::Popup;
        let native = display.create_window(WindowSpec::TopLevel {
            popup,
            utility: params.window_type == WindowType::Utility,
            decorated: params.frame_type == FrameType::Titled && !popup,
            transparent: params.frame_type == FrameType::Transparent,
            functions: params.functions,
        });
        let mut base = ContextBase::new(display, config, native, params.window_peer);
        base.functions = params.functions;

        let mut ctx = Self {
            base,
            screen: None,
            frame_type: params.frame_type,
            window_type: params.window_type,
            owner: None,
            map_received: false,
            on_top: false,
            inherited_on_top: false,
            level: Level::Normal,
            fullscreen: false,
            pre_fullscreen: None,
            pending_window_size: (None, None),
            focusable: true,
            modal: false,
        };
        ctx.calculate_adjustments();
        tracing::debug!(
            window = ?native,
            frame = ?ctx.frame_type,
            kind = ?ctx.window_type,
            "created top-level context"
        );
        ctx
    }

    pub fn frame_type(&self) -> FrameType {
        self.frame_type
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    pub fn screen(&self) -> Option<ScreenId> {
        self.screen
    }

    pub fn is_mapped(&self) -> bool {
        self.map_received
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn is_focusable(&self) -> bool {
        self.focusable
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn on_top(&self) -> bool {
        self.on_top
    }

    /// True when some ancestor in the ownership chain is on top.
    pub fn on_top_inherited(&self) -> bool {
        self.inherited_on_top
    }

    pub fn effective_on_top(&self) -> bool {
        self.on_top || self.inherited_on_top
    }

    fn decorated(&self) -> bool {
        self.frame_type == FrameType::Titled && self.window_type != WindowType::Popup
    }

    fn native(&self) -> NativeWindow {
        self.base.native_window()
    }

    /// Seed the adjustment from whatever the window manager already knows,
    /// asking for extents when it knows nothing yet.
    pub fn calculate_adjustments(&mut self) {
        if !self.decorated() {
            self.base.geometry.apply_frame_extents(FrameExtents::default());
            return;
        }
        if let Some(extents) = self.get_frame_extents_property() {
            self.update_frame_extents(extents);
        } else if self.base.config().request_frame_extents() {
            self.request_frame_extents();
        }
    }

    pub fn request_frame_extents(&self) {
        tracing::trace!(window = ?self.native(), "requesting frame extents");
        self.base.display().request_frame_extents(self.native());
    }

    /// Read `_NET_FRAME_EXTENTS`, discarding implausible values.
    pub fn get_frame_extents_property(&self) -> Option<FrameExtents> {
        let extents = self.base.display().frame_extents(self.native())?;
        let sides = [extents.left, extents.right, extents.top, extents.bottom];
        if sides.iter().any(|v| !(0..=MAX_FRAME_EXTENT).contains(v)) {
            tracing::warn!(window = ?self.native(), ?extents, "ignoring bogus frame extents");
            return None;
        }
        Some(extents)
    }

    pub fn update_frame_extents(&mut self, extents: FrameExtents) {
        let g = &self.base.geometry;
        if g.frame_extents_received
            && g.adjust_w == extents.horizontal()
            && g.adjust_h == extents.vertical()
        {
            return;
        }
        tracing::debug!(window = ?self.native(), ?extents, "frame extents received");

        let (width, height) = std::mem::take(&mut self.pending_window_size);
        let g = &mut self.base.geometry;
        g.apply_frame_extents(extents);
        let content_changed =
            (width.is_some() || height.is_some()) && g.set_window_size(width, height);

        self.update_window_constraints();
        if content_changed {
            let g = &self.base.geometry;
            self.base
                .display()
                .resize(self.native(), g.content_width, g.content_height);
        }
        self.size_position_notify(true, false);
    }

    /// Reconcile `_NET_WM_STATE` with the local state.
    pub fn process_net_wm_property(&mut self) {
        let Some(state) = self.base.display().net_wm_state(self.native()) else {
            return;
        };
        if state.hidden && !self.base.is_iconified() {
            self.base.iconified = true;
            self.base.notify_state(WindowState::Minimized);
        }
        self.notify_on_top(state.above);
    }

    /// Push size and/or position to the display.
    pub fn apply_geometry(&mut self, size: bool, position: bool) {
        let native = self.native();
        if size {
            self.update_window_constraints();
            let g = &self.base.geometry;
            self.base
                .display()
                .resize(native, g.content_width, g.content_height);
        }
        if position {
            let g = &self.base.geometry;
            self.base.display().move_window(native, g.x, g.y);
            self.check_screen();
        }
    }

    pub fn update_window_constraints(&self) {
        if self.fullscreen {
            return;
        }
        let hints = self.base.geometry.size_hints();
        self.base.display().set_size_hints(self.native(), hints);
    }

    pub fn size_position_notify(&self, size_changed: bool, position_changed: bool) {
        let g = &self.base.geometry;
        if size_changed {
            let state = if self.base.is_maximized() {
                WindowState::Maximized
            } else {
                WindowState::Restored
            };
            self.base.notify_window(WindowNotification::Resize {
                state,
                width: g.width,
                height: g.height,
            });
            self.base.notify_view(ViewNotification::Resize {
                width: g.content_width,
                height: g.content_height,
            });
        }
        if position_changed {
            self.base
                .notify_window(WindowNotification::Move { x: g.x, y: g.y });
        }
    }

    pub fn activate_window(&self) {
        self.base.display().activate(self.native());
    }

    /// Recompute the screen under the window's center and report a change.
    pub fn check_screen(&mut self) {
        let g = &self.base.geometry;
        let (cx, cy) = (g.x + g.width / 2, g.y + g.height / 2);
        let Some(screen) = self.base.display().screen_at(cx, cy) else {
            return;
        };
        if self.screen != Some(screen) {
            self.screen = Some(screen);
            self.base
                .notify_window(WindowNotification::MovedToScreen(screen));
        }
    }

    /// Record the owner and make the native window transient for it.
    pub fn set_owner(&mut self, owner: Option<(ContextId, NativeWindow)>) {
        self.owner = owner.map(|(id, _)| id);
        self.base
            .display()
            .set_transient_for(self.native(), owner.map(|(_, native)| native));
    }

    /// Update the on-top flag inherited from the owner chain. Returns whether
    /// the effective value changed.
    pub fn set_inherited_on_top(&mut self, inherited: bool) -> bool {
        let before = self.effective_on_top();
        self.inherited_on_top = inherited;
        let after = self.effective_on_top();
        if before == after {
            return false;
        }
        self.base.display().set_keep_above(self.native(), after);
        self.base
            .notify_window(WindowNotification::EffectiveOnTop(after));
        true
    }
}

impl WindowContext for TopLevelContext {
    fn base(&self) -> &ContextBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ContextBase {
        &mut self.base
    }

    fn kind(&self) -> ContextKind {
        ContextKind::TopLevel
    }

    fn as_top_level(&self) -> Option<&TopLevelContext> {
        Some(self)
    }

    fn as_top_level_mut(&mut self) -> Option<&mut TopLevelContext> {
        Some(self)
    }

    fn apply_shape_mask(&mut self, data: &[u8], width: u32, height: u32) {
        if self.frame_type == FrameType::Transparent {
            self.base
                .display()
                .apply_shape_mask(self.native(), data, width, height);
        }
    }

    fn enter_fullscreen(&mut self) {
        if self.base.is_dead() || self.fullscreen {
            return;
        }
        self.pre_fullscreen = Some(self.base.geometry);
        self.fullscreen = true;
        self.base.display().set_fullscreen(self.native(), true);
    }

    fn exit_fullscreen(&mut self) {
        if self.base.is_dead() || !self.fullscreen {
            return;
        }
        self.fullscreen = false;
        self.base.display().set_fullscreen(self.native(), false);
        let Some(saved) = self.pre_fullscreen.take() else {
            return;
        };
        let g = &mut self.base.geometry;
        g.resizable = saved.resizable;
        g.resizable_on_map = saved.resizable_on_map;
        g.min_width = saved.min_width;
        g.min_height = saved.min_height;
        g.max_width = saved.max_width;
        g.max_height = saved.max_height;
        let resized = g.set_content_size(Some(saved.content_width), Some(saved.content_height));
        let moved = g.set_position(Some(saved.x), Some(saved.y));
        self.apply_geometry(true, true);
        self.size_position_notify(resized, moved);
    }

    fn set_visible(&mut self, visible: bool) {
        if self.base.is_dead() {
            return;
        }
        if visible && !self.base.geometry.has_size() {
            let (width, height) = self.base.config().default_size();
            self.base
                .geometry
                .set_content_size(Some(width), Some(height));
            self.apply_geometry(true, false);
        }
        self.base.set_visible(visible);
        // Focus events may arrive out of order; tell the runtime first.
        if visible && self.focusable && self.base.is_enabled() {
            self.base
                .notify_window(WindowNotification::Focus(FocusChange::Gained));
        }
    }

    fn set_bounds(&mut self, request: BoundsRequest) {
        if self.base.is_dead() {
            return;
        }
        let g = &mut self.base.geometry;
        let mut resized = false;

        if let Some(width) = request.width {
            resized |= g.set_window_size(Some(width), None);
            self.pending_window_size.0 = (!g.frame_extents_received).then_some(width);
        } else if let Some(width) = request.content_width {
            resized |= g.set_content_size(Some(width), None);
            self.pending_window_size.0 = None;
        }
        if let Some(height) = request.height {
            resized |= g.set_window_size(None, Some(height));
            self.pending_window_size.1 = (!g.frame_extents_received).then_some(height);
        } else if let Some(height) = request.content_height {
            resized |= g.set_content_size(None, Some(height));
            self.pending_window_size.1 = None;
        }
        let moved = g.set_position(request.x, request.y);

        self.apply_geometry(resized, moved);
        self.size_position_notify(resized, moved);
    }

    fn set_resizable(&mut self, resizable: bool) {
        if self.base.is_dead() {
            return;
        }
        self.base.geometry.resizable_on_map = resizable;
        if self.map_received {
            self.base.geometry.resizable = resizable;
            self.update_window_constraints();
        }
    }

    fn request_focus(&mut self) {
        if self.base.is_dead() || !self.base.is_visible() || !self.focusable {
            return;
        }
        self.activate_window();
    }

    fn set_focusable(&mut self, focusable: bool) {
        if self.base.is_dead() {
            return;
        }
        self.focusable = focusable;
        self.base.display().set_accept_focus(self.native(), focusable);
    }

    fn set_title(&mut self, title: &str) {
        if self.base.is_dead() {
            return;
        }
        self.base.display().set_title(self.native(), title);
    }

    fn set_alpha(&mut self, alpha: f64) {
        if self.base.is_dead() {
            return;
        }
        self.base.display().set_opacity(self.native(), alpha);
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.base.is_dead() {
            return;
        }
        self.base.geometry.enabled_on_map = enabled;
        if self.map_received {
            self.base.geometry.enabled = enabled;
            self.update_window_constraints();
        }
    }

    fn set_minimum_size(&mut self, width: Option<i32>, height: Option<i32>) {
        if self.base.is_dead() {
            return;
        }
        self.base.geometry.min_width = width;
        self.base.geometry.min_height = height;
        self.update_window_constraints();
    }

    fn set_maximum_size(&mut self, width: Option<i32>, height: Option<i32>) {
        if self.base.is_dead() {
            return;
        }
        self.base.geometry.max_width = width;
        self.base.geometry.max_height = height;
        self.update_window_constraints();
    }

    fn set_minimized(&mut self, minimized: bool) {
        if self.base.is_dead() {
            return;
        }
        let functions = self.base.functions;
        if minimized && !functions.intersects(WmFunctions::ALL | WmFunctions::MINIMIZE) {
            self.base
                .display()
                .set_functions(self.native(), functions | WmFunctions::MINIMIZE);
        }
        self.base.display().set_iconified(self.native(), minimized);
    }

    fn set_maximized(&mut self, maximized: bool) {
        if self.base.is_dead() {
            return;
        }
        let functions = self.base.functions;
        if maximized && !functions.intersects(WmFunctions::ALL | WmFunctions::MAXIMIZE) {
            self.base
                .display()
                .set_functions(self.native(), functions | WmFunctions::MAXIMIZE);
        }
        self.base.display().set_maximized(self.native(), maximized);
    }

    fn set_icon(&mut self, icon: Option<&Icon>) {
        if self.base.is_dead() {
            return;
        }
        self.base.display().set_icon(self.native(), icon);
    }

    fn restack(&mut self, above: bool) {
        if self.base.is_dead() {
            return;
        }
        self.base.display().restack(self.native(), above);
    }

    fn set_modal(&mut self, modal: bool, parent: Option<NativeWindow>) {
        if self.base.is_dead() {
            return;
        }
        self.modal = modal;
        let display = self.base.display();
        if let Some(parent) = parent {
            display.set_transient_for(self.native(), Some(parent));
        }
        display.set_modal_hint(self.native(), modal);
    }

    fn set_level(&mut self, level: Level) {
        if self.base.is_dead() {
            return;
        }
        self.level = level;
        self.on_top = level != Level::Normal;
        if !self.on_top_inherited() {
            self.base.display().set_keep_above(self.native(), self.on_top);
        }
        self.base.request(TreeRequest::PropagateOnTop);
    }

    fn process_property_notify(&mut self, atom: &PropertyAtom) {
        if self.base.is_dead() {
            return;
        }
        match atom {
            PropertyAtom::WmState => self.process_net_wm_property(),
            PropertyAtom::FrameExtents => {
                if let Some(extents) = self.get_frame_extents_property() {
                    self.update_frame_extents(extents);
                }
            }
            PropertyAtom::Other(name) => {
                tracing::trace!(window = ?self.native(), %name, "ignoring property change");
            }
        }
    }

    fn process_configure(&mut self, event: &ConfigureEvent) {
        if self.base.is_dead() {
            return;
        }
        let g = &mut self.base.geometry;
        let resized = g.set_content_size(Some(event.width), Some(event.height));
        let moved = g.set_position(Some(event.x), Some(event.y));
        self.size_position_notify(resized, moved);
        if moved || resized {
            self.check_screen();
        }
    }

    fn process_map(&mut self) {
        if self.base.is_dead() || self.map_received {
            return;
        }
        self.map_received = true;
        tracing::debug!(window = ?self.native(), "mapped");

        let g = &mut self.base.geometry;
        g.resizable = g.resizable_on_map;
        g.enabled = g.enabled_on_map;

        if self.decorated()
            && !self.base.geometry.frame_extents_received
            && let Some(extents) = self.get_frame_extents_property()
        {
            self.update_frame_extents(extents);
        }
        self.update_window_constraints();
        self.size_position_notify(true, true);
        self.check_screen();
    }

    fn process_state(&mut self, event: &WindowStateEvent) {
        if event.changed.contains(WmState::FULLSCREEN) {
            self.fullscreen = event.new_state.contains(WmState::FULLSCREEN);
        }
        if let Some(above) = self.base.process_state(event) {
            self.notify_on_top(above);
        }
    }

    fn process_screen_changed(&mut self) {
        if self.base.is_dead() {
            return;
        }
        self.screen = None;
        self.check_screen();
    }

    fn notify_on_top(&mut self, top: bool) {
        if self.base.is_dead() || top == self.effective_on_top() {
            return;
        }
        if self.on_top_inherited() && !top {
            // An ancestor keeps us above; undo the window manager's change.
            self.base.display().set_keep_above(self.native(), true);
            return;
        }
        self.on_top = top;
        self.level = if top { Level::Floating } else { Level::Normal };
        self.base.request(TreeRequest::PropagateOnTop);
        self.base
            .notify_window(WindowNotification::LevelChanged(self.level));
    }

    fn owner(&self) -> Option<ContextId> {
        self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::deliver;
    use crate::display::EventSource;
    use crate::display::sim::{Request, SimScreen, SimulatedDisplay};
    use crate::peer::RecordingPeer;

    fn setup(params: TopLevelParams) -> (Rc<SimulatedDisplay>, Rc<RecordingPeer>, TopLevelContext) {
        let display = Rc::new(SimulatedDisplay::new());
        let peer = RecordingPeer::new();
        let ctx = TopLevelContext::new(
            display.clone(),
            ContextConfig::default(),
            TopLevelParams {
                window_peer: Some(peer.clone()),
                ..params
            },
        );
        (display, peer, ctx)
    }

    fn pump(display: &SimulatedDisplay, ctx: &mut TopLevelContext) {
        while let Some(event) = display.poll_event() {
            if event.window == ctx.native_window() {
                deliver(ctx, &event.kind);
            }
        }
    }

    #[test]
    fn titled_window_requests_extents_on_creation() {
        let (display, _peer, ctx) = setup(TopLevelParams::default());
        assert_eq!(
            display.count_requests(Request::RequestFrameExtents(ctx.native_window())),
            1
        );
        assert!(!ctx.get_geometry().frame_extents_received);
    }

    #[test]
    fn undecorated_window_has_no_adjustment() {
        let (display, _peer, mut ctx) =
            setup(TopLevelParams::default().with_frame_type(FrameType::Untitled));
        assert_eq!(
            display.count_requests(Request::RequestFrameExtents(ctx.native_window())),
            0
        );
        ctx.set_bounds(BoundsRequest::window(300, 200));
        let g = ctx.get_geometry();
        assert_eq!((g.content_width, g.content_height), (300, 200));
        assert_eq!((g.adjust_w, g.adjust_h), (0, 0));
    }

    #[test]
    fn outer_size_request_survives_late_extents() {
        let (display, _peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_bounds(BoundsRequest::window(420, 340));
        assert_eq!(ctx.get_geometry().content_width, 420, "provisional");

        ctx.set_visible(true);
        pump(&display, &mut ctx);
        let g = ctx.get_geometry();
        assert_eq!((g.width, g.height), (420, 340));
        assert_eq!((g.content_width, g.content_height), (400, 300));
        let sim = display.window(ctx.native_window()).unwrap();
        assert_eq!((sim.width, sim.height), (400, 300));
    }

    #[test]
    fn set_bounds_is_visible_before_confirmation() {
        let (_display, peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_bounds(BoundsRequest::content(640, 480).at(30, 40));
        let g = ctx.get_geometry();
        assert_eq!((g.x, g.y, g.content_width, g.content_height), (30, 40, 640, 480));
        assert!(peer.has_window_event(&WindowNotification::Move { x: 30, y: 40 }));
    }

    #[test]
    fn resizable_change_before_map_waits_for_map() {
        let (display, _peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_bounds(BoundsRequest::content(200, 100));
        ctx.set_resizable(false);
        assert!(ctx.get_geometry().resizable);
        assert!(!ctx.get_geometry().resizable_on_map);

        ctx.set_visible(true);
        pump(&display, &mut ctx);
        assert!(!ctx.get_geometry().resizable);
        let sim = display.window(ctx.native_window()).unwrap();
        assert_eq!(sim.hints, Some(crate::geometry::SizeHints::fixed(200, 100)));
    }

    #[test]
    fn showing_without_size_uses_default_size() {
        let (display, peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_visible(true);
        pump(&display, &mut ctx);
        let g = ctx.get_geometry();
        assert_eq!((g.content_width, g.content_height), (320, 200));
        assert!(peer.has_window_event(&WindowNotification::Focus(FocusChange::Gained)));
    }

    #[test]
    fn fullscreen_restores_constraints_and_bounds() {
        let (display, _peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_bounds(BoundsRequest::content(500, 400).at(50, 60));
        ctx.set_visible(true);
        pump(&display, &mut ctx);
        ctx.set_minimum_size(Some(200), Some(150));
        ctx.set_resizable(false);
        let before = ctx.get_geometry();

        ctx.enter_fullscreen();
        pump(&display, &mut ctx);
        assert!(ctx.is_fullscreen());
        assert_eq!(ctx.get_geometry().content_width, 1920);

        ctx.exit_fullscreen();
        pump(&display, &mut ctx);
        let after = ctx.get_geometry();
        assert_eq!(after.resizable, before.resizable);
        assert_eq!(after.min_width, before.min_width);
        assert_eq!(after.max_height, before.max_height);
        assert_eq!(
            (after.x, after.y, after.content_width, after.content_height),
            (50, 60, 500, 400)
        );
    }

    #[test]
    fn set_level_keeps_above_and_queues_propagation() {
        let (display, _peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_visible(true);
        pump(&display, &mut ctx);
        ctx.set_level(Level::Floating);
        assert!(ctx.effective_on_top());
        assert!(display.window(ctx.native_window()).unwrap().keep_above);
        assert_eq!(ctx.take_tree_requests(), vec![TreeRequest::PropagateOnTop]);
        // The resulting property change agrees with local state.
        pump(&display, &mut ctx);
        assert!(ctx.take_tree_requests().is_empty());
    }

    #[test]
    fn wm_lowering_an_inherited_window_is_reverted() {
        let (display, peer, mut ctx) = setup(TopLevelParams::default());
        ctx.set_visible(true);
        pump(&display, &mut ctx);
        assert!(ctx.set_inherited_on_top(true));
        assert!(peer.has_window_event(&WindowNotification::EffectiveOnTop(true)));

        ctx.notify_on_top(false);
        assert!(ctx.effective_on_top());
        assert!(!ctx.on_top());
        assert!(display.window(ctx.native_window()).unwrap().keep_above);
    }

    #[test]
    fn wm_raising_reports_level_change() {
        let (_display, peer, mut ctx) = setup(TopLevelParams::default());
        ctx.notify_on_top(true);
        assert!(ctx.on_top());
        assert!(peer.has_window_event(&WindowNotification::LevelChanged(Level::Floating)));
    }

    #[test]
    fn transparent_frame_paints_through_shape_mask() {
        let (display, _peer, mut ctx) =
            setup(TopLevelParams::default().with_frame_type(FrameType::Transparent));
        ctx.set_bounds(BoundsRequest::content(2, 2));
        ctx.set_visible(true);
        ctx.paint(&[0u8; 16], 2, 2);
        let sim = display.window(ctx.native_window()).unwrap();
        assert_eq!((sim.shape_masks, sim.draws), (1, 1));
    }

    #[test]
    fn paint_is_skipped_while_hidden() {
        let (display, _peer, mut ctx) = setup(TopLevelParams::default());
        ctx.paint(&[0u8; 16], 2, 2);
        assert_eq!(display.window(ctx.native_window()).unwrap().draws, 0);
    }

    #[test]
    fn minimize_enables_missing_function_until_restored() {
        let (display, peer, mut ctx) =
            setup(TopLevelParams::default().with_functions(WmFunctions::CLOSE | WmFunctions::MOVE));
        ctx.set_visible(true);
        pump(&display, &mut ctx);
        ctx.set_minimized(true);
        assert!(
            display
                .window(ctx.native_window())
                .unwrap()
                .functions
                .contains(WmFunctions::MINIMIZE)
        );
        pump(&display, &mut ctx);
        assert!(peer.has_window_event(&WindowNotification::StateChanged(WindowState::Minimized)));

        ctx.set_minimized(false);
        pump(&display, &mut ctx);
        assert_eq!(
            display.window(ctx.native_window()).unwrap().functions,
            WmFunctions::CLOSE | WmFunctions::MOVE
        );
    }

    #[test]
    fn moving_across_screens_notifies_once() {
        let display = Rc::new(SimulatedDisplay::new().with_screen(SimScreen {
            id: ScreenId(1),
            x: 1920,
            y: 0,
            width: 1280,
            height: 1024,
        }));
        let peer = RecordingPeer::new();
        let mut ctx = TopLevelContext::new(
            display.clone(),
            ContextConfig::default(),
            TopLevelParams::new(peer.clone()),
        );
        ctx.set_bounds(BoundsRequest::content(100, 100).at(10, 10));
        ctx.set_bounds(BoundsRequest::position(2000, 10));
        ctx.set_bounds(BoundsRequest::position(2100, 10));
        let screens: Vec<_> = peer
            .window_events()
            .into_iter()
            .filter(|n| matches!(n, WindowNotification::MovedToScreen(_)))
            .collect();
        assert_eq!(
            screens,
            vec![
                WindowNotification::MovedToScreen(ScreenId(0)),
                WindowNotification::MovedToScreen(ScreenId(1)),
            ]
        );
    }

    #[test]
    fn dead_context_ignores_bounds() {
        let (_display, _peer, mut ctx) = setup(TopLevelParams::default());
        ctx.process_destroy();
        ctx.set_bounds(BoundsRequest::content(10, 10));
        assert_eq!(ctx.get_geometry().content_width, 0);
    }
}
