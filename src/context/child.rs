//! Context embedded inside another native window.
//!
//! There is no window manager between a child and its parent: no frame
//! extents, no stacking, no state changes. Geometry is the content
//! geometry and every window-manager operation falls through to the
//! capability interface's no-op defaults.

use std::rc::Rc;

use crate::config::ContextConfig;
use crate::display::{DisplayClient, WindowSpec};
use crate::native::{ConfigureEvent, NativeWindow};
use crate::peer::{ViewNotification, WindowPeer};

use super::{BoundsRequest, ContextBase, ContextKind, WindowContext};

pub struct ChildContext {
    base: ContextBase,
    parent: NativeWindow,
    embedded_x: i32,
    embedded_y: i32,
}

impl ChildContext {
    pub fn new(
        display: Rc<dyn DisplayClient>,
        config: ContextConfig,
        parent: NativeWindow,
        window_peer: Option<Rc<dyn WindowPeer>>,
    ) -> Self {
        let native = display.create_window(WindowSpec::Child { parent, x: 0, y: 0 });
        tracing::debug!(window = ?native, ?parent, "created child context");
        Self {
            base: ContextBase::new(display, config, native, window_peer),
            parent,
            embedded_x: 0,
            embedded_y: 0,
        }
    }

    pub fn parent(&self) -> NativeWindow {
        self.parent
    }
}

impl WindowContext for ChildContext {
    fn base(&self) -> &ContextBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ContextBase {
        &mut self.base
    }

    fn kind(&self) -> ContextKind {
        ContextKind::Child
    }

    fn set_bounds(&mut self, request: BoundsRequest) {
        if self.base.is_dead() {
            return;
        }
        let native = self.base.native_window();
        let g = &mut self.base.geometry;
        let width = request.width.or(request.content_width);
        let height = request.height.or(request.content_height);
        let resized = g.set_content_size(width, height);
        let moved = g.set_position(request.x, request.y);
        let (x, y, width, height) = (g.x, g.y, g.content_width, g.content_height);

        if moved {
            self.embedded_x = x;
            self.embedded_y = y;
            self.base.display().move_window(native, x, y);
        }
        if resized {
            self.base.display().resize(native, width, height);
            self.base
                .notify_view(ViewNotification::Resize { width, height });
        }
    }

    fn process_configure(&mut self, event: &ConfigureEvent) {
        if self.base.is_dead() {
            return;
        }
        let g = &mut self.base.geometry;
        if g.set_position(Some(event.x), Some(event.y)) {
            self.embedded_x = event.x;
            self.embedded_y = event.y;
        }
        if g.set_content_size(Some(event.width), Some(event.height)) {
            self.base.notify_view(ViewNotification::Resize {
                width: event.width,
                height: event.height,
            });
        }
    }

    fn embedded_x(&self) -> i32 {
        self.embedded_x
    }

    fn embedded_y(&self) -> i32 {
        self.embedded_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::sim::SimulatedDisplay;
    use crate::native::WmFunctions;
    use crate::peer::{Level, RecordingPeer};

    fn child() -> (Rc<SimulatedDisplay>, Rc<RecordingPeer>, ChildContext) {
        let display = Rc::new(SimulatedDisplay::new());
        let parent = display.create_window(WindowSpec::TopLevel {
            popup: false,
            utility: false,
            decorated: true,
            transparent: false,
            functions: WmFunctions::ALL,
        });
        let peer = RecordingPeer::new();
        let mut ctx = ChildContext::new(
            display.clone(),
            ContextConfig::default(),
            parent,
            Some(peer.clone()),
        );
        ctx.set_view(Some(peer.clone()));
        (display, peer, ctx)
    }

    #[test]
    fn bounds_are_content_bounds_with_embedding_offset() {
        let (display, peer, mut ctx) = child();
        ctx.set_bounds(BoundsRequest::window(120, 80).at(15, 25));
        let g = ctx.get_geometry();
        assert_eq!((g.width, g.height), (g.content_width, g.content_height));
        assert_eq!((ctx.embedded_x(), ctx.embedded_y()), (15, 25));
        let sim = display.window(ctx.native_window()).unwrap();
        assert_eq!((sim.x, sim.y, sim.width, sim.height), (15, 25, 120, 80));
        assert_eq!(
            peer.view_events(),
            vec![ViewNotification::Resize {
                width: 120,
                height: 80
            }]
        );
    }

    #[test]
    fn window_manager_operations_are_no_ops() {
        let (display, _peer, mut ctx) = child();
        ctx.set_level(Level::TopMost);
        ctx.set_title("ignored");
        ctx.enter_fullscreen();
        ctx.set_minimized(true);
        let sim = display.window(ctx.native_window()).unwrap();
        assert!(!sim.keep_above);
        assert!(sim.title.is_empty());
        assert!(!sim.fullscreen);
        assert!(!sim.iconified);
        assert!(ctx.take_tree_requests().is_empty());
        assert_eq!(ctx.owner(), None);
    }

    #[test]
    fn configure_tracks_embedding() {
        let (_display, _peer, mut ctx) = child();
        ctx.process_configure(&ConfigureEvent {
            x: 4,
            y: 8,
            width: 50,
            height: 60,
        });
        assert_eq!((ctx.embedded_x(), ctx.embedded_y()), (4, 8));
        assert_eq!(ctx.get_geometry().content_height, 60);
    }
}
