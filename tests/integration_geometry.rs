use std::rc::Rc;

use wincontext::config::ContextConfig;
use wincontext::context::{BoundsRequest, ContextId, TopLevelParams, WindowContext};
use wincontext::display::sim::SimulatedDisplay;
use wincontext::event_loop::EventLoop;
use wincontext::geometry::{SizeHints, WindowGeometry};
use wincontext::peer::{RecordingPeer, ViewNotification, WindowNotification, WindowState};
use wincontext::registry::ContextRegistry;

fn setup(display: SimulatedDisplay) -> (Rc<SimulatedDisplay>, ContextRegistry) {
    let display = Rc::new(display);
    let registry = ContextRegistry::new(display.clone(), ContextConfig::default());
    (display, registry)
}

fn pump(display: &Rc<SimulatedDisplay>, registry: &mut ContextRegistry) {
    EventLoop::new(display.clone()).dispatch_pending(registry);
}

fn assert_invariant(g: &WindowGeometry) {
    assert_eq!(g.width, g.content_width + g.adjust_w, "{g:?}");
    assert_eq!(g.height, g.content_height + g.adjust_h, "{g:?}");
}

fn geometry(registry: &ContextRegistry, id: ContextId) -> WindowGeometry {
    registry.get(id).unwrap().get_geometry()
}

#[test]
fn content_request_gains_decorations_once_extents_arrive() {
    let (display, mut registry) = setup(SimulatedDisplay::new());
    let peer = RecordingPeer::new();
    let id = registry.create_top_level(TopLevelParams::new(peer.clone()), None);
    registry.update(id, |ctx| {
        ctx.set_view(Some(peer.clone()));
        ctx.set_bounds(BoundsRequest::content(800, 600).at(100, 80));
    });

    let before = geometry(&registry, id);
    assert_invariant(&before);
    assert!(!before.frame_extents_received);
    assert_eq!((before.content_width, before.content_height), (800, 600));

    registry.update(id, |ctx| ctx.set_visible(true));
    pump(&display, &mut registry);

    let after = geometry(&registry, id);
    assert_invariant(&after);
    assert!(after.frame_extents_received);
    assert_eq!((after.width, after.height), (820, 640));
    assert_eq!((after.content_width, after.content_height), (800, 600));
    assert_eq!((after.view_x, after.view_y), (10, 30));
    assert!(peer.has_window_event(&WindowNotification::Resize {
        state: WindowState::Restored,
        width: 820,
        height: 640,
    }));
    assert!(peer.view_events().contains(&ViewNotification::Resize {
        width: 800,
        height: 600,
    }));

    let native = registry.get(id).unwrap().native_window();
    let server = display.window(native).unwrap();
    assert_eq!((server.width, server.height), (800, 600));
}

#[test]
fn outer_size_request_is_honored_after_late_extents() {
    let (display, mut registry) = setup(SimulatedDisplay::new());
    let id = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
    registry.update(id, |ctx| {
        ctx.set_bounds(BoundsRequest::window(820, 640));
        ctx.set_visible(true);
    });
    assert_invariant(&geometry(&registry, id));

    pump(&display, &mut registry);
    let g = geometry(&registry, id);
    assert_invariant(&g);
    assert_eq!((g.width, g.height), (820, 640));
    assert_eq!((g.content_width, g.content_height), (800, 600));
}

#[test]
fn window_manager_without_extents_leaves_sizes_equal() {
    let (display, mut registry) = setup(SimulatedDisplay::new().without_frame_extents());
    let id = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
    registry.update(id, |ctx| {
        ctx.set_bounds(BoundsRequest::content(640, 480));
        ctx.set_visible(true);
    });
    pump(&display, &mut registry);

    let g = geometry(&registry, id);
    assert_invariant(&g);
    assert!(!g.frame_extents_received);
    assert_eq!((g.width, g.height), (640, 480));
}

#[test]
fn configure_from_the_window_manager_updates_content_size() {
    let (display, mut registry) = setup(SimulatedDisplay::new());
    let id = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
    registry.update(id, |ctx| {
        ctx.set_bounds(BoundsRequest::content(400, 300));
        ctx.set_visible(true);
    });
    pump(&display, &mut registry);

    registry.update(id, |ctx| ctx.set_maximized(true));
    pump(&display, &mut registry);
    let g = geometry(&registry, id);
    assert_invariant(&g);
    assert_eq!((g.width, g.height), (1920, 1080));

    registry.update(id, |ctx| ctx.set_maximized(false));
    pump(&display, &mut registry);
    let g = geometry(&registry, id);
    assert_invariant(&g);
    assert_eq!((g.content_width, g.content_height), (400, 300));
}

#[test]
fn fullscreen_round_trip_restores_constraints() {
    let (display, mut registry) = setup(SimulatedDisplay::new());
    let id = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
    registry.update(id, |ctx| {
        ctx.set_bounds(BoundsRequest::content(640, 480).at(64, 64));
        ctx.set_visible(true);
    });
    pump(&display, &mut registry);
    registry.update(id, |ctx| {
        ctx.set_minimum_size(Some(320), Some(240));
        ctx.set_maximum_size(Some(1280), Some(960));
        ctx.set_resizable(false);
    });
    let before = geometry(&registry, id);

    registry.update(id, |ctx| ctx.enter_fullscreen());
    pump(&display, &mut registry);
    let top = registry.top_level(id).unwrap();
    assert!(top.is_fullscreen());
    assert_eq!(top.get_geometry().content_width, 1920);

    registry.update(id, |ctx| ctx.exit_fullscreen());
    pump(&display, &mut registry);
    let top = registry.top_level(id).unwrap();
    assert!(!top.is_fullscreen());
    let after = top.get_geometry();
    assert_invariant(&after);
    assert_eq!(after.resizable, before.resizable);
    assert_eq!(
        (after.min_width, after.min_height, after.max_width, after.max_height),
        (Some(320), Some(240), Some(1280), Some(960))
    );
    assert_eq!(
        (after.x, after.y, after.content_width, after.content_height),
        (64, 64, 640, 480)
    );

    let server = display.window(top.native_window()).unwrap();
    assert_eq!(server.hints, Some(SizeHints::fixed(640, 480)));
}
