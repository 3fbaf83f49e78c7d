use std::io;
use std::rc::Rc;

use clap::{Parser, ValueEnum};
use indoc::indoc;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use tracing::Level as LogLevel;

use wincontext::config::ContextConfig;
use wincontext::context::{BoundsRequest, ContextId, TopLevelParams, WindowContext, WindowType};
use wincontext::display::sim::SimulatedDisplay;
use wincontext::error::ContextError;
use wincontext::event_loop::{ControlFlow, EventLoop};
use wincontext::geometry::FrameExtents;
use wincontext::peer::{Level, RecordingPeer};
use wincontext::preview::{DesktopPreview, buffer_lines};
use wincontext::registry::ContextRegistry;
use wincontext::tracing_sub::{self, LogHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Size a window before it is mapped and let late frame extents land.
    Map,
    /// Three-level ownership chain under an always-on-top root.
    Owners,
    /// A modal dialog blocking its parent.
    Modal,
    /// Fullscreen round trip of a constrained window.
    Fullscreen,
}

#[derive(Parser, Debug)]
#[command(
    name = "wincontext-demo",
    version = env!("CARGO_PKG_VERSION"),
    about = "Run window context scenarios against a simulated display server",
    after_help = indoc! {"
        Examples:
          wincontext-demo map --extents 10,10,30,10
          wincontext-demo owners --verbose
          wincontext-demo fullscreen --no-frame-extents
    "}
)]
struct DemoCli {
    #[arg(value_enum, default_value_t = Scenario::Map)]
    scenario: Scenario,

    /// Frame extents the simulated window manager reports.
    #[arg(long, value_name = "LEFT,RIGHT,TOP,BOTTOM")]
    extents: Option<String>,

    /// Simulate a window manager without frame extent support.
    #[arg(long)]
    no_frame_extents: bool,

    /// Preview width in columns; defaults to the terminal width.
    #[arg(long, value_name = "COLUMNS")]
    columns: Option<u16>,

    /// Preview height in rows.
    #[arg(long, value_name = "ROWS", default_value_t = 20)]
    rows: u16,

    /// Print the core's debug log after the preview.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_extents(raw: &str) -> Result<FrameExtents, ContextError> {
    let parts: Vec<i32> = raw
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|_| ContextError::InvalidExtents(raw.to_string()))?;
    match parts.as_slice() {
        [left, right, top, bottom] if parts.iter().all(|v| *v >= 0) => {
            Ok(FrameExtents::new(*left, *right, *top, *bottom))
        }
        _ => Err(ContextError::InvalidExtents(raw.to_string())),
    }
}

fn main() -> io::Result<()> {
    let args = DemoCli::parse();

    let log = LogHandle::default();
    tracing_sub::set_global_log(log.clone());
    tracing_sub::init_default(if args.verbose {
        LogLevel::DEBUG
    } else {
        LogLevel::WARN
    });

    let mut display = SimulatedDisplay::new();
    if let Some(raw) = &args.extents {
        let extents = parse_extents(raw)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
        display = display.with_frame_extents(extents);
    }
    if args.no_frame_extents {
        display = display.without_frame_extents();
    }
    let display = Rc::new(display);
    let config = ContextConfig::default().with_request_frame_extents(!args.no_frame_extents);
    let mut registry = ContextRegistry::new(display.clone(), config);
    let mut pump = EventLoop::new(display.clone());

    let windows = match args.scenario {
        Scenario::Map => scenario_map(&mut registry),
        Scenario::Owners => scenario_owners(&mut registry, &mut pump),
        Scenario::Modal => scenario_modal(&mut registry),
        Scenario::Fullscreen => scenario_fullscreen(&mut registry, &mut pump),
    };
    settle(&mut registry, &mut pump);

    let columns = args
        .columns
        .unwrap_or_else(|| crossterm::terminal::size().map(|(w, _)| w).unwrap_or(80));
    let area = Rect::new(0, 0, columns.max(10), args.rows.max(4));
    let mut buffer = Buffer::empty(area);
    DesktopPreview::default().render(&registry, area, &mut buffer);
    for line in buffer_lines(&buffer) {
        println!("{line}");
    }

    for (name, id) in windows {
        let Some(ctx) = registry.get(id) else {
            println!("{name}: destroyed");
            continue;
        };
        let g = ctx.get_geometry();
        println!(
            "{name}: frame {}x{} at {},{} content {}x{} visible={} on_top={} interactive={}",
            g.width,
            g.height,
            g.x,
            g.y,
            g.content_width,
            g.content_height,
            ctx.is_visible(),
            registry.effective_on_top(id),
            registry.is_interactive(id),
        );
    }

    if args.verbose {
        println!();
        for line in log.lines() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Dispatch until the simulated server has nothing left to say.
fn settle(registry: &mut ContextRegistry, pump: &mut EventLoop<Rc<SimulatedDisplay>>) {
    pump.run(registry, |_, event| match event {
        Some(_) => ControlFlow::Continue,
        None => ControlFlow::Quit,
    });
}

fn open(
    registry: &mut ContextRegistry,
    owner: Option<ContextId>,
    window_type: WindowType,
    bounds: BoundsRequest,
) -> ContextId {
    let peer = RecordingPeer::new();
    let id = registry.create_top_level(
        TopLevelParams::new(peer.clone()).with_window_type(window_type),
        owner,
    );
    registry.update(id, |ctx| {
        ctx.set_view(Some(peer));
        ctx.set_bounds(bounds);
        ctx.set_visible(true);
    });
    id
}

fn scenario_map(registry: &mut ContextRegistry) -> Vec<(&'static str, ContextId)> {
    let main = open(
        registry,
        None,
        WindowType::Normal,
        BoundsRequest::content(800, 600).at(96, 64),
    );
    vec![("main", main)]
}

fn scenario_owners(
    registry: &mut ContextRegistry,
    pump: &mut EventLoop<Rc<SimulatedDisplay>>,
) -> Vec<(&'static str, ContextId)> {
    let root = open(
        registry,
        None,
        WindowType::Normal,
        BoundsRequest::content(640, 400).at(32, 32),
    );
    registry.update(root, |ctx| ctx.set_level(Level::Floating));
    let tool = open(
        registry,
        Some(root),
        WindowType::Utility,
        BoundsRequest::content(320, 200).at(480, 160),
    );
    let palette = open(
        registry,
        Some(tool),
        WindowType::Utility,
        BoundsRequest::content(240, 160).at(720, 320),
    );
    settle(registry, pump);

    // Children follow their owner through an iconify round trip.
    registry.update(root, |ctx| ctx.set_minimized(true));
    settle(registry, pump);
    registry.update(root, |ctx| ctx.set_minimized(false));
    vec![("root", root), ("tool", tool), ("palette", palette)]
}

fn scenario_modal(registry: &mut ContextRegistry) -> Vec<(&'static str, ContextId)> {
    let parent = open(
        registry,
        None,
        WindowType::Normal,
        BoundsRequest::content(720, 480).at(32, 32),
    );
    let dialog = open(
        registry,
        Some(parent),
        WindowType::Normal,
        BoundsRequest::content(320, 160).at(240, 192),
    );
    registry.set_modal(dialog, true, Some(parent));
    vec![("parent", parent), ("dialog", dialog)]
}

fn scenario_fullscreen(
    registry: &mut ContextRegistry,
    pump: &mut EventLoop<Rc<SimulatedDisplay>>,
) -> Vec<(&'static str, ContextId)> {
    let main = open(
        registry,
        None,
        WindowType::Normal,
        BoundsRequest::content(640, 480).at(64, 64),
    );
    settle(registry, pump);
    registry.update(main, |ctx| {
        ctx.set_minimum_size(Some(320), Some(240));
        ctx.set_resizable(false);
        ctx.enter_fullscreen();
    });
    settle(registry, pump);
    registry.update(main, |ctx| ctx.exit_fullscreen());
    vec![("main", main)]
}
