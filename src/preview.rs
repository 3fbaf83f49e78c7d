//! Text rendering of the registry's visible top-level windows.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear, Widget};

use crate::context::{ContextId, WindowContext};
use crate::registry::ContextRegistry;

/// Maps desktop pixels onto terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopPreview {
    pixels_per_column: i32,
    pixels_per_row: i32,
}

impl Default for DesktopPreview {
    fn default() -> Self {
        Self::new(16, 32)
    }
}

impl DesktopPreview {
    pub fn new(pixels_per_column: i32, pixels_per_row: i32) -> Self {
        Self {
            pixels_per_column: pixels_per_column.max(1),
            pixels_per_row: pixels_per_row.max(1),
        }
    }

    /// Draw every visible, non-minimized top-level. Windows that are on top
    /// are drawn last so they overlap the rest.
    pub fn render(&self, registry: &ContextRegistry, area: Rect, buf: &mut Buffer) {
        let mut ids: Vec<ContextId> = registry
            .ids()
            .into_iter()
            .filter(|id| {
                registry.top_level(*id).is_some_and(|top| {
                    top.is_visible() && !top.base().is_iconified() && !top.is_dead()
                })
            })
            .collect();
        ids.sort_by_key(|id| (registry.effective_on_top(*id), *id));

        for id in ids {
            let Some(top) = registry.top_level(id) else {
                continue;
            };
            let Some(rect) = self.project(&top.get_geometry(), area) else {
                continue;
            };
            Clear.render(rect, buf);
            Block::default()
                .borders(Borders::ALL)
                .title(label(registry, id))
                .render(rect, buf);
        }
    }

    fn project(&self, g: &crate::geometry::WindowGeometry, area: Rect) -> Option<Rect> {
        let x = i32::from(area.x) + g.x / self.pixels_per_column;
        let y = i32::from(area.y) + g.y / self.pixels_per_row;
        let right = (x + (g.width / self.pixels_per_column).max(2)).min(i32::from(area.right()));
        let bottom = (y + (g.height / self.pixels_per_row).max(2)).min(i32::from(area.bottom()));
        let x = x.max(i32::from(area.x));
        let y = y.max(i32::from(area.y));
        if right - x < 2 || bottom - y < 2 {
            return None;
        }
        Some(Rect {
            x: u16::try_from(x).ok()?,
            y: u16::try_from(y).ok()?,
            width: u16::try_from(right - x).ok()?,
            height: u16::try_from(bottom - y).ok()?,
        })
    }
}

fn label(registry: &ContextRegistry, id: ContextId) -> String {
    let Some(top) = registry.top_level(id) else {
        return String::new();
    };
    let g = top.get_geometry();
    let mut label = format!("{}x{}", g.content_width, g.content_height);
    if registry.effective_on_top(id) {
        label.push_str(" top");
    }
    if top.is_modal() {
        label.push_str(" modal");
    }
    if top.is_fullscreen() {
        label.push_str(" full");
    }
    if !registry.is_interactive(id) {
        label.push_str(" blocked");
    }
    label
}

/// The buffer's rows as plain strings.
pub fn buffer_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut row = String::new();
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell((x, y)) {
                    row.push_str(cell.symbol());
                }
            }
            row.trim_end().to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::config::ContextConfig;
    use crate::context::{BoundsRequest, TopLevelParams};
    use crate::display::sim::SimulatedDisplay;
    use crate::peer::{Level, RecordingPeer};

    #[test]
    fn visible_windows_are_drawn_with_labels() {
        let display = Rc::new(SimulatedDisplay::new());
        let mut registry = ContextRegistry::new(display, ContextConfig::default());
        let a = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
        registry.update(a, |ctx| {
            ctx.set_bounds(BoundsRequest::content(320, 160).at(0, 0));
            ctx.set_visible(true);
        });
        let hidden = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
        registry.update(hidden, |ctx| {
            ctx.set_bounds(BoundsRequest::content(320, 160).at(640, 0));
        });

        let area = Rect::new(0, 0, 60, 10);
        let mut buf = Buffer::empty(area);
        DesktopPreview::default().render(&registry, area, &mut buf);
        let lines = buffer_lines(&buf);
        assert!(lines[0].starts_with('┌'));
        assert!(lines[0].contains("320x160"));
        assert_eq!(lines.iter().filter(|l| l.contains("320x160")).count(), 1);
    }

    #[test]
    fn on_top_windows_are_labelled() {
        let display = Rc::new(SimulatedDisplay::new());
        let mut registry = ContextRegistry::new(display, ContextConfig::default());
        let a = registry.create_top_level(TopLevelParams::new(RecordingPeer::new()), None);
        registry.update(a, |ctx| {
            ctx.set_bounds(BoundsRequest::content(480, 96).at(16, 32));
            ctx.set_level(Level::Floating);
            ctx.set_visible(true);
        });
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        DesktopPreview::default().render(&registry, area, &mut buf);
        let lines = buffer_lines(&buf);
        assert!(lines[1].contains("480x96 top"), "{lines:?}");
        assert!(lines[0].is_empty());
    }
}
