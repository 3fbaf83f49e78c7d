//! Window geometry model.
//!
//! The toolkit sizes a window by its client (content) area, while the
//! managed runtime expects outer sizes that include window-manager
//! decorations. `WindowGeometry` keeps both and the adjustment between them:
//! `width == content_width + adjust_w` and `height == content_height +
//! adjust_h` hold after every mutation.

/// Decoration insets reported by the window manager (`_NET_FRAME_EXTENTS`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameExtents {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl FrameExtents {
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }

    pub const fn is_empty(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }
}

/// Client-area size constraints handed to the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
}

impl SizeHints {
    pub const fn fixed(width: i32, height: i32) -> Self {
        Self {
            min_width: width,
            min_height: height,
            max_width: Some(width),
            max_height: Some(height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    /// Outer window size, decorations included.
    pub width: i32,
    pub height: i32,
    /// Content (view) size.
    pub content_width: i32,
    pub content_height: i32,

    pub adjust_w: i32,
    pub adjust_h: i32,

    /// Offset of the content view inside the window.
    pub view_x: i32,
    pub view_y: i32,

    pub frame_extents_received: bool,

    /// Stored for the runtime; no placement logic consumes them.
    pub gravity_x: f32,
    pub gravity_y: f32,

    pub enabled: bool,
    pub enabled_on_map: bool,
    pub resizable: bool,
    /// Final resizable value to apply once the window is mapped.
    pub resizable_on_map: bool,

    /// Outer-size bounds; `None` means unbounded.
    pub min_width: Option<i32>,
    pub min_height: Option<i32>,
    pub max_width: Option<i32>,
    pub max_height: Option<i32>,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            content_width: 0,
            content_height: 0,
            adjust_w: 0,
            adjust_h: 0,
            view_x: 0,
            view_y: 0,
            frame_extents_received: false,
            gravity_x: 1.0,
            gravity_y: 1.0,
            enabled: true,
            enabled_on_map: true,
            resizable: true,
            resizable_on_map: true,
            min_width: None,
            min_height: None,
            max_width: None,
            max_height: None,
        }
    }
}

impl WindowGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, x: Option<i32>, y: Option<i32>) -> bool {
        let mut changed = false;
        if let Some(x) = x {
            changed |= self.x != x;
            self.x = x;
        }
        if let Some(y) = y {
            changed |= self.y != y;
            self.y = y;
        }
        changed
    }

    /// Set the content size on the given axes; window size follows.
    pub fn set_content_size(&mut self, width: Option<i32>, height: Option<i32>) -> bool {
        let before = (self.content_width, self.content_height);
        if let Some(w) = width {
            self.content_width = w.max(1);
        }
        if let Some(h) = height {
            self.content_height = h.max(1);
        }
        self.recompute_window_size();
        before != (self.content_width, self.content_height)
    }

    /// Set the outer window size on the given axes; content size is derived.
    pub fn set_window_size(&mut self, width: Option<i32>, height: Option<i32>) -> bool {
        let width = width.map(|w| self.window_to_content_width(w));
        let height = height.map(|h| self.window_to_content_height(h));
        self.set_content_size(width, height)
    }

    pub fn set_adjustments(&mut self, adjust_w: i32, adjust_h: i32, view_x: i32, view_y: i32) {
        self.adjust_w = adjust_w;
        self.adjust_h = adjust_h;
        self.view_x = view_x;
        self.view_y = view_y;
        self.recompute_window_size();
    }

    pub fn apply_frame_extents(&mut self, extents: FrameExtents) {
        self.frame_extents_received = true;
        self.set_adjustments(
            extents.horizontal(),
            extents.vertical(),
            extents.left,
            extents.top,
        );
    }

    pub fn window_to_content_width(&self, width: i32) -> i32 {
        (width - self.adjust_w).max(1)
    }

    pub fn window_to_content_height(&self, height: i32) -> i32 {
        (height - self.adjust_h).max(1)
    }

    pub fn has_size(&self) -> bool {
        self.content_width > 0 && self.content_height > 0
    }

    /// Client-area constraints for the current resizable/enabled state.
    ///
    /// A window that cannot be resized by the user, or is disabled, is
    /// pinned to its current content size.
    pub fn size_hints(&self) -> SizeHints {
        if !(self.resizable && self.enabled) {
            return SizeHints::fixed(self.content_width, self.content_height);
        }
        SizeHints {
            min_width: self
                .min_width
                .map(|w| self.window_to_content_width(w))
                .unwrap_or(1),
            min_height: self
                .min_height
                .map(|h| self.window_to_content_height(h))
                .unwrap_or(1),
            max_width: self.max_width.map(|w| self.window_to_content_width(w)),
            max_height: self.max_height.map(|h| self.window_to_content_height(h)),
        }
    }

    fn recompute_window_size(&mut self) {
        self.width = self.content_width + self.adjust_w;
        self.height = self.content_height + self.adjust_h;
    }
}
