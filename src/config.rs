//! Registry-wide configuration.
//!
//! `ContextConfig` is handed to every context at construction so all windows
//! share the same protocol and input tuning.

use crate::constants::{DEFAULT_SCROLL_MULTIPLIER, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

/// Tunables shared by every window context.
///
/// - `request_frame_extents`: ask the window manager for decoration insets
///   (`_NET_REQUEST_FRAME_EXTENTS`) when a titled window is created.
/// - `scroll_multiplier`: pixels per wheel notch reported with scroll events.
/// - `default_size`: content size used when a window is shown before any
///   size was requested.
/// - `ime`: whether input methods may be enabled at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextConfig {
    request_frame_extents: bool,
    scroll_multiplier: f64,
    default_size: (i32, i32),
    ime: bool,
}

impl ContextConfig {
    pub const fn new() -> Self {
        Self {
            request_frame_extents: true,
            scroll_multiplier: DEFAULT_SCROLL_MULTIPLIER,
            default_size: (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
            ime: true,
        }
    }

    pub const fn request_frame_extents(&self) -> bool {
        self.request_frame_extents
    }

    pub const fn scroll_multiplier(&self) -> f64 {
        self.scroll_multiplier
    }

    pub const fn default_size(&self) -> (i32, i32) {
        self.default_size
    }

    pub const fn ime(&self) -> bool {
        self.ime
    }

    pub const fn with_request_frame_extents(mut self, enabled: bool) -> Self {
        self.request_frame_extents = enabled;
        self
    }

    pub const fn with_scroll_multiplier(mut self, multiplier: f64) -> Self {
        self.scroll_multiplier = multiplier;
        self
    }

    pub const fn with_default_size(mut self, width: i32, height: i32) -> Self {
        self.default_size = (width, height);
        self
    }

    pub const fn with_ime(mut self, enabled: bool) -> Self {
        self.ime = enabled;
        self
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::new()
    }
}
