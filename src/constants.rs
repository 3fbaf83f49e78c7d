//! Shared crate-wide constants.

use std::time::Duration;

/// Pixels reported per scroll-wheel notch.
///
/// Wheel events carry a direction only; the runtime expects a pixel delta
/// and multiplies the unit delta by this value on both axes.
pub const DEFAULT_SCROLL_MULTIPLIER: f64 = 40.0;

/// Content width used when a window becomes visible without a requested size.
pub const DEFAULT_WINDOW_WIDTH: i32 = 320;

/// Content height used when a window becomes visible without a requested size.
pub const DEFAULT_WINDOW_HEIGHT: i32 = 200;

/// How long the event loop waits for a native event before an idle tick.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(16);
