//! Per-window input-method state.

use crate::display::{DisplayClient, ImeFilter, InputContextId};
use crate::native::{KeyEvent, NativeWindow};

/// Input-method bundle owned by one window context.
///
/// The input context is tied to the window's native handle and must be
/// released before that handle is destroyed.
#[derive(Debug, Default)]
pub struct ImeState {
    context: Option<InputContextId>,
    enabled: bool,
}

impl ImeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn context(&self) -> Option<InputContextId> {
        self.context
    }

    /// Create the input context on first use, reset it afterwards.
    pub fn enable_or_reset(&mut self, display: &dyn DisplayClient, window: NativeWindow) {
        match self.context {
            Some(ic) => display.reset_input_context(ic),
            None => self.context = display.create_input_context(window),
        }
        self.enabled = self.context.is_some();
        if !self.enabled {
            tracing::debug!(?window, "input method unavailable");
        }
    }

    pub fn disable(&mut self, display: &dyn DisplayClient) {
        self.enabled = false;
        self.release(display);
    }

    pub fn set_focus(&self, display: &dyn DisplayClient, focused: bool) {
        if self.enabled
            && let Some(ic) = self.context
        {
            display.set_input_focus(ic, focused);
        }
    }

    /// Offer a key event to the input method.
    pub fn filter(&self, display: &dyn DisplayClient, event: &KeyEvent) -> ImeFilter {
        match self.context {
            Some(ic) if self.enabled => display.filter_key(ic, event),
            _ => ImeFilter::Passthrough,
        }
    }

    pub fn release(&mut self, display: &dyn DisplayClient) {
        if let Some(ic) = self.context.take() {
            display.destroy_input_context(ic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::WindowSpec;
    use crate::display::sim::SimulatedDisplay;
    use crate::native::{ModifierState, WmFunctions};

    fn window(display: &SimulatedDisplay) -> NativeWindow {
        display.create_window(WindowSpec::TopLevel {
            popup: false,
            utility: false,
            decorated: true,
            transparent: false,
            functions: WmFunctions::ALL,
        })
    }

    #[test]
    fn enable_creates_once_then_resets() {
        let display = SimulatedDisplay::new();
        let w = window(&display);
        let mut ime = ImeState::new();
        ime.enable_or_reset(&display, w);
        let first = ime.context();
        ime.enable_or_reset(&display, w);
        assert!(ime.enabled());
        assert_eq!(ime.context(), first);
        assert_eq!(display.live_input_contexts(), 1);
    }

    #[test]
    fn disable_destroys_input_context() {
        let display = SimulatedDisplay::new();
        let w = window(&display);
        let mut ime = ImeState::new();
        ime.enable_or_reset(&display, w);
        ime.disable(&display);
        assert!(!ime.enabled());
        assert_eq!(ime.context(), None);
        assert_eq!(display.live_input_contexts(), 0);
    }

    #[test]
    fn missing_input_method_leaves_ime_disabled() {
        let display = SimulatedDisplay::new().without_input_method();
        let w = window(&display);
        let mut ime = ImeState::new();
        ime.enable_or_reset(&display, w);
        assert!(!ime.enabled());
        let key = KeyEvent::press(u32::from(b'a'), ModifierState::empty());
        assert_eq!(ime.filter(&display, &key), ImeFilter::Passthrough);
    }
}
