use std::time::Duration;

use crate::constants::DEFAULT_POLL_INTERVAL;
use crate::display::EventSource;
use crate::native::NativeEvent;
use crate::registry::ContextRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The native event pump.
///
/// Owns the event source and is the only place that reads from it. Every
/// event is dispatched into the registry (which wraps it in a lifecycle
/// guard) before the caller's handler sees it, so the handler observes
/// post-event state and may issue further runtime requests.
pub struct EventLoop<S> {
    source: S,
    poll_interval: Duration,
}

impl<S: EventSource> EventLoop<S> {
    pub fn new(source: S) -> Self {
        Self::with_poll_interval(source, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(source: S, poll_interval: Duration) -> Self {
        Self {
            source,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> Option<NativeEvent> {
        self.source.poll_event()
    }

    pub fn source(&mut self) -> &mut S {
        &mut self.source
    }

    /// Dispatch everything currently queued, including events queued while
    /// dispatching. Returns how many were dispatched.
    pub fn dispatch_pending(&mut self, registry: &mut ContextRegistry) -> usize {
        let mut count = 0;
        while let Some(event) = self.source.poll_event() {
            registry.dispatch(&event);
            count += 1;
        }
        count
    }

    /// Runs the pump until the handler asks to quit.
    ///
    /// The handler is called with:
    /// - `Some(event)` after each event has been dispatched.
    /// - `None` when the poll interval elapses without an event (an idle
    ///   tick).
    ///
    /// Once the queue is drained the pump blocks in the source for up to the
    /// poll interval, so a handler that keeps returning `Continue` does not
    /// spin.
    pub fn run<F>(&mut self, registry: &mut ContextRegistry, mut handler: F)
    where
        F: FnMut(&mut ContextRegistry, Option<&NativeEvent>) -> ControlFlow,
    {
        loop {
            // Drain the queue before idling so replies to requests issued by
            // the handler are seen on the next pass.
            while let Some(event) = self.source.poll_event() {
                registry.dispatch(&event);
                if handler(registry, Some(&event)) == ControlFlow::Quit {
                    return;
                }
            }
            let event = self.source.wait_event(self.poll_interval);
            if let Some(event) = &event {
                registry.dispatch(event);
            }
            if handler(registry, event.as_ref()) == ControlFlow::Quit {
                return;
            }
        }
    }
}
