//! Deferred destruction of window contexts.
//!
//! Every native event handler runs under an `EventsGuard`. The guard bumps
//! the context's in-flight counter on entry and drops it on exit; a context
//! that was marked dead is freed by whichever guard brings the counter back
//! to zero. A handler that destroys its own context (directly or through a
//! nested dispatch) therefore never frees memory that is still in use.

use std::ops::{Deref, DerefMut};

use crate::context::ContextId;
use crate::registry::ContextRegistry;

pub struct EventsGuard<'a> {
    registry: &'a mut ContextRegistry,
    id: ContextId,
}

impl<'a> EventsGuard<'a> {
    /// Enter a handler for `id`; `None` when the context is already gone.
    pub fn new(registry: &'a mut ContextRegistry, id: ContextId) -> Option<Self> {
        if !registry.increment_events_counter(id) {
            return None;
        }
        Some(Self { registry, id })
    }

    pub fn id(&self) -> ContextId {
        self.id
    }
}

impl Deref for EventsGuard<'_> {
    type Target = ContextRegistry;

    fn deref(&self) -> &ContextRegistry {
        self.registry
    }
}

impl DerefMut for EventsGuard<'_> {
    fn deref_mut(&mut self) -> &mut ContextRegistry {
        self.registry
    }
}

impl Drop for EventsGuard<'_> {
    fn drop(&mut self) {
        self.registry.release_events_counter(self.id);
    }
}
