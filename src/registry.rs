//! Arena of live window contexts and the relations between them.
//!
//! Contexts refer to each other by `ContextId` only. Everything that touches
//! more than one context at once (ownership, on-top inheritance, modality,
//! child visibility, cascading destroy) lives here, and so does the only
//! teardown path: a context leaves the arena when it is dead and no event
//! handler is running on it.

use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use slotmap::{SecondaryMap, SlotMap};

use crate::config::ContextConfig;
use crate::context::{
    ChildContext, ContextId, ContextKind, TopLevelContext, TopLevelParams, TreeRequest,
    WindowContext, deliver,
};
use crate::display::DisplayClient;
use crate::error::ContextError;
use crate::lifecycle::EventsGuard;
use crate::native::{NativeEvent, NativeEventKind, NativeWindow};
use crate::peer::WindowPeer;

slotmap::new_key_type! {
    /// Handle to a window group.
    pub struct GroupId;
}

/// Scope for modality and focus grabs: an ownership tree plus any modal
/// windows attached to it.
#[derive(Debug, Default)]
struct WindowGroup {
    members: BTreeSet<ContextId>,
    /// Modal windows, innermost last.
    modal_stack: Vec<ContextId>,
    focus_grab: Option<ContextId>,
}

pub struct ContextRegistry {
    display: Rc<dyn DisplayClient>,
    config: ContextConfig,
    contexts: SlotMap<ContextId, Box<dyn WindowContext>>,
    by_native: HashMap<NativeWindow, ContextId>,
    groups: SlotMap<GroupId, WindowGroup>,
    group_of: SecondaryMap<ContextId, GroupId>,
}

impl ContextRegistry {
    pub fn new(display: Rc<dyn DisplayClient>, config: ContextConfig) -> Self {
        Self {
            display,
            config,
            contexts: SlotMap::with_key(),
            by_native: HashMap::new(),
            groups: SlotMap::with_key(),
            group_of: SecondaryMap::new(),
        }
    }

    pub fn display(&self) -> Rc<dyn DisplayClient> {
        Rc::clone(&self.display)
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn create_top_level(
        &mut self,
        params: TopLevelParams,
        owner: Option<ContextId>,
    ) -> ContextId {
        let ctx = TopLevelContext::new(Rc::clone(&self.display), self.config, params);
        let id = self.insert(Box::new(ctx));
        let group = self.groups.insert(WindowGroup::default());
        self.move_to_group(id, group);
        if owner.is_some() {
            self.set_owner(id, owner);
        }
        id
    }

    /// Embed a new context into `parent`.
    pub fn create_child(
        &mut self,
        parent: NativeWindow,
        window_peer: Option<Rc<dyn WindowPeer>>,
    ) -> ContextId {
        let ctx = ChildContext::new(Rc::clone(&self.display), self.config, parent, window_peer);
        self.insert(Box::new(ctx))
    }

    fn insert(&mut self, ctx: Box<dyn WindowContext>) -> ContextId {
        let native = ctx.native_window();
        let id = self.contexts.insert(ctx);
        self.by_native.insert(native, id);
        id
    }

    pub fn get(&self, id: ContextId) -> Option<&dyn WindowContext> {
        self.contexts.get(id).map(|ctx| ctx.as_ref())
    }

    pub fn get_mut(&mut self, id: ContextId) -> Option<&mut (dyn WindowContext + 'static)> {
        self.contexts.get_mut(id).map(|ctx| ctx.as_mut())
    }

    pub fn top_level(&self, id: ContextId) -> Option<&TopLevelContext> {
        self.get(id).and_then(|ctx| ctx.as_top_level())
    }

    pub fn top_level_mut(&mut self, id: ContextId) -> Option<&mut TopLevelContext> {
        self.get_mut(id).and_then(|ctx| ctx.as_top_level_mut())
    }

    pub fn lookup(&self, window: NativeWindow) -> Option<ContextId> {
        self.by_native.get(&window).copied()
    }

    pub fn contains(&self, id: ContextId) -> bool {
        self.contexts.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    pub fn ids(&self) -> Vec<ContextId> {
        self.contexts.keys().collect()
    }

    /// Run a runtime request against one context, then carry out any
    /// ownership-tree work it queued.
    pub fn update<R>(
        &mut self,
        id: ContextId,
        f: impl FnOnce(&mut dyn WindowContext) -> R,
    ) -> Option<R> {
        let ctx = self.get_mut(id)?;
        let result = f(ctx);
        self.process_tree_requests(id);
        Some(result)
    }

    /// Route a native event to its context under a lifecycle guard.
    pub fn dispatch(&mut self, event: &NativeEvent) {
        let Some(id) = self.lookup(event.window) else {
            tracing::trace!(window = ?event.window, kind = ?event.kind, "event for unknown window");
            return;
        };
        if let Some(mut guard) = EventsGuard::new(self, id) {
            guard.route(id, &event.kind);
        }
    }

    fn route(&mut self, id: ContextId, kind: &NativeEventKind) {
        tracing::trace!(?id, ?kind, "dispatching");
        if is_input(kind) && !self.is_interactive(id) {
            tracing::trace!(?id, "input blocked by modal window");
            return;
        }
        match self.get(id) {
            Some(ctx) if !ctx.is_dead() => {}
            _ => return,
        }
        if matches!(kind, NativeEventKind::Destroy) {
            if let Some(ctx) = self.get_mut(id) {
                ctx.base_mut().mark_destroyed_by_server();
            }
            self.destroy_tree(id);
            return;
        }
        if let Some(ctx) = self.get_mut(id) {
            deliver(ctx, kind);
        }
        self.process_tree_requests(id);
    }

    fn process_tree_requests(&mut self, id: ContextId) {
        loop {
            let requests = match self.get_mut(id) {
                Some(ctx) => ctx.take_tree_requests(),
                None => return,
            };
            if requests.is_empty() {
                return;
            }
            for request in requests {
                match request {
                    TreeRequest::PropagateOnTop => self.update_ontop_tree(id),
                    TreeRequest::ShowChildren(show) => self.show_or_hide_children(id, show),
                    TreeRequest::FocusGrabReleased => self.forget_focus_grab(id),
                }
            }
        }
    }

    /// Make `owner` the owner of `child`, or detach `child` with `None`.
    /// Invalid changes are logged and ignored.
    pub fn set_owner(&mut self, child: ContextId, owner: Option<ContextId>) {
        if let Err(err) = self.try_set_owner(child, owner) {
            tracing::warn!(%err, "rejected owner change");
        }
    }

    fn try_set_owner(
        &mut self,
        child: ContextId,
        owner: Option<ContextId>,
    ) -> Result<(), ContextError> {
        let ctx = self.get(child).ok_or(ContextError::UnknownContext(child))?;
        if ctx.kind() != ContextKind::TopLevel {
            return Err(ContextError::NotTopLevel(child));
        }
        let previous = ctx.owner();

        let owner = match owner {
            Some(owner) => {
                if owner == child {
                    return Err(ContextError::SelfOwnership(child));
                }
                let owner_ctx = self.get(owner).ok_or(ContextError::UnknownContext(owner))?;
                if owner_ctx.kind() != ContextKind::TopLevel {
                    return Err(ContextError::NotTopLevel(owner));
                }
                if self.is_owned_by(owner, child) {
                    return Err(ContextError::OwnershipCycle { child, owner });
                }
                Some((owner, owner_ctx.native_window()))
            }
            None => None,
        };

        if let Some(prev) = previous
            && let Some(prev_ctx) = self.get_mut(prev)
        {
            prev_ctx.remove_child(child);
        }
        let group = match owner {
            Some((owner_id, _)) => {
                if let Some(owner_ctx) = self.get_mut(owner_id) {
                    owner_ctx.add_child(child);
                }
                self.group_for(owner_id)
            }
            None => self.groups.insert(WindowGroup::default()),
        };
        for member in self.subtree(child) {
            self.move_to_group(member, group);
        }

        let inherited = owner.is_some_and(|(owner_id, _)| self.effective_on_top(owner_id));
        if let Some(top) = self.top_level_mut(child) {
            top.set_owner(owner);
            top.set_inherited_on_top(inherited);
        }
        self.update_ontop_tree(child);
        tracing::debug!(?child, owner = ?owner.map(|(id, _)| id), "owner changed");
        Ok(())
    }

    /// Whether `id` sits below `ancestor` in the ownership tree.
    pub fn is_owned_by(&self, id: ContextId, ancestor: ContextId) -> bool {
        let mut current = self.get(id).and_then(|ctx| ctx.owner());
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.get(c).and_then(|ctx| ctx.owner());
        }
        false
    }

    /// `id` followed by everything it owns, transitively.
    fn subtree(&self, id: ContextId) -> Vec<ContextId> {
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            if let Some(ctx) = self.get(out[i]) {
                out.extend(ctx.children());
            }
            i += 1;
        }
        out
    }

    /// On top by its own flag or through any owner.
    pub fn effective_on_top(&self, id: ContextId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            let Some(top) = self.top_level(c) else {
                return false;
            };
            if top.on_top() {
                return true;
            }
            current = top.owner();
        }
        false
    }

    /// Push `id`'s effective on-top state down to every descendant.
    pub fn update_ontop_tree(&mut self, id: ContextId) {
        let on_top = self.effective_on_top(id);
        let children = self.get(id).map(|ctx| ctx.children()).unwrap_or_default();
        for child in children {
            if let Some(top) = self.top_level_mut(child) {
                top.set_inherited_on_top(on_top);
            }
            self.update_ontop_tree(child);
        }
    }

    /// Hide owned windows, or bring back the ones this call hid earlier.
    pub fn show_or_hide_children(&mut self, id: ContextId, show: bool) {
        let children = self.get(id).map(|ctx| ctx.children()).unwrap_or_default();
        for child in children {
            let Some(ctx) = self.get_mut(child) else {
                continue;
            };
            if show {
                if ctx.base().hidden_by_owner() {
                    ctx.set_visible(true);
                }
            } else if ctx.is_visible() {
                ctx.set_visible(false);
                ctx.base_mut().set_hidden_by_owner(true);
            }
            self.show_or_hide_children(child, show);
        }
    }

    fn group_for(&mut self, id: ContextId) -> GroupId {
        if let Some(group) = self.group_of.get(id) {
            return *group;
        }
        let group = self.groups.insert(WindowGroup::default());
        self.move_to_group(id, group);
        group
    }

    fn move_to_group(&mut self, id: ContextId, group: GroupId) {
        if let Some(old) = self.group_of.insert(id, group)
            && old != group
        {
            self.leave_group(id, old);
        }
        if let Some(g) = self.groups.get_mut(group) {
            g.members.insert(id);
        }
    }

    fn leave_group(&mut self, id: ContextId, group: GroupId) {
        let Some(g) = self.groups.get_mut(group) else {
            return;
        };
        g.members.remove(&id);
        g.modal_stack.retain(|m| *m != id);
        if g.focus_grab == Some(id) {
            g.focus_grab = None;
        }
        if g.members.is_empty() {
            self.groups.remove(group);
        }
    }

    pub fn group_of(&self, id: ContextId) -> Option<GroupId> {
        self.group_of.get(id).copied()
    }

    /// Make `id` modal for `parent`'s group, or release it.
    pub fn set_modal(&mut self, id: ContextId, enable: bool, parent: Option<ContextId>) {
        let parent = parent.filter(|p| self.contains(*p) && *p != id);
        let parent_native = parent.and_then(|p| self.get(p)).map(|ctx| ctx.native_window());
        match self.get_mut(id) {
            Some(ctx) if !ctx.is_dead() && ctx.kind() == ContextKind::TopLevel => {
                ctx.set_modal(enable, parent_native);
            }
            _ => return,
        }

        if enable {
            let group = match parent {
                Some(parent) => self.group_for(parent),
                None => self.group_for(id),
            };
            self.move_to_group(id, group);
            if let Some(g) = self.groups.get_mut(group) {
                g.modal_stack.retain(|m| *m != id);
                g.modal_stack.push(id);
            }
        } else {
            self.leave_modal(id);
        }
        tracing::debug!(?id, enable, ?parent, "modal state changed");
    }

    fn leave_modal(&mut self, id: ContextId) {
        if let Some(group) = self.group_of(id)
            && let Some(g) = self.groups.get_mut(group)
        {
            g.modal_stack.retain(|m| *m != id);
        }
    }

    /// Whether input may reach `id`: true unless a modal window in its group
    /// is active and `id` is neither that window nor owned by it.
    pub fn is_interactive(&self, id: ContextId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let modal = self
            .group_of(id)
            .and_then(|group| self.groups.get(group))
            .and_then(|g| g.modal_stack.last().copied());
        match modal {
            None => true,
            Some(modal) => modal == id || self.is_owned_by(id, modal),
        }
    }

    /// Exclusive pointer and keyboard grab, one holder per group.
    pub fn grab_focus(&mut self, id: ContextId) -> bool {
        if !self.is_interactive(id) {
            return false;
        }
        let group = self.group_of(id);
        let previous = group
            .and_then(|g| self.groups.get(g))
            .and_then(|g| g.focus_grab)
            .filter(|holder| *holder != id);
        if let Some(holder) = previous
            && let Some(ctx) = self.get_mut(holder)
        {
            ctx.ungrab_focus();
        }
        let grabbed = self.get_mut(id).is_some_and(|ctx| ctx.grab_focus());
        if let Some(g) = group.and_then(|g| self.groups.get_mut(g)) {
            g.focus_grab = grabbed.then_some(id);
        }
        grabbed
    }

    pub fn ungrab_focus(&mut self, id: ContextId) {
        if let Some(ctx) = self.get_mut(id) {
            ctx.ungrab_focus();
        }
        self.forget_focus_grab(id);
    }

    fn forget_focus_grab(&mut self, id: ContextId) {
        if let Some(group) = self.group_of(id)
            && let Some(g) = self.groups.get_mut(group)
            && g.focus_grab == Some(id)
        {
            g.focus_grab = None;
        }
    }

    /// Mark `id` and everything it owns dead, detaching it from its owner.
    fn destroy_tree(&mut self, id: ContextId) {
        let (children, owner) = match self.get(id) {
            Some(ctx) if !ctx.is_dead() => (ctx.children(), ctx.owner()),
            _ => return,
        };
        for child in children {
            if let Some(mut guard) = EventsGuard::new(self, child) {
                guard.destroy_tree(child);
            }
        }
        if let Some(owner) = owner
            && let Some(owner_ctx) = self.get_mut(owner)
        {
            owner_ctx.remove_child(id);
        }
        self.leave_modal(id);
        if let Some(ctx) = self.get_mut(id) {
            ctx.process_destroy();
        }
        tracing::debug!(?id, "window context destroyed");
    }

    /// The teardown entry point for the runtime: destroy `id` and free it as
    /// soon as no event handler is running on it.
    pub fn destroy_and_delete(&mut self, id: ContextId) {
        if let Some(mut guard) = EventsGuard::new(self, id) {
            guard.destroy_tree(id);
        }
    }

    pub fn increment_events_counter(&mut self, id: ContextId) -> bool {
        match self.get_mut(id) {
            Some(ctx) => {
                ctx.increment_events_counter();
                true
            }
            None => false,
        }
    }

    /// Leave an event handler; frees the context when it is dead and this
    /// was the last handler. Returns whether it was freed.
    pub fn release_events_counter(&mut self, id: ContextId) -> bool {
        let Some(ctx) = self.get_mut(id) else {
            return false;
        };
        ctx.decrement_events_counter();
        if ctx.is_dead() && ctx.events_count() == 0 {
            self.free(id);
            return true;
        }
        false
    }

    pub fn events_count(&self, id: ContextId) -> Option<usize> {
        self.get(id).map(|ctx| ctx.events_count())
    }

    fn free(&mut self, id: ContextId) {
        let Some(ctx) = self.contexts.remove(id) else {
            return;
        };
        let native = ctx.native_window();
        if self.by_native.get(&native) == Some(&id) {
            self.by_native.remove(&native);
        }
        if let Some(group) = self.group_of.remove(id) {
            self.leave_group(id, group);
        }
        if let Some(owner) = ctx.owner()
            && let Some(owner_ctx) = self.get_mut(owner)
        {
            owner_ctx.remove_child(id);
        }
        drop(ctx);
        tracing::debug!(?id, window = ?native, "window context freed");
    }
}

fn is_input(kind: &NativeEventKind) -> bool {
    matches!(
        kind,
        NativeEventKind::Button(_)
            | NativeEventKind::Motion(_)
            | NativeEventKind::Scroll(_)
            | NativeEventKind::Key(_)
    )
}
