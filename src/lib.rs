//! Window contexts bridging a managed UI runtime to a native display server.
//!
//! A [`registry::ContextRegistry`] owns every window context. Native events
//! enter through [`registry::ContextRegistry::dispatch`] (usually driven by
//! [`event_loop::EventLoop`]), runtime requests through
//! [`registry::ContextRegistry::update`] and the registry's tree operations.
//! Contexts talk to the display only through [`display::DisplayClient`] and
//! to the runtime only through the peer traits in [`peer`].

pub mod config;
pub mod constants;
pub mod context;
pub mod display;
pub mod error;
pub mod event_loop;
pub mod geometry;
pub mod ime;
pub mod input;
pub mod lifecycle;
pub mod native;
pub mod peer;
pub mod preview;
pub mod registry;
pub mod tracing_sub;
