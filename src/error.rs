//! Validation errors raised inside the core.
//!
//! Window operations never hand these to callers: native event ordering is
//! outside the caller's control, so a rejected request is logged and dropped.
//! They exist so the checks read as ordinary `Result` code and so the demo
//! binary can report bad arguments.

use thiserror::Error;

use crate::context::ContextId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("no live window context for {0:?}")]
    UnknownContext(ContextId),
    #[error("window context {0:?} cannot own itself")]
    SelfOwnership(ContextId),
    #[error("making {owner:?} the owner of {child:?} would create an ownership cycle")]
    OwnershipCycle { child: ContextId, owner: ContextId },
    #[error("window context {0:?} is not a top-level window")]
    NotTopLevel(ContextId),
    #[error("pixel buffer holds {actual} bytes, {expected} needed for {width}x{height}")]
    BufferTooSmall {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("invalid frame extents {0:?}: expected LEFT,RIGHT,TOP,BOTTOM")]
    InvalidExtents(String),
}
