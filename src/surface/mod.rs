//! Rendering boundary.
//!
//! The core never draws anything. A surface receives an [`EditScript`] per
//! pass and the selection to re-apply once the script is in place.

mod mirror;

use crate::identity::{Identity, Payload};
use crate::reconcile::EditScript;
use crate::selection::{SelectionSource, SelectionState};

pub use mirror::MirrorSurface;

/// A displayed list the host keeps in sync.
pub trait ListSurface<S: Identity, I: Identity, P: Payload>: SelectionSource<I> {
    /// Apply one pass worth of edits, all at once.
    fn apply(&mut self, script: &EditScript<S, I, P>);

    /// Replace the selection. Called after [`apply`](Self::apply).
    fn select(&mut self, selection: &SelectionState<I>);
}
