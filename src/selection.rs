//! Selection capture and restoration across a reconciliation pass.
//!
//! Selection is tracked by identity only. Restoring never guesses a
//! replacement by position: an identity that disappeared is simply dropped.

use std::collections::HashSet;

use crate::identity::Identity;
use crate::snapshot::Snapshot;

/// Set of selected item identities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState<I: Identity> {
    ids: HashSet<I>,
}

impl<I: Identity> SelectionState<I> {
    pub fn new() -> Self {
        Self {
            ids: HashSet::new(),
        }
    }

    pub fn contains(&self, id: &I) -> bool {
        self.ids.contains(id)
    }

    /// Returns true if the identity was not selected before.
    pub fn insert(&mut self, id: I) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &I) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.ids.iter()
    }
}

impl<I: Identity> Default for SelectionState<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Identity> FromIterator<I> for SelectionState<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl<I: Identity> IntoIterator for SelectionState<I> {
    type Item = I;
    type IntoIter = std::collections::hash_set::IntoIter<I>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

/// Anything that can report which identities are currently selected.
pub trait SelectionSource<I: Identity> {
    fn selected(&self) -> SelectionState<I>;
}

/// Read the current selection. Called when a change is announced.
pub fn capture<I: Identity>(source: &(impl SelectionSource<I> + ?Sized)) -> SelectionState<I> {
    source.selected()
}

/// Keep only the identities still present in `against`.
///
/// Moved items stay selected wherever they ended up.
pub fn restore<S: Identity, I: Identity, P>(
    selection: &SelectionState<I>,
    against: &Snapshot<S, I, P>,
) -> SelectionState<I> {
    selection
        .iter()
        .filter(|id| against.contains_item(id))
        .cloned()
        .collect()
}
