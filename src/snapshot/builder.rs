use crate::identity::Identity;

use super::types::{Item, Section, Snapshot, SnapshotError};

/// Fluent snapshot construction, validated once on `build()`.
pub struct SnapshotBuilder<S, I, P> {
    sections: Vec<Section<S, I, P>>,
}

impl<S: Identity, I: Identity, P> SnapshotBuilder<S, I, P> {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
        }
    }

    /// Append a section with its items, in order.
    pub fn section(mut self, id: S, items: impl IntoIterator<Item = (I, P)>) -> Self {
        self.append_section(id, items);
        self
    }

    pub fn append_section(&mut self, id: S, items: impl IntoIterator<Item = (I, P)>) {
        let items = items
            .into_iter()
            .map(|(id, payload)| Item::new(id, payload))
            .collect();
        self.sections.push(Section::new(id, items));
    }

    pub fn build(self) -> Result<Snapshot<S, I, P>, SnapshotError> {
        Snapshot::new(self.sections)
    }
}

impl<S: Identity, I: Identity, P> Default for SnapshotBuilder<S, I, P> {
    fn default() -> Self {
        Self::new()
    }
}
