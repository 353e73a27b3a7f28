use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::identity::Identity;

/// Errors raised while constructing a snapshot.
///
/// A snapshot with a repeated identity is a bug in whatever produced it, so
/// these are never recovered from inside the reconciliation path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("Section {section} appears more than once")]
    DuplicateSection { section: String },

    #[error("Item {item} appears in section {first} and again in section {second}")]
    DuplicateItem {
        item: String,
        first: String,
        second: String,
    },
}

/// One row: a stable identity plus whatever the surface needs to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<I, P> {
    pub id: I,
    pub payload: P,
}

impl<I, P> Item<I, P> {
    pub fn new(id: I, payload: P) -> Self {
        Self { id, payload }
    }
}

/// An ordered group of items.
#[derive(Debug, Clone, PartialEq)]
pub struct Section<S, I, P> {
    pub id: S,
    pub items: Vec<Item<I, P>>,
}

impl<S, I, P> Section<S, I, P> {
    pub fn new(id: S, items: Vec<Item<I, P>>) -> Self {
        Self { id, items }
    }
}

/// Where an item sits inside a snapshot, by section and item index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemLocation {
    pub section: usize,
    pub index: usize,
}

/// Immutable ordered, sectioned list.
///
/// Cloning is cheap: the sections and lookup tables live behind an `Arc`.
/// A snapshot is superseded by the next one and never patched in place.
pub struct Snapshot<S, I, P> {
    inner: Arc<SnapshotInner<S, I, P>>,
}

struct SnapshotInner<S, I, P> {
    sections: Vec<Section<S, I, P>>,
    section_index: HashMap<S, usize>,
    item_index: HashMap<I, ItemLocation>,
    item_count: usize,
}

impl<S, I, P> Clone for Snapshot<S, I, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Identity, I: Identity, P> Snapshot<S, I, P> {
    /// Build a snapshot, rejecting any repeated section or item identity.
    pub fn new(sections: Vec<Section<S, I, P>>) -> Result<Self, SnapshotError> {
        let mut section_index = HashMap::with_capacity(sections.len());
        let mut item_index = HashMap::new();

        for (section_pos, section) in sections.iter().enumerate() {
            if section_index.insert(section.id.clone(), section_pos).is_some() {
                return Err(SnapshotError::DuplicateSection {
                    section: format!("{:?}", section.id),
                });
            }

            for (index, item) in section.items.iter().enumerate() {
                let location = ItemLocation {
                    section: section_pos,
                    index,
                };
                if let Some(previous) = item_index.insert(item.id.clone(), location) {
                    return Err(SnapshotError::DuplicateItem {
                        item: format!("{:?}", item.id),
                        first: format!("{:?}", sections[previous.section].id),
                        second: format!("{:?}", section.id),
                    });
                }
            }
        }

        let item_count = item_index.len();
        Ok(Self {
            inner: Arc::new(SnapshotInner {
                sections,
                section_index,
                item_index,
                item_count,
            }),
        })
    }

    /// A snapshot with no sections.
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(SnapshotInner {
                sections: Vec::new(),
                section_index: HashMap::new(),
                item_index: HashMap::new(),
                item_count: 0,
            }),
        }
    }

    pub fn sections(&self) -> &[Section<S, I, P>] {
        &self.inner.sections
    }

    pub fn section(&self, id: &S) -> Option<&Section<S, I, P>> {
        self.section_position(id)
            .map(|position| &self.inner.sections[position])
    }

    pub fn section_position(&self, id: &S) -> Option<usize> {
        self.inner.section_index.get(id).copied()
    }

    pub fn contains_section(&self, id: &S) -> bool {
        self.inner.section_index.contains_key(id)
    }

    pub fn locate(&self, id: &I) -> Option<ItemLocation> {
        self.inner.item_index.get(id).copied()
    }

    pub fn item(&self, id: &I) -> Option<&Item<I, P>> {
        self.locate(id)
            .map(|loc| &self.inner.sections[loc.section].items[loc.index])
    }

    pub fn contains_item(&self, id: &I) -> bool {
        self.inner.item_index.contains_key(id)
    }

    /// Section identity owning the given item, if present.
    pub fn section_of(&self, id: &I) -> Option<&S> {
        self.locate(id)
            .map(|loc| &self.inner.sections[loc.section].id)
    }

    pub fn section_count(&self) -> usize {
        self.inner.sections.len()
    }

    pub fn item_count(&self) -> usize {
        self.inner.item_count
    }

    /// True when there are no sections at all.
    pub fn is_empty(&self) -> bool {
        self.inner.sections.is_empty()
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &S> {
        self.inner.sections.iter().map(|section| &section.id)
    }

    /// Every item in display order, paired with its section identity.
    pub fn items(&self) -> impl Iterator<Item = (&S, &Item<I, P>)> {
        self.inner
            .sections
            .iter()
            .flat_map(|section| section.items.iter().map(move |item| (&section.id, item)))
    }

    pub fn item_ids(&self) -> impl Iterator<Item = &I> {
        self.items().map(|(_, item)| &item.id)
    }
}

impl<S: Identity, I: Identity, P> Default for Snapshot<S, I, P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: PartialEq, I: PartialEq, P: PartialEq> PartialEq for Snapshot<S, I, P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner.sections == other.inner.sections
    }
}

impl<S: fmt::Debug, I: fmt::Debug, P: fmt::Debug> fmt::Debug for Snapshot<S, I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("sections", &self.inner.sections)
            .finish()
    }
}
