//! Grouping flat records into an ordered, sectioned snapshot.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::identity::Identity;

use super::types::{Item, Section, Snapshot, SnapshotError};

/// Host-supplied ordering for section identities.
pub type SectionComparator<S> = Arc<dyn Fn(&S, &S) -> Ordering + Send + Sync>;

/// How section order is decided when records are grouped.
///
/// Both variants produce an explicit ordered list; section order is never
/// taken from an unordered collection.
pub enum Sectioning<S> {
    /// Sections appear in the order their first record appears.
    SourceOrder,
    /// Sections are sorted by the comparator. Ties keep first-appearance order.
    Sorted(SectionComparator<S>),
}

impl<S: Identity> Sectioning<S> {
    pub fn sorted_by(compare: impl Fn(&S, &S) -> Ordering + Send + Sync + 'static) -> Self {
        Self::Sorted(Arc::new(compare))
    }

    /// Sort sections by their natural ordering.
    pub fn natural() -> Self
    where
        S: Ord,
    {
        Self::sorted_by(|a: &S, b: &S| a.cmp(b))
    }

    /// Group `(section, id, payload)` records into a snapshot.
    ///
    /// Items keep record order inside each section.
    pub fn group<I: Identity, P>(
        &self,
        records: impl IntoIterator<Item = (S, I, P)>,
    ) -> Result<Snapshot<S, I, P>, SnapshotError> {
        let mut sections: Vec<Section<S, I, P>> = Vec::new();
        let mut positions: HashMap<S, usize> = HashMap::new();

        for (section_id, id, payload) in records {
            let position = match positions.get(&section_id) {
                Some(position) => *position,
                None => {
                    positions.insert(section_id.clone(), sections.len());
                    sections.push(Section::new(section_id, Vec::new()));
                    sections.len() - 1
                }
            };
            sections[position].items.push(Item::new(id, payload));
        }

        if let Sectioning::Sorted(compare) = self {
            sections.sort_by(|a, b| compare(&a.id, &b.id));
        }

        Snapshot::new(sections)
    }
}

impl<S> Clone for Sectioning<S> {
    fn clone(&self) -> Self {
        match self {
            Self::SourceOrder => Self::SourceOrder,
            Self::Sorted(compare) => Self::Sorted(Arc::clone(compare)),
        }
    }
}

impl<S> Default for Sectioning<S> {
    fn default() -> Self {
        Self::SourceOrder
    }
}

impl<S> fmt::Debug for Sectioning<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceOrder => f.write_str("SourceOrder"),
            Self::Sorted(_) => f.write_str("Sorted(..)"),
        }
    }
}
