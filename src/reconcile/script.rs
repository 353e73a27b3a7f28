/// Position of an item: the identity of its section plus its index there.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemPosition<S> {
    pub section: S,
    pub index: usize,
}

impl<S> ItemPosition<S> {
    pub fn new(section: S, index: usize) -> Self {
        Self { section, index }
    }
}

/// A section-level edit.
///
/// `from` indexes the old snapshot, `to` indexes the new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionChange<S> {
    Remove { id: S, from: usize },
    Insert { id: S, to: usize },
    Move { id: S, from: usize, to: usize },
}

impl<S> SectionChange<S> {
    pub fn id(&self) -> &S {
        match self {
            Self::Remove { id, .. } | Self::Insert { id, .. } | Self::Move { id, .. } => id,
        }
    }
}

/// An item-level edit.
///
/// Removal and move sources index the old snapshot; insertion, move targets
/// and updates index the new one.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemChange<S, I, P> {
    Remove {
        id: I,
        from: ItemPosition<S>,
    },
    Insert {
        id: I,
        to: ItemPosition<S>,
        payload: P,
    },
    Move {
        id: I,
        from: ItemPosition<S>,
        to: ItemPosition<S>,
    },
    Update {
        id: I,
        at: ItemPosition<S>,
        payload: P,
    },
}

impl<S, I, P> ItemChange<S, I, P> {
    pub fn id(&self) -> &I {
        match self {
            Self::Remove { id, .. }
            | Self::Insert { id, .. }
            | Self::Move { id, .. }
            | Self::Update { id, .. } => id,
        }
    }
}

/// Counts per kind of edit, for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptStats {
    pub sections_inserted: usize,
    pub sections_removed: usize,
    pub sections_moved: usize,
    pub items_inserted: usize,
    pub items_removed: usize,
    pub items_moved: usize,
    pub items_updated: usize,
}

/// Edits that turn a rendering of the old snapshot into one of the new.
///
/// Each list is ordered removals, insertions, moves, then updates. Items of
/// inserted or removed sections are listed too, so the script is complete on
/// its own.
#[derive(Debug, Clone, PartialEq)]
pub struct EditScript<S, I, P> {
    pub sections: Vec<SectionChange<S>>,
    pub items: Vec<ItemChange<S, I, P>>,
}

impl<S, I, P> EditScript<S, I, P> {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            items: Vec::new(),
        }
    }

    /// True when applying the script changes nothing.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len() + self.items.len()
    }

    pub fn stats(&self) -> ScriptStats {
        let mut stats = ScriptStats::default();
        for change in &self.sections {
            match change {
                SectionChange::Remove { .. } => stats.sections_removed += 1,
                SectionChange::Insert { .. } => stats.sections_inserted += 1,
                SectionChange::Move { .. } => stats.sections_moved += 1,
            }
        }
        for change in &self.items {
            match change {
                ItemChange::Remove { .. } => stats.items_removed += 1,
                ItemChange::Insert { .. } => stats.items_inserted += 1,
                ItemChange::Move { .. } => stats.items_moved += 1,
                ItemChange::Update { .. } => stats.items_updated += 1,
            }
        }
        stats
    }
}

impl<S, I: PartialEq, P> EditScript<S, I, P> {
    /// All item edits that mention `id`.
    pub fn changes_for<'a>(&'a self, id: &'a I) -> impl Iterator<Item = &'a ItemChange<S, I, P>> {
        self.items.iter().filter(move |change| change.id() == id)
    }
}

impl<S, I, P> Default for EditScript<S, I, P> {
    fn default() -> Self {
        Self::new()
    }
}
