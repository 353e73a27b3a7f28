use std::collections::{HashMap, HashSet};

use crate::identity::{Identity, Payload};
use crate::reconcile::{EditScript, ItemChange, SectionChange};
use crate::selection::{SelectionSource, SelectionState};
use crate::snapshot::{Item, Section, Snapshot, SnapshotError};

use super::ListSurface;

/// In-memory surface that keeps its own copy of the rendered list.
///
/// It only ever learns about changes through edit scripts, the same way a
/// real view would, so its contents show whether a script is complete.
#[derive(Debug, Clone)]
pub struct MirrorSurface<S: Identity, I: Identity, P> {
    sections: Vec<Section<S, I, P>>,
    selection: SelectionState<I>,
    applied_scripts: usize,
}

impl<S: Identity, I: Identity, P: Payload> MirrorSurface<S, I, P> {
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            selection: SelectionState::new(),
            applied_scripts: 0,
        }
    }

    /// A surface already showing `snapshot`.
    pub fn from_snapshot(snapshot: &Snapshot<S, I, P>) -> Self {
        Self {
            sections: snapshot.sections().to_vec(),
            ..Self::new()
        }
    }

    pub fn sections(&self) -> &[Section<S, I, P>] {
        &self.sections
    }

    /// Rebuild a snapshot from what is currently shown.
    pub fn to_snapshot(&self) -> Result<Snapshot<S, I, P>, SnapshotError> {
        Snapshot::new(self.sections.clone())
    }

    /// Simulate the user selecting rows.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = I>) {
        self.selection = ids.into_iter().collect();
    }

    pub fn selection(&self) -> &SelectionState<I> {
        &self.selection
    }

    pub fn applied_scripts(&self) -> usize {
        self.applied_scripts
    }

    /// Shown item identities in display order.
    pub fn item_ids(&self) -> Vec<I> {
        self.sections
            .iter()
            .flat_map(|section| section.items.iter().map(|item| item.id.clone()))
            .collect()
    }

    fn apply_sections(&self, script: &EditScript<S, I, P>) -> Vec<S> {
        let mut leaving: HashSet<&S> = HashSet::new();
        let mut placed = Vec::new();
        for change in &script.sections {
            match change {
                SectionChange::Remove { id, .. } => {
                    leaving.insert(id);
                }
                SectionChange::Insert { id, to } => placed.push((*to, id.clone())),
                SectionChange::Move { id, to, .. } => {
                    leaving.insert(id);
                    placed.push((*to, id.clone()));
                }
            }
        }

        let staying = self
            .sections
            .iter()
            .filter(|section| !leaving.contains(&section.id))
            .map(|section| section.id.clone());
        fill_slots(placed, staying)
    }
}

impl<S: Identity, I: Identity, P: Payload> Default for MirrorSurface<S, I, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Identity, I: Identity, P: Payload> SelectionSource<I> for MirrorSurface<S, I, P> {
    fn selected(&self) -> SelectionState<I> {
        self.selection.clone()
    }
}

impl<S: Identity, I: Identity, P: Payload> ListSurface<S, I, P> for MirrorSurface<S, I, P> {
    fn apply(&mut self, script: &EditScript<S, I, P>) {
        self.applied_scripts += 1;
        if script.is_empty() {
            return;
        }

        let order = self.apply_sections(script);

        let mut leaving: HashSet<I> = HashSet::new();
        let mut arriving: HashMap<S, Vec<(usize, ItemSlot<I, P>)>> = HashMap::new();
        for change in &script.items {
            match change {
                ItemChange::Remove { id, .. } => {
                    leaving.insert(id.clone());
                }
                ItemChange::Insert { id, to, payload } => {
                    arriving
                        .entry(to.section.clone())
                        .or_default()
                        .push((to.index, ItemSlot::Fresh(Item::new(id.clone(), payload.clone()))));
                }
                ItemChange::Move { id, to, .. } => {
                    leaving.insert(id.clone());
                    arriving
                        .entry(to.section.clone())
                        .or_default()
                        .push((to.index, ItemSlot::Carried(id.clone())));
                }
                ItemChange::Update { .. } => {}
            }
        }

        let mut previous: HashMap<S, Vec<I>> = HashMap::new();
        let mut carried: HashMap<I, Item<I, P>> = HashMap::new();
        for section in std::mem::take(&mut self.sections) {
            previous.insert(
                section.id.clone(),
                section.items.iter().map(|item| item.id.clone()).collect(),
            );
            carried.extend(section.items.into_iter().map(|item| (item.id.clone(), item)));
        }

        let mut rebuilt = Vec::with_capacity(order.len());
        for section_id in order {
            let placed = arriving
                .remove(&section_id)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(index, slot)| match slot {
                    ItemSlot::Fresh(item) => Some((index, item)),
                    ItemSlot::Carried(id) => {
                        let item = carried.remove(&id);
                        if item.is_none() {
                            tracing::warn!(item = ?id, "Edit script moves an item that is not shown");
                        }
                        item.map(|item| (index, item))
                    }
                })
                .collect();
            let staying: Vec<Item<I, P>> = previous
                .remove(&section_id)
                .unwrap_or_default()
                .into_iter()
                .filter(|id| !leaving.contains(id))
                .filter_map(|id| carried.remove(&id))
                .collect();
            rebuilt.push(Section::new(section_id, fill_slots(placed, staying)));
        }
        self.sections = rebuilt;

        for change in &script.items {
            if let ItemChange::Update { id, at, payload } = change {
                let slot = self
                    .sections
                    .iter_mut()
                    .find(|section| section.id == at.section)
                    .and_then(|section| section.items.iter_mut().find(|item| item.id == *id));
                match slot {
                    Some(item) => item.payload = payload.clone(),
                    None => tracing::warn!(item = ?id, "Edit script updates an item that is not shown"),
                }
            }
        }
    }

    fn select(&mut self, selection: &SelectionState<I>) {
        self.selection = selection.clone();
    }
}

enum ItemSlot<I, P> {
    Fresh(Item<I, P>),
    Carried(I),
}

/// Put each placed value at its target index and fill the gaps with
/// `rest`, keeping its order.
fn fill_slots<T>(placed: Vec<(usize, T)>, rest: impl IntoIterator<Item = T>) -> Vec<T> {
    let rest: Vec<T> = rest.into_iter().collect();
    let mut slots: Vec<Option<T>> = Vec::new();
    slots.resize_with(placed.len() + rest.len(), || None);

    for (index, value) in placed {
        if index >= slots.len() {
            slots.resize_with(index + 1, || None);
        }
        slots[index] = Some(value);
    }

    let mut rest = rest.into_iter();
    for slot in slots.iter_mut().filter(|slot| slot.is_none()) {
        *slot = rest.next();
    }
    slots.into_iter().flatten().chain(rest).collect()
}
