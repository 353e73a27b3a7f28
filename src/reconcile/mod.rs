//! Identity-based diffing of two snapshots.
//!
//! Matching is identity-first at both levels. Payload equality only decides
//! whether a surviving item gets an update. Survivors are reported as moved
//! only when their order relative to the other survivors changed, which keeps
//! removals and insertions from cascading into spurious moves.

mod lis;
mod script;

use std::collections::HashSet;

use crate::identity::{Identity, Payload};
use crate::snapshot::Snapshot;

use lis::stable_mask;

pub use script::{EditScript, ItemChange, ItemPosition, ScriptStats, SectionChange};

/// Compute the edit script turning `old` into `new`.
///
/// Pure and total. Deep-equal snapshots yield an empty script.
pub fn reconcile<S, I, P>(old: &Snapshot<S, I, P>, new: &Snapshot<S, I, P>) -> EditScript<S, I, P>
where
    S: Identity,
    I: Identity,
    P: Payload,
{
    let mut script = EditScript::new();
    diff_sections(old, new, &mut script);
    diff_items(old, new, &mut script);
    script
}

fn diff_sections<S: Identity, I: Identity, P>(
    old: &Snapshot<S, I, P>,
    new: &Snapshot<S, I, P>,
    script: &mut EditScript<S, I, P>,
) {
    let mut survivors = Vec::new();
    for (from, section) in old.sections().iter().enumerate() {
        match new.section_position(&section.id) {
            Some(to) => survivors.push(to),
            None => script.sections.push(SectionChange::Remove {
                id: section.id.clone(),
                from,
            }),
        }
    }

    let mut stable = vec![false; new.section_count()];
    for (to, keep) in survivors.iter().zip(stable_mask(&survivors)) {
        stable[*to] = keep;
    }

    let mut moves = Vec::new();
    for (to, section) in new.sections().iter().enumerate() {
        match old.section_position(&section.id) {
            None => script.sections.push(SectionChange::Insert {
                id: section.id.clone(),
                to,
            }),
            Some(from) if !stable[to] => moves.push(SectionChange::Move {
                id: section.id.clone(),
                from,
                to,
            }),
            Some(_) => {}
        }
    }
    script.sections.extend(moves);
}

fn diff_items<S: Identity, I: Identity, P: Payload>(
    old: &Snapshot<S, I, P>,
    new: &Snapshot<S, I, P>,
    script: &mut EditScript<S, I, P>,
) {
    // Items that stay in the same section without changing relative order.
    let mut stable: HashSet<&I> = HashSet::new();

    for section in old.sections() {
        let new_section = new.section_position(&section.id);
        let mut members = Vec::new();
        let mut targets = Vec::new();

        for (from, item) in section.items.iter().enumerate() {
            match new.locate(&item.id) {
                None => script.items.push(ItemChange::Remove {
                    id: item.id.clone(),
                    from: ItemPosition::new(section.id.clone(), from),
                }),
                Some(loc) if Some(loc.section) == new_section => {
                    members.push(&item.id);
                    targets.push(loc.index);
                }
                Some(_) => {}
            }
        }

        for (id, keep) in members.into_iter().zip(stable_mask(&targets)) {
            if keep {
                stable.insert(id);
            }
        }
    }

    let mut moves = Vec::new();
    let mut updates = Vec::new();

    for section in new.sections() {
        for (index, item) in section.items.iter().enumerate() {
            let to = ItemPosition::new(section.id.clone(), index);
            let Some(loc) = old.locate(&item.id) else {
                script.items.push(ItemChange::Insert {
                    id: item.id.clone(),
                    to,
                    payload: item.payload.clone(),
                });
                continue;
            };

            let old_section = &old.sections()[loc.section];
            let previous = &old_section.items[loc.index];

            if !stable.contains(&item.id) {
                moves.push(ItemChange::Move {
                    id: item.id.clone(),
                    from: ItemPosition::new(old_section.id.clone(), loc.index),
                    to: to.clone(),
                });
            }
            // a moved item can still carry a payload change
            if previous.payload != item.payload {
                updates.push(ItemChange::Update {
                    id: item.id.clone(),
                    at: to,
                    payload: item.payload.clone(),
                });
            }
        }
    }

    script.items.extend(moves);
    script.items.extend(updates);
}
