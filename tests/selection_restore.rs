mod common;

use common::snap;
use listsync::{capture, reconcile, restore, ListSurface, MirrorSurface, SelectionState};

fn selection(ids: &[u32]) -> SelectionState<u32> {
    ids.iter().copied().collect()
}

#[test]
fn removed_identity_is_dropped_not_replaced() {
    let a = snap(&[("online", &[(1, "Alice"), (2, "Bob")])]);
    let b = snap(&[("online", &[(2, "Bob"), (3, "Cara")])]);

    let mut surface = MirrorSurface::from_snapshot(&a);
    surface.set_selection([1, 2]);

    let captured = capture(&surface);
    surface.apply(&reconcile(&a, &b));
    let restored = restore(&captured, &b);
    surface.select(&restored);

    assert_eq!(restored, selection(&[2]));
    assert!(!surface.selection().contains(&3));
}

#[test]
fn moved_identity_stays_selected() {
    let a = snap(&[("online", &[(1, "Alice"), (2, "Bob")]), ("offline", &[])]);
    let b = snap(&[("online", &[(2, "Bob")]), ("offline", &[(1, "Alice")])]);

    assert_eq!(restore(&selection(&[1]), &b), selection(&[1]));
    assert_eq!(restore(&selection(&[1]), &a), selection(&[1]));
}

#[test]
fn restoration_never_grows_the_selection() {
    let a = snap(&[("online", &[(1, "Alice"), (2, "Bob"), (3, "Cara")])]);
    let b = snap(&[("online", &[(3, "Cara")])]);

    let captured = selection(&[1, 2, 3, 42]);
    let restored = restore(&captured, &b);

    assert_eq!(restored, selection(&[3]));
    assert!(restored.len() <= captured.len());
    assert!(restore(&restored, &a).iter().all(|id| captured.contains(id)));
}

#[test]
fn empty_selection_restores_empty() {
    let a = snap(&[("online", &[(1, "Alice")])]);
    assert!(restore(&SelectionState::new(), &a).is_empty());
}
