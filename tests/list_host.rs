mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{contact, contact_store, Contact};
use listsync::{HostEvent, ListHost, MirrorSurface, SelectionState};

type Mirror = MirrorSurface<&'static str, u32, Contact>;
type Host = ListHost<&'static str, u32, Contact>;

fn selection(ids: &[u32]) -> SelectionState<u32> {
    ids.iter().copied().collect()
}

#[test]
fn scenario_keeps_surviving_selection() {
    let (store, receiver) = contact_store();
    let mut host = Host::new(receiver, store.clone());
    let mut surface = Mirror::new();

    store.replace_all([(1, contact("Alice", true)), (2, contact("Bob", true))]);
    host.process_pending(&mut surface).unwrap();
    surface.set_selection([1, 2]);

    store.batch(|batch| {
        batch.remove(&1);
        batch.upsert(3, contact("Cara", true));
    });
    host.process_pending(&mut surface).unwrap();

    assert_eq!(surface.item_ids(), vec![2, 3]);
    assert_eq!(surface.selection(), &selection(&[2]));
    assert_eq!(&surface.to_snapshot().unwrap(), host.applied());
}

#[test]
fn status_change_moves_selected_contact_between_sections() {
    let (store, receiver) = contact_store();
    let mut host = Host::new(receiver, store.clone());
    let mut events = host.subscribe();
    let mut surface = Mirror::new();

    store.replace_all([
        (1, contact("Alice", true)),
        (2, contact("Bob", true)),
        (3, contact("Cara", false)),
    ]);
    host.process_pending(&mut surface).unwrap();
    surface.set_selection([2]);
    let _ = events.try_recv();

    store.update(&2, |c| c.online = false);
    host.process_pending(&mut surface).unwrap();

    let Ok(HostEvent::Applied(report)) = events.try_recv() else {
        panic!("expected an applied pass");
    };
    assert_eq!(report.stats.items_moved, 1);
    assert_eq!(report.stats.items_updated, 1);
    assert_eq!(report.selection, selection(&[2]));
    assert_eq!(host.applied().section_of(&2), Some(&"offline"));
    assert_eq!(surface.item_ids(), vec![1, 2, 3]);
}

#[test]
fn unchanged_data_still_restores_selection() {
    let (store, receiver) = contact_store();
    let mut host = Host::new(receiver, store.clone());
    let mut surface = Mirror::new();

    store.upsert(1, contact("Alice", true));
    host.process_pending(&mut surface).unwrap();
    surface.set_selection([1, 99]);

    store.batch(|_| ());
    let passes = host.process_pending(&mut surface).unwrap();

    assert_eq!(passes, 1);
    assert_eq!(surface.applied_scripts(), 2);
    assert_eq!(surface.selection(), &selection(&[1]));
}

#[test]
fn mutations_from_worker_threads_land_in_one_snapshot() {
    let (store, receiver) = contact_store();
    let mut host = Host::new(receiver, store.clone());
    let mut surface = Mirror::new();

    let workers: Vec<_> = (0..4u32)
        .map(|worker| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for n in 0..5u32 {
                    let id = worker * 10 + n;
                    store.upsert(id, contact(&format!("c{:02}", id), n % 2 == 0));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    host.process_pending(&mut surface).unwrap();

    assert_eq!(host.applied().item_count(), 20);
    assert_eq!(&surface.to_snapshot().unwrap(), host.applied());
    assert!(!host.is_changing());
}

#[tokio::test]
async fn run_applies_changes_as_they_arrive() {
    let (store, receiver) = contact_store();
    let mut host = Host::new(receiver, store.clone());
    let mut events = host.subscribe();

    let task = tokio::spawn(async move {
        let mut surface = Mirror::new();
        host.run(&mut surface).await
    });

    store.upsert(1, contact("Alice", true));
    let first = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("pass within timeout")
        .expect("host alive");
    assert!(matches!(first, HostEvent::Applied(ref report) if report.stats.items_inserted == 1));

    store.remove(&1);
    let second = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("pass within timeout")
        .expect("host alive");
    assert!(matches!(second, HostEvent::Applied(ref report) if report.stats.items_removed == 1));

    task.abort();
}
