use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::debounce::{Query, QueryTarget};
use crate::identity::{Identity, Payload};
use crate::notify::{ChangeNotifier, ChangeNotifierExt};
use crate::snapshot::{Sectioning, Snapshot};

use super::{ProviderError, SnapshotProvider};

type SectionKey<S, P> = Arc<dyn Fn(&P) -> S + Send + Sync>;
type QueryPredicate<P> = Arc<dyn Fn(&P, &str) -> bool + Send + Sync>;
type ItemComparator<P> = Arc<dyn Fn(&P, &P) -> Ordering + Send + Sync>;

/// How a [`Store`] turns its records into a snapshot.
pub struct StoreOptions<S, P> {
    section_key: SectionKey<S, P>,
    matches: QueryPredicate<P>,
    compare: Option<ItemComparator<P>>,
    sectioning: Sectioning<S>,
}

impl<S: Identity, P: Payload> StoreOptions<S, P> {
    /// Group records by `section_key`. Every record matches every query
    /// until [`with_filter`](Self::with_filter) says otherwise.
    pub fn new(section_key: impl Fn(&P) -> S + Send + Sync + 'static) -> Self {
        Self {
            section_key: Arc::new(section_key),
            matches: Arc::new(|_: &P, _: &str| true),
            compare: None,
            sectioning: Sectioning::SourceOrder,
        }
    }

    /// Predicate deciding whether a payload matches the query text.
    pub fn with_filter(mut self, matches: impl Fn(&P, &str) -> bool + Send + Sync + 'static) -> Self {
        self.matches = Arc::new(matches);
        self
    }

    /// Item ordering. Without one, records keep insertion order.
    pub fn with_order(mut self, compare: impl Fn(&P, &P) -> Ordering + Send + Sync + 'static) -> Self {
        self.compare = Some(Arc::new(compare));
        self
    }

    pub fn with_sectioning(mut self, sectioning: Sectioning<S>) -> Self {
        self.sectioning = sectioning;
        self
    }
}

/// In-memory backing-data owner.
///
/// Every mutation, and every query change, runs inside exactly one
/// `will_change`/`did_change` pair on the notifier. Changes from different
/// threads take turns, so pairs never interleave.
pub struct Store<S, I, P> {
    notifier: Arc<dyn ChangeNotifier>,
    options: StoreOptions<S, P>,
    /// Held from `will_change` until `did_change`.
    change_gate: Mutex<()>,
    state: RwLock<StoreState<I, P>>,
}

struct StoreState<I, P> {
    records: Vec<(I, P)>,
    query: Query,
}

/// Mutable view of a store's records during [`Store::batch`].
pub struct StoreBatch<'a, I, P> {
    records: &'a mut Vec<(I, P)>,
}

impl<I: Identity, P: Payload> StoreBatch<'_, I, P> {
    /// Insert a record, or replace the payload of an existing one in place.
    pub fn upsert(&mut self, id: I, payload: P) {
        match self.records.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = payload,
            None => self.records.push((id, payload)),
        }
    }

    /// Returns false if no record has this identity.
    pub fn update(&mut self, id: &I, edit: impl FnOnce(&mut P)) -> bool {
        match self.records.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, payload)) => {
                edit(payload);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &I) -> Option<P> {
        let position = self.records.iter().position(|(existing, _)| existing == id)?;
        Some(self.records.remove(position).1)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<S: Identity, I: Identity, P: Payload> Store<S, I, P> {
    pub fn new(notifier: Arc<dyn ChangeNotifier>, options: StoreOptions<S, P>) -> Self {
        Self {
            notifier,
            options,
            change_gate: Mutex::new(()),
            state: RwLock::new(StoreState {
                records: Vec::new(),
                query: Query::All,
            }),
        }
    }

    /// Apply several mutations as a single announced change.
    ///
    /// Blocks while another thread's change is open. Calling back into the
    /// store from `edit` deadlocks.
    pub fn batch<R>(&self, edit: impl FnOnce(&mut StoreBatch<'_, I, P>) -> R) -> R {
        let _gate = self.change_gate.lock();
        self.notifier.change(|| {
            let mut state = self.state.write();
            let mut batch = StoreBatch {
                records: &mut state.records,
            };
            edit(&mut batch)
        })
    }

    pub fn upsert(&self, id: I, payload: P) {
        self.batch(|batch| batch.upsert(id, payload));
    }

    pub fn update(&self, id: &I, edit: impl FnOnce(&mut P)) -> bool {
        self.batch(|batch| batch.update(id, edit))
    }

    pub fn remove(&self, id: &I) -> Option<P> {
        self.batch(|batch| batch.remove(id))
    }

    /// Replace every record at once.
    pub fn replace_all(&self, records: impl IntoIterator<Item = (I, P)>) {
        self.batch(|batch| {
            batch.clear();
            for (id, payload) in records {
                batch.upsert(id, payload);
            }
        });
    }

    pub fn get(&self, id: &I) -> Option<P> {
        self.state
            .read()
            .records
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, payload)| payload.clone())
    }

    /// Number of records, ignoring the query.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    pub fn query(&self) -> Query {
        self.state.read().query.clone()
    }
}

impl<S: Identity, I: Identity, P: Payload> SnapshotProvider<S, I, P> for Store<S, I, P> {
    fn current_snapshot(&self) -> Result<Snapshot<S, I, P>, ProviderError> {
        let state = self.state.read();
        let mut visible: Vec<&(I, P)> = match &state.query {
            Query::All => state.records.iter().collect(),
            Query::Matching(text) => state
                .records
                .iter()
                .filter(|(_, payload)| (self.options.matches)(payload, text.as_str()))
                .collect(),
        };

        if let Some(compare) = &self.options.compare {
            visible.sort_by(|a, b| compare(&a.1, &b.1));
        }

        let records = visible
            .into_iter()
            .map(|(id, payload)| ((self.options.section_key)(payload), id.clone(), payload.clone()));
        Ok(self.options.sectioning.group(records)?)
    }
}

impl<S: Identity, I: Identity, P: Payload> QueryTarget for Store<S, I, P> {
    fn apply_query(&self, query: Query) {
        let _gate = self.change_gate.lock();
        self.notifier.change(|| {
            self.state.write().query = query;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{change_channel, ChangeSignal};
    use std::time::Duration;

    /// Notifier that logs calls in arrival order.
    #[derive(Default)]
    struct Recording {
        log: Mutex<Vec<&'static str>>,
    }

    impl ChangeNotifier for Recording {
        fn will_change(&self) {
            self.log.lock().push("will");
        }

        fn did_change(&self) {
            self.log.lock().push("did");
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        name: &'static str,
        online: bool,
    }

    fn contact(name: &'static str, online: bool) -> Contact {
        Contact { name, online }
    }

    fn options() -> StoreOptions<&'static str, Contact> {
        StoreOptions::new(|c: &Contact| if c.online { "online" } else { "offline" })
            .with_filter(|c: &Contact, text: &str| c.name.to_lowercase().contains(&text.to_lowercase()))
            .with_order(|a: &Contact, b: &Contact| a.name.cmp(b.name))
    }

    #[test]
    fn mutations_are_wrapped_in_one_change() {
        let (sender, mut receiver) = change_channel();
        let store: Store<&str, u32, Contact> = Store::new(Arc::new(sender), options());

        store.batch(|batch| {
            batch.upsert(1, contact("Bob", true));
            batch.upsert(2, contact("Alice", true));
        });

        assert_eq!(receiver.try_recv(), Some(ChangeSignal::WillChange));
        assert_eq!(receiver.try_recv(), Some(ChangeSignal::DidChange));
        assert_eq!(receiver.try_recv(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn snapshot_groups_sorts_and_filters() {
        let (sender, _receiver) = change_channel();
        let store: Store<&str, u32, Contact> = Store::new(Arc::new(sender), options());
        store.replace_all([
            (1, contact("Bob", true)),
            (2, contact("Alice", true)),
            (3, contact("Cara", false)),
        ]);

        let snapshot = store.current_snapshot().unwrap();
        assert_eq!(snapshot.section_ids().copied().collect::<Vec<_>>(), vec!["online", "offline"]);
        assert_eq!(snapshot.item_ids().copied().collect::<Vec<_>>(), vec![2, 1, 3]);

        store.apply_query(Query::Matching("a".to_string()));
        let filtered = store.current_snapshot().unwrap();
        assert_eq!(filtered.item_ids().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn upsert_replaces_existing_payload() {
        let (sender, _receiver) = change_channel();
        let store: Store<&str, u32, Contact> = Store::new(Arc::new(sender), options());
        store.upsert(1, contact("Bob", true));
        store.upsert(1, contact("Bob", false));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&1), Some(contact("Bob", false)));
        assert!(store.update(&1, |c| c.online = true));
        assert!(!store.update(&9, |c| c.online = true));
        assert_eq!(store.remove(&1), Some(contact("Bob", true)));
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_changes_never_interleave() {
        let recording = Arc::new(Recording::default());
        let store: Arc<Store<&str, u32, Contact>> = Arc::new(Store::new(recording.clone(), options()));
        let (inside_tx, inside_rx) = std::sync::mpsc::channel();

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store.batch(|batch| {
                    batch.upsert(1, contact("Alice", true));
                    inside_tx.send(()).unwrap();
                    std::thread::sleep(Duration::from_millis(50));
                });
            })
        };
        inside_rx.recv().unwrap();
        let other = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.apply_query(Query::Matching("a".to_string())))
        };
        store.upsert(2, contact("Bob", false));
        writer.join().unwrap();
        other.join().unwrap();

        let log = recording.log.lock().clone();
        assert_eq!(log.len(), 6);
        for pair in log.chunks(2) {
            assert_eq!(pair, ["will", "did"]);
        }
        assert_eq!(store.len(), 2);
    }
}
