//! Debounced, cancellable query filtering.
//!
//! Rapid query edits collapse into one filter application after the input
//! pauses for the configured delay. Clearing the query applies immediately.
//! A generation counter, read and bumped under one lock, makes cancelling a
//! pending application and running it mutually exclusive.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::DebounceConfig;

/// Filter criterion handed to the backing-data owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Query {
    /// No filter: show everything.
    #[default]
    All,
    /// Trimmed, non-empty query text.
    Matching(String),
}

impl Query {
    /// Trim `text`; blank input means no filter.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self::All
        } else {
            Self::Matching(trimmed.to_string())
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Matching(text) => Some(text),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Receives filter applications.
///
/// Implementations recompute the visible subset inside one
/// `will_change`/`did_change` cycle.
///
/// `apply_query` runs with the debouncer's state locked. It must not call
/// back into the [`QueryDebouncer`] that drives it (`set_query`, `cancel`,
/// `is_pending`), or it deadlocks.
pub trait QueryTarget: Send + Sync + 'static {
    fn apply_query(&self, query: Query);
}

/// Coalesces query edits into at most one pending filter application.
///
/// Dropping the debouncer cancels whatever is pending.
pub struct QueryDebouncer<T: QueryTarget> {
    inner: Arc<DebounceInner<T>>,
}

struct DebounceInner<T> {
    target: Arc<T>,
    delay: Duration,
    runtime: Handle,
    state: Mutex<DebounceState>,
}

#[derive(Default)]
struct DebounceState {
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl<T: QueryTarget> QueryDebouncer<T> {
    /// Delayed applications are spawned on `runtime`.
    pub fn new(target: Arc<T>, delay: Duration, runtime: Handle) -> Self {
        Self {
            inner: Arc::new(DebounceInner {
                target,
                delay,
                runtime,
                state: Mutex::new(DebounceState::default()),
            }),
        }
    }

    pub fn from_config(target: Arc<T>, config: &DebounceConfig, runtime: Handle) -> Self {
        Self::new(target, config.delay(), runtime)
    }

    /// Record new query text.
    ///
    /// Any pending application is cancelled. Blank text applies
    /// [`Query::All`] right away; anything else is applied after the delay
    /// unless another call preempts it first.
    pub fn set_query(&self, text: &str) {
        let query = Query::from_text(text);
        let mut state = self.inner.state.lock();
        state.generation = state.generation.wrapping_add(1);
        if let Some(pending) = state.pending.take() {
            pending.abort();
            tracing::trace!(generation = state.generation, "Superseded pending query");
        }

        if query.is_all() {
            self.inner.target.apply_query(query);
            return;
        }

        let generation = state.generation;
        let inner = Arc::clone(&self.inner);
        state.pending = Some(self.inner.runtime.spawn(async move {
            tokio::time::sleep(inner.delay).await;
            inner.fire(generation, query);
        }));
    }

    /// Drop any pending application without applying anything.
    pub fn cancel(&self) {
        let mut state = self.inner.state.lock();
        state.generation = state.generation.wrapping_add(1);
        if let Some(pending) = state.pending.take() {
            pending.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.inner
            .state
            .lock()
            .pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl<T> DebounceInner<T>
where
    T: QueryTarget,
{
    fn fire(&self, generation: u64, query: Query) {
        let mut state = self.state.lock();
        if state.generation != generation {
            tracing::trace!(generation, current = state.generation, "Dropping superseded query");
            return;
        }
        state.pending = None;
        tracing::debug!(query = ?query, "Applying debounced query");
        self.target.apply_query(query);
    }
}

impl<T: QueryTarget> Drop for QueryDebouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        applied: Mutex<Vec<Query>>,
    }

    impl QueryTarget for Recorder {
        fn apply_query(&self, query: Query) {
            self.applied.lock().push(query);
        }
    }

    fn debouncer(target: &Arc<Recorder>) -> QueryDebouncer<Recorder> {
        QueryDebouncer::new(Arc::clone(target), Duration::from_millis(250), Handle::current())
    }

    #[test]
    fn query_from_text_trims() {
        assert_eq!(Query::from_text("  ab "), Query::Matching("ab".to_string()));
        assert_eq!(Query::from_text(" \t"), Query::All);
        assert_eq!(Query::from_text("x").text(), Some("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_apply_once_with_latest_text() {
        let target = Arc::new(Recorder::default());
        let debouncer = debouncer(&target);

        debouncer.set_query("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.set_query("ab");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.set_query("abc");
        assert!(target.applied.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(*target.applied.lock(), vec![Query::Matching("abc".to_string())]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_query_applies_immediately_and_cancels_pending() {
        let target = Arc::new(Recorder::default());
        let debouncer = debouncer(&target);

        debouncer.set_query("abc");
        debouncer.set_query("   ");
        assert_eq!(*target.applied.lock(), vec![Query::All]);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*target.applied.lock(), vec![Query::All]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_pending_query() {
        let target = Arc::new(Recorder::default());
        let debouncer = debouncer(&target);

        debouncer.set_query("bob");
        assert!(debouncer.is_pending());
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(target.applied.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_edits_each_apply() {
        let target = Arc::new(Recorder::default());
        let debouncer = debouncer(&target);

        debouncer.set_query("a");
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.set_query("b");
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(
            *target.applied.lock(),
            vec![
                Query::Matching("a".to_string()),
                Query::Matching("b".to_string())
            ]
        );
    }
}
