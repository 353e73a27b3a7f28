use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::config::{SourceConfig, DEFAULT_PAGE_SIZE};
use crate::identity::{Identity, Payload};
use crate::notify::ChangeNotifier;
use crate::snapshot::{Sectioning, Snapshot};

use super::{ChangeSourceError, ProviderError, SnapshotProvider};

/// Coarse-grained events from an external change tracker.
///
/// One `WillChange`/`DidChange` pair covers a whole batch of underlying
/// mutations; no per-item detail is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    WillChange,
    DidChange,
    Failed(ChangeSourceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub records: Vec<R>,
    pub has_more: bool,
}

/// An external store whose contents can be fetched page by page.
pub trait ChangeSource: Send + Sync {
    type Record;

    fn fetch_page(&self, request: PageRequest) -> Result<Page<Self::Record>, ChangeSourceError>;
}

/// Extracts identity, section key and payload from a source record.
pub struct RecordMapping<R, S, I, P> {
    identity: Arc<dyn Fn(&R) -> I + Send + Sync>,
    section: Arc<dyn Fn(&R) -> S + Send + Sync>,
    payload: Arc<dyn Fn(&R) -> P + Send + Sync>,
}

impl<R, S, I, P> RecordMapping<R, S, I, P> {
    pub fn new(
        identity: impl Fn(&R) -> I + Send + Sync + 'static,
        section: impl Fn(&R) -> S + Send + Sync + 'static,
        payload: impl Fn(&R) -> P + Send + Sync + 'static,
    ) -> Self {
        Self {
            identity: Arc::new(identity),
            section: Arc::new(section),
            payload: Arc::new(payload),
        }
    }

    fn map(&self, record: &R) -> (S, I, P) {
        (
            (self.section)(record),
            (self.identity)(record),
            (self.payload)(record),
        )
    }
}

/// Bridges a [`ChangeSource`] onto the [`ChangeNotifier`] contract and
/// turns its paged result set into snapshots.
///
/// The event stream is normalised so the notifier always sees strict
/// will/did pairs: a repeated `WillChange` is absorbed, a `DidChange` with no
/// open change gets a synthesised `will_change` first, and a failure closes
/// any open change after reporting it.
pub struct ChangeSourceAdapter<C: ChangeSource, S, I, P> {
    source: C,
    mapping: RecordMapping<C::Record, S, I, P>,
    sectioning: Sectioning<S>,
    page_size: usize,
    notifier: Arc<dyn ChangeNotifier>,
    in_change: Mutex<bool>,
}

impl<C, S, I, P> ChangeSourceAdapter<C, S, I, P>
where
    C: ChangeSource,
    S: Identity,
    I: Identity,
    P: Payload,
{
    pub fn new(
        source: C,
        mapping: RecordMapping<C::Record, S, I, P>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self {
            source,
            mapping,
            sectioning: Sectioning::SourceOrder,
            page_size: DEFAULT_PAGE_SIZE,
            notifier,
            in_change: Mutex::new(false),
        }
    }

    pub fn with_sectioning(mut self, sectioning: Sectioning<S>) -> Self {
        self.sectioning = sectioning;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Page size from config; sectioning stays as set.
    pub fn with_config(self, config: &SourceConfig) -> Self {
        self.with_page_size(config.page_size)
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Translate one source event into notifier calls.
    pub fn handle_event(&self, event: SourceEvent) {
        let mut in_change = self.in_change.lock();
        match event {
            SourceEvent::WillChange => {
                if *in_change {
                    tracing::debug!("Absorbing repeated will-change from source");
                    return;
                }
                *in_change = true;
                self.notifier.will_change();
            }
            SourceEvent::DidChange => {
                if !*in_change {
                    tracing::debug!("Source reported did-change without will-change");
                    self.notifier.will_change();
                }
                *in_change = false;
                self.notifier.did_change();
            }
            SourceEvent::Failed(error) => {
                tracing::warn!(error = %error, "Change source reported failure");
                self.notifier.source_failed(error);
                if *in_change {
                    *in_change = false;
                    self.notifier.did_change();
                }
            }
        }
    }

    /// Forward events until the source side of the channel closes.
    pub async fn forward(&self, mut events: mpsc::UnboundedReceiver<SourceEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        tracing::debug!("Change source event stream closed");
    }

    /// Fetch the complete result set, following pages until exhausted.
    pub fn fetch_all(&self) -> Result<Vec<C::Record>, ChangeSourceError> {
        let mut records = Vec::new();
        let mut pages = 0usize;
        loop {
            let page = self.source.fetch_page(PageRequest {
                offset: records.len(),
                limit: self.page_size,
            })?;
            pages += 1;
            let fetched = page.records.len();
            records.extend(page.records);
            if !page.has_more || fetched == 0 {
                break;
            }
        }
        tracing::trace!(pages, records = records.len(), "Fetched change source contents");
        Ok(records)
    }
}

impl<C, S, I, P> SnapshotProvider<S, I, P> for ChangeSourceAdapter<C, S, I, P>
where
    C: ChangeSource,
    S: Identity,
    I: Identity,
    P: Payload,
{
    fn current_snapshot(&self) -> Result<Snapshot<S, I, P>, ProviderError> {
        let records = self.fetch_all()?;
        let snapshot = self
            .sectioning
            .group(records.iter().map(|record| self.mapping.map(record)))?;
        Ok(snapshot)
    }
}
