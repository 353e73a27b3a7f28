//! The single update context of one displayed list.
//!
//! [`ListHost`] is the only consumer of a list's change signals. It captures
//! selection on `will_change`, and on `did_change` pulls a snapshot, applies
//! the reconciled edit script to the surface and restores selection, all
//! before looking at the next signal.

mod types;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::identity::{Identity, Payload};
use crate::notify::{ChangeReceiver, ChangeSignal};
use crate::reconcile::reconcile;
use crate::selection::{capture, restore, SelectionState};
use crate::snapshot::Snapshot;
use crate::source::{ChangeSourceError, ProviderError, SnapshotProvider};
use crate::surface::ListSurface;

pub use types::{HostError, HostEvent, PassReport};

enum Phase<I: Identity> {
    Idle,
    /// Between `will_change` and `did_change`.
    Changing { captured: SelectionState<I> },
    /// A `did_change` arrived; a pass is due.
    Ready { captured: SelectionState<I> },
}

pub struct ListHost<S: Identity, I: Identity, P: Payload> {
    receiver: ChangeReceiver,
    provider: Arc<dyn SnapshotProvider<S, I, P>>,
    applied: Snapshot<S, I, P>,
    phase: Phase<I>,
    coalesced: usize,
    passes: u64,
    subscribers: Vec<mpsc::UnboundedSender<HostEvent<I>>>,
}

impl<S: Identity, I: Identity, P: Payload> ListHost<S, I, P> {
    /// Start from an empty applied snapshot.
    pub fn new(receiver: ChangeReceiver, provider: Arc<dyn SnapshotProvider<S, I, P>>) -> Self {
        Self {
            receiver,
            provider,
            applied: Snapshot::empty(),
            phase: Phase::Idle,
            coalesced: 0,
            passes: 0,
            subscribers: Vec::new(),
        }
    }

    /// Receive every [`HostEvent`] from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<HostEvent<I>> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.push(sender);
        receiver
    }

    /// The snapshot the surface currently shows.
    pub fn applied(&self) -> &Snapshot<S, I, P> {
        &self.applied
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// True while a `will_change` awaits its `did_change`.
    pub fn is_changing(&self) -> bool {
        matches!(self.phase, Phase::Changing { .. })
    }

    /// Pull the first snapshot and show it.
    pub fn load<L>(&mut self, surface: &mut L) -> Result<Option<PassReport<I>>, HostError>
    where
        L: ListSurface<S, I, P> + ?Sized,
    {
        let captured = capture(&*surface);
        self.run_pass(captured, surface)
    }

    /// Process signals until every sender is gone.
    ///
    /// Returns an error only for a malformed snapshot, after which the list
    /// can no longer be trusted.
    pub async fn run<L>(mut self, surface: &mut L) -> Result<(), HostError>
    where
        L: ListSurface<S, I, P> + ?Sized,
    {
        while let Some(signal) = self.receiver.recv().await {
            self.process(signal, surface)?;
        }
        if !matches!(self.phase, Phase::Idle) {
            tracing::debug!("Change channel closed with a change still open");
        }
        tracing::debug!(passes = self.passes, "List host stopped");
        Ok(())
    }

    /// Handle one signal, coalescing whatever is already queued behind it.
    ///
    /// Returns the report of the pass this signal triggered, if any.
    pub fn process<L>(
        &mut self,
        signal: ChangeSignal,
        surface: &mut L,
    ) -> Result<Option<PassReport<I>>, HostError>
    where
        L: ListSurface<S, I, P> + ?Sized,
    {
        self.transition(signal, surface);
        if !matches!(self.phase, Phase::Ready { .. }) {
            return Ok(None);
        }

        while let Some(queued) = self.receiver.try_recv() {
            self.transition(queued, surface);
        }

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Ready { captured } => self.run_pass(captured, surface),
            Phase::Changing { captured } => {
                tracing::debug!("Deferring pass to the next did_change");
                self.phase = Phase::Changing { captured };
                Ok(None)
            }
            Phase::Idle => Ok(None),
        }
    }

    /// Handle every signal already queued, without waiting.
    ///
    /// Returns the number of passes run.
    pub fn process_pending<L>(&mut self, surface: &mut L) -> Result<usize, HostError>
    where
        L: ListSurface<S, I, P> + ?Sized,
    {
        let mut passes = 0;
        while let Some(signal) = self.receiver.try_recv() {
            if self.process(signal, surface)?.is_some() {
                passes += 1;
            }
        }
        Ok(passes)
    }

    fn transition<L>(&mut self, signal: ChangeSignal, surface: &L)
    where
        L: ListSurface<S, I, P> + ?Sized,
    {
        self.phase = match (std::mem::replace(&mut self.phase, Phase::Idle), signal) {
            (Phase::Idle, ChangeSignal::WillChange) => Phase::Changing {
                captured: capture(surface),
            },
            (Phase::Changing { .. }, ChangeSignal::WillChange) => {
                tracing::debug!("Coalescing repeated will_change, recapturing selection");
                Phase::Changing {
                    captured: capture(surface),
                }
            }
            (Phase::Ready { .. }, ChangeSignal::WillChange) => {
                self.coalesced += 1;
                Phase::Changing {
                    captured: capture(surface),
                }
            }
            (Phase::Idle, ChangeSignal::DidChange) => {
                tracing::debug!("did_change without will_change, capturing selection now");
                Phase::Ready {
                    captured: capture(surface),
                }
            }
            (Phase::Changing { captured }, ChangeSignal::DidChange) => Phase::Ready { captured },
            (Phase::Ready { captured }, ChangeSignal::DidChange) => {
                self.coalesced += 1;
                Phase::Ready { captured }
            }
            (phase, ChangeSignal::Failed(error)) => {
                self.report_source_failure(error);
                phase
            }
        };
    }

    fn run_pass<L>(
        &mut self,
        captured: SelectionState<I>,
        surface: &mut L,
    ) -> Result<Option<PassReport<I>>, HostError>
    where
        L: ListSurface<S, I, P> + ?Sized,
    {
        let coalesced = std::mem::take(&mut self.coalesced);
        let next = match self.provider.current_snapshot() {
            Ok(next) => next,
            Err(ProviderError::Source(error)) => {
                self.report_source_failure(error);
                return Ok(None);
            }
            Err(ProviderError::Invalid(error)) => {
                tracing::error!(error = %error, "Rejecting malformed snapshot");
                self.emit(HostEvent::Rejected(error.clone()));
                return Err(HostError::InvalidSnapshot(error));
            }
        };

        let script = reconcile(&self.applied, &next);
        surface.apply(&script);
        let selection = restore(&captured, &next);
        surface.select(&selection);
        self.applied = next;
        self.passes += 1;

        let stats = script.stats();
        tracing::info!(
            pass = self.passes,
            sections_inserted = stats.sections_inserted,
            sections_removed = stats.sections_removed,
            sections_moved = stats.sections_moved,
            items_inserted = stats.items_inserted,
            items_removed = stats.items_removed,
            items_moved = stats.items_moved,
            items_updated = stats.items_updated,
            selected = selection.len(),
            coalesced,
            "Applied list update"
        );

        let report = PassReport {
            pass: self.passes,
            stats,
            selection,
            coalesced,
        };
        self.emit(HostEvent::Applied(report.clone()));
        Ok(Some(report))
    }

    fn report_source_failure(&mut self, error: ChangeSourceError) {
        tracing::warn!(error = %error, "Change source failed, keeping applied snapshot");
        self.emit(HostEvent::SourceFailed(error));
    }

    fn emit(&mut self, event: HostEvent<I>) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}
