//! Two-phase change notification.
//!
//! Whoever owns the backing data announces `will_change` before mutating and
//! `did_change` afterwards. Every `will_change` is followed by exactly one
//! `did_change` before the next `will_change`. Signals may be raised from any
//! thread; [`ChangeSender`] turns them into [`ChangeSignal`] messages so the
//! host can process them on its single update context.

use tokio::sync::mpsc;

use crate::source::ChangeSourceError;

/// Two-phase change announcements from a backing-data owner.
pub trait ChangeNotifier: Send + Sync {
    /// Content is about to change. The host captures selection here.
    fn will_change(&self);

    /// Content changed; the host may pull a fresh snapshot.
    fn did_change(&self);

    /// The backing source failed to refresh. Reported out of band from
    /// `did_change`.
    fn source_failed(&self, error: ChangeSourceError) {
        tracing::warn!(error = %error, "Change source failed with no failure listener");
    }
}

/// Helpers available on every notifier, including trait objects.
pub trait ChangeNotifierExt: ChangeNotifier {
    /// Run `mutate` between a `will_change` and a `did_change`.
    ///
    /// The `did_change` is sent even if `mutate` unwinds.
    fn change<R>(&self, mutate: impl FnOnce() -> R) -> R {
        self.will_change();
        let _announce = scopeguard::guard((), |()| self.did_change());
        mutate()
    }
}

impl<N: ChangeNotifier + ?Sized> ChangeNotifierExt for N {}

/// Message form of a change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSignal {
    WillChange,
    DidChange,
    Failed(ChangeSourceError),
}

/// Cloneable, thread-safe notifier that enqueues signals for one host.
///
/// Sending never blocks, so it is safe from worker threads, I/O callbacks
/// and timers alike.
#[derive(Debug, Clone)]
pub struct ChangeSender {
    sender: mpsc::UnboundedSender<ChangeSignal>,
}

impl ChangeSender {
    pub fn send(&self, signal: ChangeSignal) {
        if self.sender.send(signal).is_err() {
            tracing::trace!("Change signal dropped (host gone)");
        }
    }

    /// True once the receiving host has shut down.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl ChangeNotifier for ChangeSender {
    fn will_change(&self) {
        self.send(ChangeSignal::WillChange);
    }

    fn did_change(&self) {
        self.send(ChangeSignal::DidChange);
    }

    fn source_failed(&self, error: ChangeSourceError) {
        self.send(ChangeSignal::Failed(error));
    }
}

/// Receiving end, owned by exactly one host.
#[derive(Debug)]
pub struct ChangeReceiver {
    receiver: mpsc::UnboundedReceiver<ChangeSignal>,
}

impl ChangeReceiver {
    pub async fn recv(&mut self) -> Option<ChangeSignal> {
        self.receiver.recv().await
    }

    /// Next already-queued signal, without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeSignal> {
        self.receiver.try_recv().ok()
    }
}

/// Create a connected sender/receiver pair for one list.
pub fn change_channel() -> (ChangeSender, ChangeReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (ChangeSender { sender }, ChangeReceiver { receiver })
}
