use thiserror::Error;

use crate::identity::Identity;
use crate::reconcile::ScriptStats;
use crate::selection::SelectionState;
use crate::snapshot::SnapshotError;
use crate::source::ChangeSourceError;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport<I: Identity> {
    /// 1-based pass counter.
    pub pass: u64,
    pub stats: ScriptStats,
    /// Selection after restoration.
    pub selection: SelectionState<I>,
    /// Extra change pairs folded into this pass.
    pub coalesced: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent<I: Identity> {
    Applied(PassReport<I>),
    SourceFailed(ChangeSourceError),
    Rejected(SnapshotError),
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Rejected malformed snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}
