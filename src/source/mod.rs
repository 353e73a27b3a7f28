//! Backing-data owners: anything the host can pull a snapshot from.
//!
//! [`Store`] is an in-memory owner with query filtering. The
//! [`ChangeSourceAdapter`] bridges an external, coarse-grained change tracker
//! (a persistence layer's "content changed" notifications plus paged fetches)
//! onto the same contract.

mod adapter;
mod store;

use thiserror::Error;

use crate::snapshot::{Snapshot, SnapshotError};

pub use adapter::{
    ChangeSource, ChangeSourceAdapter, Page, PageRequest, RecordMapping, SourceEvent,
};
pub use store::{Store, StoreBatch, StoreOptions};

/// Failures reported by an external change source.
///
/// The core never retries; retry policy belongs to the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeSourceError {
    #[error("Change source refresh failed: {message}")]
    Refresh { message: String },

    #[error("Failed to fetch page at offset {offset}: {message}")]
    Page { offset: usize, message: String },

    #[error("Change source disconnected")]
    Disconnected,
}

/// Why a snapshot could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The source failed; the previously applied snapshot stays current.
    #[error(transparent)]
    Source(#[from] ChangeSourceError),

    /// The producer built a malformed snapshot. Fatal for the list.
    #[error(transparent)]
    Invalid(#[from] SnapshotError),
}

/// Pull side of the host boundary.
pub trait SnapshotProvider<S, I, P>: Send + Sync {
    fn current_snapshot(&self) -> Result<Snapshot<S, I, P>, ProviderError>;
}
