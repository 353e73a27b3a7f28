//! Immutable ordered, sectioned list snapshots.
//!
//! A snapshot is produced on demand by whoever owns the data, after a
//! `did_change` signal, and compared whole against the previously applied
//! one. It is never mutated after construction.

mod builder;
mod grouping;
mod types;

pub use builder::SnapshotBuilder;
pub use grouping::{SectionComparator, Sectioning};
pub use types::{Item, ItemLocation, Section, Snapshot, SnapshotError};
