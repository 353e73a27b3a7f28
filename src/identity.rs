//! Identity and payload bounds shared by every list type.
//!
//! An identity is the only thing used to match sections and items across
//! snapshots. It must denote the same logical item for its whole lifetime and
//! must never be derived from a position.

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for section and item identities.
///
/// Implemented for every type that is cheap to compare and hash, such as
/// database row keys, UUIDs or interned strings.
pub trait Identity: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Identity for T where T: Clone + Eq + Hash + Debug + Send + Sync + 'static {}

/// Marker trait for row payloads.
///
/// Payload equality decides whether a surviving item is reported as updated.
/// It never decides whether an item is present.
pub trait Payload: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T> Payload for T where T: Clone + PartialEq + Debug + Send + Sync + 'static {}
