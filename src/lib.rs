//! Keeps an independently changing backing collection in sync with a
//! displayed ordered, sectioned list.
//!
//! The owner of the data announces changes through a [`ChangeNotifier`]. A
//! [`ListHost`] turns each announced change into one reconciliation pass:
//! pull a [`Snapshot`], diff it against the applied one with [`reconcile`],
//! hand the [`EditScript`] to a [`ListSurface`] and restore selection by
//! identity. Query edits go through a [`QueryDebouncer`].

pub mod config;
pub mod debounce;
pub mod host;
pub mod identity;
pub mod logging;
pub mod notify;
pub mod reconcile;
pub mod selection;
pub mod snapshot;
pub mod source;
pub mod surface;

pub use config::{Config, ConfigError};
pub use debounce::{Query, QueryDebouncer, QueryTarget};
pub use host::{HostError, HostEvent, ListHost, PassReport};
pub use identity::{Identity, Payload};
pub use notify::{change_channel, ChangeNotifier, ChangeNotifierExt, ChangeReceiver, ChangeSender, ChangeSignal};
pub use reconcile::{reconcile, EditScript, ItemChange, ItemPosition, ScriptStats, SectionChange};
pub use selection::{capture, restore, SelectionSource, SelectionState};
pub use snapshot::{Item, Section, Sectioning, Snapshot, SnapshotBuilder, SnapshotError};
pub use source::{
    ChangeSource, ChangeSourceAdapter, ChangeSourceError, Page, PageRequest, ProviderError,
    RecordMapping, SnapshotProvider, SourceEvent, Store, StoreOptions,
};
pub use surface::{ListSurface, MirrorSurface};
