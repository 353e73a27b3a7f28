//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

use std::sync::Arc;

use listsync::{
    change_channel, ChangeReceiver, ChangeSignal, Snapshot, SnapshotBuilder, Store, StoreOptions,
};
use tempfile::TempDir;
use std::path::PathBuf;

pub type Snap = Snapshot<&'static str, u32, &'static str>;

#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    pub name: String,
    pub online: bool,
}

pub fn contact(name: &str, online: bool) -> Contact {
    Contact {
        name: name.to_string(),
        online,
    }
}

pub type Contacts = Store<&'static str, u32, Contact>;

/// Build a snapshot from `(section, [(id, payload)])` literals.
pub fn snap(sections: &[(&'static str, &[(u32, &'static str)])]) -> Snap {
    let mut builder = SnapshotBuilder::new();
    for (id, items) in sections {
        builder.append_section(*id, items.iter().copied());
    }
    builder.build().expect("fixture snapshot must be valid")
}

/// Contact store sectioned by presence, sorted by name, filtered by a
/// case-insensitive substring match.
pub fn contact_store() -> (Arc<Contacts>, ChangeReceiver) {
    let (sender, receiver) = change_channel();
    let options = StoreOptions::new(|c: &Contact| if c.online { "online" } else { "offline" })
        .with_filter(|c: &Contact, text: &str| c.name.to_lowercase().contains(&text.to_lowercase()))
        .with_order(|a: &Contact, b: &Contact| a.name.cmp(&b.name));
    (Arc::new(Store::new(Arc::new(sender), options)), receiver)
}

/// Every signal already queued on `receiver`.
pub fn drain(receiver: &mut ChangeReceiver) -> Vec<ChangeSignal> {
    std::iter::from_fn(|| receiver.try_recv()).collect()
}

/// Create a temporary config file with the given TOML body.
pub fn temp_config(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("listsync.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
