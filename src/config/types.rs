use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::snapshot::Sectioning;

/// Query debounce delay in milliseconds when none is configured.
pub const DEFAULT_DELAY_MS: u64 = 250;
/// Upper bound accepted for the debounce delay.
pub const MAX_DELAY_MS: u64 = 60_000;
/// Records requested per page from a change source.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub debounce: DebounceConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Query debouncing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period before a query is applied (default: 250).
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl DebounceConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Change source paging and section ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Records per fetched page (default: 100).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How sections are ordered (default: "source_order").
    #[serde(default)]
    pub sectioning: SectioningMode,
}

/// Configurable form of [`Sectioning`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectioningMode {
    /// Sections in order of first appearance in the source.
    #[default]
    SourceOrder,
    /// Sections sorted by their identity's natural order.
    Sorted,
}

impl SectioningMode {
    pub fn sectioning<S: Identity + Ord>(self) -> Sectioning<S> {
        match self {
            Self::SourceOrder => Sectioning::SourceOrder,
            Self::Sorted => Sectioning::natural(),
        }
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_DELAY_MS
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sectioning: SectioningMode::default(),
        }
    }
}
