pub mod loader;
pub mod types;

pub use loader::ConfigError;
pub use types::{
    Config, DebounceConfig, SectioningMode, SourceConfig, DEFAULT_DELAY_MS, DEFAULT_PAGE_SIZE,
    MAX_DELAY_MS,
};
