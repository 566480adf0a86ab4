//! Shared types, error model, region table, and configuration for pagestack.
//!
//! This crate is the foundation depended on by all other pagestack crates.
//! It provides:
//! - [`PagestackError`] — the unified error type
//! - Region resolution ([`Region`], [`Endpoints`], [`region_for_str`])
//! - Stack configuration ([`StackConfig`], [`AppConfig`], config loading)
//! - Domain types ([`Entry`], [`LivePreviewQuery`])

pub mod config;
pub mod error;
pub mod region;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ConfigSource, HttpConfig, LivePreviewSettings, ProcessEnv, RegionSetting,
    StackConfig, StackSettings, config_dir, config_file_path, init_config, load_config,
    load_config_from, resolve_stack_config, vars,
};
pub use error::{PagestackError, Result};
pub use region::{EndpointStyle, Endpoints, Region, endpoints_for, region_for_str, resolve_endpoints};
pub use types::{EDITABLE_TAGS_KEY, Entry, LivePreviewQuery, PAGE_CONTENT_TYPE, PAGE_URL_FIELD};
