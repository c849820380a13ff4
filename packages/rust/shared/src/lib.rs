//! Shared types, error model, and configuration for postweave.
//!
//! This crate is the foundation depended on by all other postweave crates.
//! It provides:
//! - [`PostweaveError`], the unified error type
//! - The corpus data model ([`Post`])
//! - Configuration ([`AppConfig`], [`RelatedConfig`], [`LinkingConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, LinkingConfig, RelatedConfig, TitleTemplate, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{PostweaveError, Result};
pub use types::{DATE_FORMAT, Post};
