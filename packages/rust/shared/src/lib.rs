//! Shared types, error model, and configuration for the guidebook converter.
//!
//! This crate is the foundation depended on by all other guidebook crates.
//! It provides:
//! - [`GuidebookError`] — the unified error type
//! - Domain types ([`LessonId`], [`LessonRange`], [`LessonOutcome`], [`FailureReason`])
//! - Configuration ([`AppConfig`], [`FetchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BatchDefaults, FetchConfig, FetchSection, PageDefaults, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{GuidebookError, Result};
pub use types::{BatchResultSet, FailureReason, LessonId, LessonOutcome, LessonRange};
