//! Shared types, error model, and configuration for askglean.
//!
//! This crate is the foundation depended on by all other askglean crates.
//! It provides:
//! - [`AskGleanError`] — the unified error type
//! - Domain types ([`QuestionRecord`], [`AnswerResponse`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CliOverrides, DefaultsConfig, GleanConfig, RunConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{AskGleanError, Result};
pub use types::{AnswerResponse, CSV_HEADERS, DATETIME_FORMAT, LIST_DELIMITER, QuestionRecord};
