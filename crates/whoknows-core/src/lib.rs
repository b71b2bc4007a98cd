//! Core types, configuration, and error handling for who-knows-about.
//!
//! This crate provides the shared foundation used by the other crates:
//! - [`WkaError`]: unified error type using `thiserror`
//! - [`WkaConfig`]: configuration loaded from `.whoknows.toml`
//! - Shared types: [`MatchMode`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{IndexConfig, RankingConfig, WkaConfig};
pub use error::WkaError;
pub use types::{MatchMode, OutputFormat};

/// A convenience `Result` type for who-knows-about operations.
pub type Result<T> = std::result::Result<T, WkaError>;
