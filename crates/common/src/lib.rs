//! Shared types, config, and error definitions for the campaign rules bot.

pub mod config;
pub mod error;
pub mod money;
pub mod types;

pub use config::{FilterConfig, RulesConfig};
pub use error::Error;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
