//! Configuration management
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `ROUNDTABLE_*` environment variables. Secrets (provider API keys) are only
//! ever read from the environment.

mod settings;

pub use settings::{
    RuntimeEnvironment, SessionSettings, Settings, TranscribeProvider, TranscribeSettings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
