//! Main settings module

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use roundtable_core::DifficultyTier;

use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Session timing configuration
    #[serde(default)]
    pub session: SessionSettings,

    /// Transcription provider configuration
    #[serde(default)]
    pub transcription: TranscribeSettings,
}

/// Session timing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Default difficulty tier
    #[serde(default)]
    pub difficulty: DifficultyTier,

    /// Warm-up delay before the opening agent greeting (ms)
    #[serde(default = "default_greeting_delay_ms")]
    pub greeting_delay_ms: u64,

    /// Interval between capture-buffer flushes (ms)
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Minimum flushed-audio size worth transcribing (bytes)
    #[serde(default = "default_min_flush_bytes")]
    pub min_flush_bytes: usize,

    /// Upper bound of the random addend on the response delay (ms)
    #[serde(default = "default_response_jitter_ms")]
    pub response_jitter_ms: u64,
}

fn default_greeting_delay_ms() -> u64 {
    2000
}

fn default_flush_interval_ms() -> u64 {
    4000
}

fn default_min_flush_bytes() -> usize {
    2048
}

fn default_response_jitter_ms() -> u64 {
    2000
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyTier::default(),
            greeting_delay_ms: default_greeting_delay_ms(),
            flush_interval_ms: default_flush_interval_ms(),
            min_flush_bytes: default_min_flush_bytes(),
            response_jitter_ms: default_response_jitter_ms(),
        }
    }
}

impl SessionSettings {
    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms)
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }

    pub fn response_jitter(&self) -> Duration {
        Duration::from_millis(self.response_jitter_ms)
    }
}

/// Transcription provider preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranscribeProvider {
    #[default]
    Gemini,
    OpenAi,
}

/// Transcription configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeSettings {
    /// Master switch; when false the pump is never started
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Preferred provider when both credentials are present
    #[serde(default)]
    pub provider: TranscribeProvider,

    /// OpenAI API key (environment only)
    #[serde(default = "env_openai_key", skip_serializing)]
    pub openai_api_key: Option<String>,

    /// Gemini API key (environment only)
    #[serde(default = "env_gemini_key", skip_serializing)]
    pub gemini_api_key: Option<String>,

    /// Maximum upload size in megabytes
    #[serde(default = "default_max_mb")]
    pub max_mb: u64,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Mime type of the captured audio
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

fn default_true() -> bool {
    true
}

fn env_openai_key() -> Option<String> {
    std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty())
}

fn env_gemini_key() -> Option<String> {
    std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())
}

fn default_max_mb() -> u64 {
    25
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_mime_type() -> String {
    "audio/webm".to_string()
}

impl Default for TranscribeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: TranscribeProvider::default(),
            openai_api_key: env_openai_key(),
            gemini_api_key: env_gemini_key(),
            max_mb: default_max_mb(),
            timeout_ms: default_timeout_ms(),
            mime_type: default_mime_type(),
        }
    }
}

impl TranscribeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_mb * 1024 * 1024
    }

    /// Whether any provider credential is configured.
    pub fn has_provider(&self) -> bool {
        self.openai_api_key.is_some() || self.gemini_api_key.is_some()
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from an optional TOML file plus `ROUNDTABLE_*`
    /// environment variables (e.g. `ROUNDTABLE_SESSION__FLUSH_INTERVAL_MS`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix("ROUNDTABLE").separator("__"))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session.flush_interval_ms < 500 {
            return Err(ConfigError::InvalidValue {
                field: "session.flush_interval_ms".to_string(),
                message: "flush interval below 500ms would flood the provider".to_string(),
            });
        }

        if self.session.min_flush_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.min_flush_bytes".to_string(),
                message: "threshold of zero would transcribe empty buffers".to_string(),
            });
        }

        if self.transcription.max_mb == 0 {
            return Err(ConfigError::InvalidValue {
                field: "transcription.max_mb".to_string(),
                message: "upload cap must be at least 1 MB".to_string(),
            });
        }

        if self.transcription.timeout_ms < 1000 {
            return Err(ConfigError::InvalidValue {
                field: "transcription.timeout_ms".to_string(),
                message: "timeout below 1s cannot cover a transcription round trip".to_string(),
            });
        }

        if self.transcription.enabled && !self.transcription.has_provider() {
            if self.environment.is_production() {
                return Err(ConfigError::InvalidValue {
                    field: "transcription".to_string(),
                    message: "no provider key configured \
                              (set OPENAI_API_KEY or GEMINI_API_KEY)"
                        .to_string(),
                });
            }
            // In development this is not fatal: capture still runs, the
            // pump just never starts.
            tracing::warn!(
                "transcription enabled but no provider key configured \
                 (set OPENAI_API_KEY or GEMINI_API_KEY)"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::new();
        assert_eq!(settings.session.flush_interval_ms, 4000);
        assert_eq!(settings.session.min_flush_bytes, 2048);
        assert_eq!(settings.session.greeting_delay_ms, 2000);
        assert_eq!(settings.session.response_jitter_ms, 2000);
        assert_eq!(settings.transcription.max_mb, 25);
        assert_eq!(settings.transcription.mime_type, "audio/webm");
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let mut settings = Settings::new();
        settings.session.min_flush_bytes = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_interval() {
        let mut settings = Settings::new();
        settings.session.flush_interval_ms = 100;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_provider_key_fatal_only_in_production() {
        let mut settings = Settings::new();
        settings.transcription.enabled = true;
        settings.transcription.openai_api_key = None;
        settings.transcription.gemini_api_key = None;

        settings.environment = RuntimeEnvironment::Development;
        assert!(settings.validate().is_ok());

        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_err());

        // A configured key satisfies production too.
        settings.transcription.gemini_api_key = Some("key".to_string());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "[session]\ndifficulty = \"hard\"\nflush_interval_ms = 6000\n"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.session.difficulty, DifficultyTier::Hard);
        assert_eq!(settings.session.flush_interval_ms, 6000);
        // untouched fields keep their defaults
        assert_eq!(settings.session.min_flush_bytes, 2048);
    }
}
