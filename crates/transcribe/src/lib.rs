//! Speech transcription providers
//!
//! The session core consumes transcription through the `Transcriber` trait:
//! opaque audio bytes in, plain text out. Two remote providers are shipped
//! (OpenAI Whisper and Gemini); selection mirrors the configured preference
//! and falls back to whichever credential is present.
//!
//! Callers must never hold more than one request in flight per session; the
//! pump enforces that, providers just bound each request with the configured
//! timeout.

mod gemini;
mod openai;

pub use gemini::GeminiTranscriber;
pub use openai::WhisperTranscriber;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use roundtable_config::{TranscribeProvider, TranscribeSettings};

/// Transcription errors
#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("no transcription provider configured")]
    ProviderUnavailable,

    #[error("transcription request failed with status {0}")]
    RequestFailed(u16),

    #[error("audio payload of {bytes} bytes exceeds the {max} byte limit")]
    TooLarge { bytes: u64, max: u64 },

    #[error("unsupported audio type: {0}")]
    UnsupportedMime(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for TranscribeError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TranscribeError::RequestFailed(status.as_u16())
        } else {
            TranscribeError::Transport(err.to_string())
        }
    }
}

/// Transcription capability
///
/// Implementations return the verbatim transcript; blank output means the
/// audio contained no usable speech and is not an error.
#[async_trait]
pub trait Transcriber: Send + Sync + std::fmt::Debug + 'static {
    /// Transcribe a single audio payload
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, TranscribeError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}

const ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/webm",
    "audio/ogg",
    "audio/mpeg",
    "audio/wav",
    "audio/mp4",
    "audio/x-m4a",
    "audio/aac",
    "audio/mp3",
];

/// Reject payloads the providers would bounce anyway (too large, or a mime
/// type outside the allowed audio set). An empty mime type is let through;
/// some capture sources do not report one.
pub fn validate_payload(
    audio: &[u8],
    mime_type: &str,
    settings: &TranscribeSettings,
) -> Result<(), TranscribeError> {
    let bytes = audio.len() as u64;
    if bytes > settings.max_bytes() {
        return Err(TranscribeError::TooLarge {
            bytes,
            max: settings.max_bytes(),
        });
    }

    if !mime_type.is_empty() && !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(TranscribeError::UnsupportedMime(mime_type.to_string()));
    }

    Ok(())
}

/// Build a transcriber from settings.
///
/// Preference order mirrors the configuration: the preferred provider wins
/// when its credential is present, otherwise whichever credential exists is
/// used. No credential (or transcription disabled) is `ProviderUnavailable`;
/// the session still runs, audio is captured but never flushed usefully.
pub fn transcriber_from_settings(
    settings: &TranscribeSettings,
) -> Result<Arc<dyn Transcriber>, TranscribeError> {
    if !settings.enabled {
        return Err(TranscribeError::ProviderUnavailable);
    }

    let prefer_openai = settings.provider == TranscribeProvider::OpenAi;

    if prefer_openai {
        if let Some(key) = &settings.openai_api_key {
            return Ok(Arc::new(WhisperTranscriber::new(key.clone(), settings)?));
        }
    }
    if let Some(key) = &settings.gemini_api_key {
        return Ok(Arc::new(GeminiTranscriber::new(key.clone(), settings)?));
    }
    if let Some(key) = &settings.openai_api_key {
        return Ok(Arc::new(WhisperTranscriber::new(key.clone(), settings)?));
    }

    Err(TranscribeError::ProviderUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> TranscribeSettings {
        TranscribeSettings {
            enabled: true,
            provider: TranscribeProvider::Gemini,
            openai_api_key: None,
            gemini_api_key: None,
            max_mb: 1,
            timeout_ms: 5000,
            mime_type: "audio/webm".to_string(),
        }
    }

    #[test]
    fn test_validate_rejects_oversized_payload() {
        let payload = vec![0u8; 2 * 1024 * 1024];
        let err = validate_payload(&payload, "audio/webm", &settings()).unwrap_err();
        assert!(matches!(err, TranscribeError::TooLarge { .. }));
    }

    #[test]
    fn test_validate_rejects_unknown_mime() {
        let err = validate_payload(b"abc", "video/mp4", &settings()).unwrap_err();
        assert!(matches!(err, TranscribeError::UnsupportedMime(_)));
    }

    #[test]
    fn test_validate_allows_empty_mime() {
        assert!(validate_payload(b"abc", "", &settings()).is_ok());
    }

    #[test]
    fn test_factory_without_credentials() {
        let err = transcriber_from_settings(&settings()).unwrap_err();
        assert!(matches!(err, TranscribeError::ProviderUnavailable));
    }

    #[test]
    fn test_factory_disabled() {
        let mut s = settings();
        s.enabled = false;
        s.gemini_api_key = Some("key".to_string());
        let err = transcriber_from_settings(&s).unwrap_err();
        assert!(matches!(err, TranscribeError::ProviderUnavailable));
    }

    #[test]
    fn test_factory_prefers_configured_provider() {
        let mut s = settings();
        s.provider = TranscribeProvider::OpenAi;
        s.openai_api_key = Some("sk-test".to_string());
        s.gemini_api_key = Some("g-test".to_string());
        let t = transcriber_from_settings(&s).unwrap();
        assert_eq!(t.provider_name(), "openai");
    }

    #[test]
    fn test_factory_falls_back_to_available_credential() {
        let mut s = settings();
        s.provider = TranscribeProvider::Gemini;
        s.openai_api_key = Some("sk-test".to_string());
        let t = transcriber_from_settings(&s).unwrap();
        assert_eq!(t.provider_name(), "openai");
    }
}
