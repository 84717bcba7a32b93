//! OpenAI Whisper transcription

use async_trait::async_trait;
use serde::Deserialize;

use roundtable_config::TranscribeSettings;

use crate::{TranscribeError, Transcriber};

const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const MODEL: &str = "whisper-1";

#[derive(Debug, Deserialize)]
struct WhisperResponse {
    text: Option<String>,
}

/// Whisper-backed transcriber (multipart upload)
#[derive(Debug)]
pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: String, settings: &TranscribeSettings) -> Result<Self, TranscribeError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            url: TRANSCRIPTIONS_URL.to_string(),
        })
    }

    /// Point requests at a different endpoint (tests, proxies).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, TranscribeError> {
        let mime = if mime_type.is_empty() {
            "audio/webm"
        } else {
            mime_type
        };

        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("session.webm")
            .mime_str(mime)
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", MODEL)
            .text("temperature", "0")
            .text("response_format", "json");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "whisper transcription failed");
            return Err(TranscribeError::RequestFailed(status.as_u16()));
        }

        let body: WhisperResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::MalformedResponse(e.to_string()))?;

        match body.text {
            Some(text) => Ok(text.trim().to_string()),
            None => Err(TranscribeError::MalformedResponse(
                "response carried no text field".to_string(),
            )),
        }
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
