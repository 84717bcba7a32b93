//! Gemini transcription (inline audio)

use async_trait::async_trait;
use base64::Engine;
use serde_json::json;

use roundtable_config::TranscribeSettings;

use crate::{TranscribeError, Transcriber};

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

const PROMPT: &str = "Transcribe the given audio to plain text.\n\
- Output only the verbatim transcript in the original language.\n\
- Do not add timestamps or speaker labels.\n\
- Do not summarize or comment.";

/// Gemini-backed transcriber; audio travels as inline base64 data.
#[derive(Debug)]
pub struct GeminiTranscriber {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl GeminiTranscriber {
    pub fn new(api_key: String, settings: &TranscribeSettings) -> Result<Self, TranscribeError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| TranscribeError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            url: GENERATE_URL.to_string(),
        })
    }

    /// Point requests at a different endpoint (tests, proxies).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    fn extract_text(body: &serde_json::Value) -> Option<String> {
        let parts = body
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .as_array()?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect::<Vec<_>>()
            .join("");

        Some(text)
    }
}

#[async_trait]
impl Transcriber for GeminiTranscriber {
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, TranscribeError> {
        let mime = if mime_type.is_empty() {
            "audio/webm"
        } else {
            mime_type
        };
        let data = base64::engine::general_purpose::STANDARD.encode(audio);

        let body = json!({
            "contents": [{
                "parts": [
                    { "text": PROMPT },
                    { "inline_data": { "mime_type": mime, "data": data } }
                ]
            }]
        });

        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "gemini transcription failed");
            return Err(TranscribeError::RequestFailed(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranscribeError::MalformedResponse(e.to_string()))?;

        match Self::extract_text(&body) {
            Some(text) => Ok(text.trim().to_string()),
            None => Err(TranscribeError::MalformedResponse(
                "response carried no candidate text".to_string(),
            )),
        }
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let body = serde_json::json!({
            "candidates": [{
                "content": { "parts": [ { "text": "hello " }, { "text": "world" } ] }
            }]
        });
        assert_eq!(
            GeminiTranscriber::extract_text(&body),
            Some("hello world".to_string())
        );
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        let body = serde_json::json!({ "candidates": [] });
        assert_eq!(GeminiTranscriber::extract_text(&body), None);
    }
}
