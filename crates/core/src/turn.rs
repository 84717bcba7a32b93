//! Conversation turns
//!
//! A `Turn` is one utterance (user or agent) appended to the conversation
//! log. The log is the single source of truth for conversation history shown
//! to the speaker selector and the reply generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a turn's speaker.
///
/// The human participant is always `SpeakerId::user()`; agents carry the
/// roster identifier they were created with (e.g. `agent-0`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeakerId(pub String);

impl SpeakerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The fixed identifier for the human participant.
    pub fn user() -> Self {
        Self("user".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpeakerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SpeakerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn id
    pub id: Uuid,
    /// Who spoke
    pub speaker_id: SpeakerId,
    /// Display name of the speaker
    pub speaker_name: String,
    /// Whether the human participant spoke this turn
    pub is_user: bool,
    /// Content of the turn
    pub text: String,
    /// When the turn was appended
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker_id: SpeakerId::user(),
            speaker_name: "You".to_string(),
            is_user: true,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Create an agent turn
    pub fn agent(
        speaker_id: impl Into<SpeakerId>,
        speaker_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker_id: speaker_id.into(),
            speaker_name: speaker_name.into(),
            is_user: false,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Get word count
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Render the turn as a transcript line (`You: ...` / `Name: ...`)
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.speaker_name, self.text)
    }
}

impl From<String> for SpeakerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_turn() {
        let turn = Turn::user("hello there");
        assert!(turn.is_user);
        assert_eq!(turn.speaker_id, SpeakerId::user());
        assert_eq!(turn.word_count(), 2);
    }

    #[test]
    fn test_agent_turn() {
        let turn = Turn::agent("agent-0", "Alex", "Welcome!");
        assert!(!turn.is_user);
        assert_eq!(turn.transcript_line(), "Alex: Welcome!");
    }

    #[test]
    fn test_speaker_id_serde_transparent() {
        let id = SpeakerId::new("agent-3");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"agent-3\"");
    }
}
