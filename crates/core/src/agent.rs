//! Synthetic participant descriptors

use serde::{Deserialize, Serialize};

use crate::turn::SpeakerId;

/// A synthetic conversation participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Roster identifier (e.g. `agent-0`)
    pub id: SpeakerId,
    /// Display name
    pub name: String,
    /// Short personality description fed to the reply generator
    pub personality: String,
    /// Avatar glyph
    pub avatar: String,
    /// Optional scenario role (e.g. "interviewer")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Optional voice id for TTS collaborators (unused by the core)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    /// Optional prefix prepended to the agent's greeting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_prefix: Option<String>,
}

impl Agent {
    pub fn new(
        id: impl Into<SpeakerId>,
        name: impl Into<String>,
        personality: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            personality: personality.into(),
            avatar: avatar.into(),
            role: None,
            voice_id: None,
            emotion_prefix: None,
        }
    }

    /// Greeting line spoken at session start, with the optional emotion
    /// prefix applied.
    pub fn greeting_text(&self, base: &str) -> String {
        match &self.emotion_prefix {
            Some(prefix) => format!("{} {}", prefix, base),
            None => base.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_without_prefix() {
        let agent = Agent::new("agent-0", "Alex", "friendly", "A");
        assert_eq!(agent.greeting_text("Hello!"), "Hello!");
    }

    #[test]
    fn test_greeting_with_prefix() {
        let mut agent = Agent::new("agent-0", "Alex", "friendly", "A");
        agent.emotion_prefix = Some("[cheerful]".to_string());
        assert_eq!(agent.greeting_text("Hello!"), "[cheerful] Hello!");
    }
}
