//! Built-in scenario catalog

use serde::{Deserialize, Serialize};

use roundtable_core::DifficultyTier;

/// Kind of social situation being practiced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    Party,
    Classroom,
    JobInterview,
    DeEscalation,
    Presentation,
}

impl ScenarioKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Party => "party",
            ScenarioKind::Classroom => "classroom",
            ScenarioKind::JobInterview => "job-interview",
            ScenarioKind::DeEscalation => "de-escalation",
            ScenarioKind::Presentation => "presentation",
        }
    }
}

/// Overall tone of the scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vibe {
    Casual,
    Academic,
    Professional,
    Tense,
    Formal,
}

/// A practice scenario definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: ScenarioKind,
    /// Number of synthetic agents in the roster
    pub participant_count: usize,
    /// Default session duration in seconds (0 disables the clock)
    pub duration_secs: u64,
    pub icon: String,
    pub difficulty: DifficultyTier,
    /// Base instruction handed to the reply generator
    pub base_prompt: String,
    pub vibe: Vibe,
    /// Whether the user is presenting to the group rather than conversing
    pub presentational: bool,
}

/// The built-in scenario set.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: "party".to_string(),
            title: "At a Party".to_string(),
            description: "Practice mingling and making small talk at a social gathering"
                .to_string(),
            kind: ScenarioKind::Party,
            participant_count: 4,
            duration_secs: 300,
            icon: "🎉".to_string(),
            difficulty: DifficultyTier::Easy,
            base_prompt: "You are a guest at a lively house party, chatting casually with \
                          someone you just met."
                .to_string(),
            vibe: Vibe::Casual,
            presentational: false,
        },
        Scenario {
            id: "classroom".to_string(),
            title: "Called Out in Class".to_string(),
            description: "Handle being called on unexpectedly during a lecture".to_string(),
            kind: ScenarioKind::Classroom,
            participant_count: 2,
            duration_secs: 180,
            icon: "📚".to_string(),
            difficulty: DifficultyTier::Medium,
            base_prompt: "You are an instructor probing a student's understanding in front of \
                          the class."
                .to_string(),
            vibe: Vibe::Academic,
            presentational: false,
        },
        Scenario {
            id: "job-interview".to_string(),
            title: "Job Interview".to_string(),
            description: "Navigate a one-on-one job interview scenario".to_string(),
            kind: ScenarioKind::JobInterview,
            participant_count: 2,
            duration_secs: 600,
            icon: "💼".to_string(),
            difficulty: DifficultyTier::Hard,
            base_prompt: "You are interviewing a candidate for a role on your team, assessing \
                          fit and experience."
                .to_string(),
            vibe: Vibe::Professional,
            presentational: false,
        },
        Scenario {
            id: "de-escalation".to_string(),
            title: "De-escalation".to_string(),
            description: "Practice calming down a tense situation".to_string(),
            kind: ScenarioKind::DeEscalation,
            participant_count: 3,
            duration_secs: 240,
            icon: "🤝".to_string(),
            difficulty: DifficultyTier::Hard,
            base_prompt: "You are an upset customer whose problem has not been resolved; you \
                          want acknowledgment and a fix."
                .to_string(),
            vibe: Vibe::Tense,
            presentational: false,
        },
        Scenario {
            id: "presentation".to_string(),
            title: "Class Presentation".to_string(),
            description: "Deliver a presentation to your classmates".to_string(),
            kind: ScenarioKind::Presentation,
            participant_count: 5,
            duration_secs: 420,
            icon: "🎤".to_string(),
            difficulty: DifficultyTier::Medium,
            base_prompt: "You are an audience member asking pointed questions about the \
                          speaker's material."
                .to_string(),
            vibe: Vibe::Formal,
            presentational: true,
        },
    ]
}

/// Look up a built-in scenario by id.
pub fn scenario_by_id(id: &str) -> Option<Scenario> {
    builtin_scenarios().into_iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let scenario = scenario_by_id("job-interview").unwrap();
        assert_eq!(scenario.kind, ScenarioKind::JobInterview);
        assert_eq!(scenario.participant_count, 2);
        assert_eq!(scenario.difficulty, DifficultyTier::Hard);
        assert!(scenario_by_id("unknown").is_none());
    }

    #[test]
    fn test_all_scenarios_have_agents() {
        for scenario in builtin_scenarios() {
            assert!(scenario.participant_count >= 1, "{}", scenario.id);
            assert!(!scenario.base_prompt.is_empty(), "{}", scenario.id);
        }
    }

    #[test]
    fn test_kind_serde_kebab_case() {
        let json = serde_json::to_string(&ScenarioKind::JobInterview).unwrap();
        assert_eq!(json, "\"job-interview\"");
    }
}
