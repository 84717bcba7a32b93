//! Reply generation
//!
//! The session core treats reply generation as a pluggable, synchronous and
//! infallible capability: implementations must map any internal failure to a
//! fallback string rather than surface an error as a turn. `TemplateReplies`
//! is the built-in implementation, drawing from per-scenario opener templates
//! plus a follow-up pool once the conversation has progressed.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use roundtable_core::{Agent, DifficultyTier, Turn};

use crate::catalog::ScenarioKind;

/// A weighted talking point the user wants the agents to probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalkingPoint {
    pub text: String,
    /// 1 (low) to 5 (high)
    pub importance: u8,
}

/// Context handed to the reply generator alongside the history
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub kind: ScenarioKind,
    /// Base instruction from the scenario definition
    pub base_prompt: String,
    /// Free-form extras supplied at setup time
    pub user_extras: String,
    /// Talking points supplied at setup time (capped at 20)
    pub talking_points: Vec<TalkingPoint>,
    /// Whether the user is presenting rather than conversing
    pub presentational: bool,
}

impl ScenarioContext {
    pub fn new(kind: ScenarioKind, base_prompt: impl Into<String>) -> Self {
        Self {
            kind,
            base_prompt: base_prompt.into(),
            user_extras: String::new(),
            talking_points: Vec::new(),
            presentational: false,
        }
    }

    /// Attach setup extras; talking points beyond 20 are dropped.
    pub fn with_setup(mut self, extras: impl Into<String>, mut points: Vec<TalkingPoint>) -> Self {
        points.truncate(20);
        self.user_extras = extras.into();
        self.talking_points = points;
        self
    }
}

/// Reply-generation capability consumed by the response scheduler.
///
/// Synchronous from the scheduler's perspective and infallible: the returned
/// string is emitted as the agent's turn verbatim.
pub trait ReplyGenerator: Send + Sync + 'static {
    fn generate(
        &self,
        context: &ScenarioContext,
        agent: &Agent,
        tier: DifficultyTier,
        history: &[Turn],
    ) -> String;
}

fn openers(kind: ScenarioKind) -> &'static [&'static str] {
    match kind {
        ScenarioKind::Party => &[
            "Hey! Great to meet you! What brings you here tonight?",
            "I love this music! Have you tried the appetizers yet?",
            "So, what do you do for fun?",
            "This is such a nice venue, right?",
            "Do you know many people here?",
        ],
        ScenarioKind::Classroom => &[
            "Can you elaborate on that point?",
            "What's your reasoning behind that answer?",
            "Interesting perspective. Can you explain further?",
            "I'm not sure I follow. Could you clarify?",
            "That's a good start. What else can you add?",
        ],
        ScenarioKind::JobInterview => &[
            "Tell me about yourself and your background.",
            "What interests you about this position?",
            "Can you describe a challenging situation you've faced?",
            "Where do you see yourself in five years?",
            "What are your greatest strengths?",
            "Why should we hire you?",
        ],
        ScenarioKind::DeEscalation => &[
            "I'm really frustrated with this situation!",
            "This isn't what I expected at all.",
            "Can you help me understand what's going on?",
            "I need this resolved immediately.",
            "I appreciate you taking the time to talk.",
        ],
        ScenarioKind::Presentation => &[
            "Could you explain that slide in more detail?",
            "What data supports that conclusion?",
            "How does this compare to other approaches?",
            "Can you give us a real-world example?",
            "What are the potential limitations?",
        ],
    }
}

fn follow_ups(kind: ScenarioKind) -> &'static [&'static str] {
    match kind {
        ScenarioKind::Party => &[
            "That's interesting! How did you get into that?",
            "Oh really? Tell me more!",
            "I've always wanted to try that. Any tips?",
        ],
        ScenarioKind::Classroom => &[
            "Can you provide an example?",
            "What evidence supports that?",
            "How does that relate to what we discussed earlier?",
        ],
        ScenarioKind::JobInterview => &[
            "Can you give me a specific example?",
            "How did you handle that situation?",
            "What did you learn from that experience?",
        ],
        ScenarioKind::DeEscalation => &[
            "I understand, but can we find a solution?",
            "What would make this better for you?",
            "Let's work through this together.",
        ],
        ScenarioKind::Presentation => &[
            "Could you clarify that point?",
            "What's your source for that information?",
            "How confident are you in these results?",
        ],
    }
}

/// Template-based reply generator with a seedable rng.
pub struct TemplateReplies {
    rng: Mutex<StdRng>,
}

impl TemplateReplies {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic variant for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for TemplateReplies {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyGenerator for TemplateReplies {
    fn generate(
        &self,
        context: &ScenarioContext,
        _agent: &Agent,
        _tier: DifficultyTier,
        history: &[Turn],
    ) -> String {
        let base = openers(context.kind);
        let extra = follow_ups(context.kind);

        // Widen the pool with follow-ups once the conversation has moved
        // past the opening exchange.
        let mut rng = self.rng.lock();
        let index = if history.len() > 2 {
            rng.gen_range(0..base.len() + extra.len())
        } else {
            rng.gen_range(0..base.len())
        };

        if index < base.len() {
            base[index].to_string()
        } else {
            extra[index - base.len()].to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_core::Agent;

    fn context() -> ScenarioContext {
        ScenarioContext::new(ScenarioKind::JobInterview, "interview prompt")
    }

    fn agent() -> Agent {
        Agent::new("agent-0", "Sarah", "professional and direct", "X")
    }

    #[test]
    fn test_short_history_uses_openers_only() {
        let replies = TemplateReplies::with_seed(3);
        let pool: Vec<String> = openers(ScenarioKind::JobInterview)
            .iter()
            .map(|s| s.to_string())
            .collect();

        for _ in 0..20 {
            let reply = replies.generate(&context(), &agent(), DifficultyTier::Medium, &[]);
            assert!(pool.contains(&reply));
        }
    }

    #[test]
    fn test_long_history_can_draw_follow_ups() {
        let replies = TemplateReplies::with_seed(9);
        let history = vec![
            Turn::agent("agent-0", "Sarah", "Tell me about yourself."),
            Turn::user("Sure, I am a systems engineer."),
            Turn::agent("agent-0", "Sarah", "What interests you about this position?"),
        ];

        let mut pool: Vec<String> = openers(ScenarioKind::JobInterview)
            .iter()
            .chain(follow_ups(ScenarioKind::JobInterview))
            .map(|s| s.to_string())
            .collect();
        pool.sort();

        let mut saw_follow_up = false;
        for _ in 0..64 {
            let reply = replies.generate(&context(), &agent(), DifficultyTier::Hard, &history);
            assert!(pool.binary_search(&reply).is_ok());
            if follow_ups(ScenarioKind::JobInterview).contains(&reply.as_str()) {
                saw_follow_up = true;
            }
        }
        assert!(saw_follow_up, "follow-up pool never drawn in 64 samples");
    }

    #[test]
    fn test_talking_points_capped() {
        let points = (0..30)
            .map(|i| TalkingPoint {
                text: format!("point {i}"),
                importance: 3,
            })
            .collect();
        let ctx = context().with_setup("extras", points);
        assert_eq!(ctx.talking_points.len(), 20);
    }
}
