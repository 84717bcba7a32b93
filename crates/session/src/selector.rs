//! Speaker selection
//!
//! Decides which roster agent answers the user's latest turn. The active-host
//! policy avoids back-to-back turns from the same agent whenever the roster
//! allows it; within the eligible set the pick is uniform over an injected
//! rng, so tests can pin the outcome with a seed.

use rand::Rng;

use roundtable_core::{Agent, SpeakerId, Turn};

/// Selection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Uniform pick over the roster, excluding the previous speaker when the
    /// roster has at least two agents.
    #[default]
    ActiveHost,
}

/// Picks the next agent to speak
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerSelector {
    mode: SelectionMode,
}

impl SpeakerSelector {
    pub fn new(mode: SelectionMode) -> Self {
        Self { mode }
    }

    /// Select the responding agent, or `None` for an empty roster.
    ///
    /// `history` is accepted for policies that weigh past participation; the
    /// active-host policy only consults `last_speaker`.
    pub fn select<R: Rng>(
        &self,
        _history: &[Turn],
        roster: &[Agent],
        last_speaker: Option<&SpeakerId>,
        rng: &mut R,
    ) -> Option<Agent> {
        match self.mode {
            SelectionMode::ActiveHost => {
                if roster.is_empty() {
                    return None;
                }

                let eligible: Vec<&Agent> = if roster.len() >= 2 {
                    roster
                        .iter()
                        .filter(|agent| Some(&agent.id) != last_speaker)
                        .collect()
                } else {
                    roster.iter().collect()
                };

                let index = rng.gen_range(0..eligible.len());
                Some(eligible[index].clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: usize) -> Vec<Agent> {
        (0..n)
            .map(|i| Agent::new(format!("agent-{i}"), format!("Agent {i}"), "neutral", "A"))
            .collect()
    }

    #[test]
    fn test_empty_roster_yields_none() {
        let selector = SpeakerSelector::default();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(selector.select(&[], &[], None, &mut rng).is_none());
    }

    #[test]
    fn test_two_agents_never_repeat() {
        let selector = SpeakerSelector::default();
        let roster = roster(2);
        let mut rng = StdRng::seed_from_u64(17);
        let last = SpeakerId::new("agent-0");

        for _ in 0..20 {
            let pick = selector
                .select(&[], &roster, Some(&last), &mut rng)
                .unwrap();
            assert_eq!(pick.id.as_str(), "agent-1");
        }
    }

    #[test]
    fn test_solo_roster_may_repeat() {
        let selector = SpeakerSelector::default();
        let roster = roster(1);
        let mut rng = StdRng::seed_from_u64(3);
        let last = SpeakerId::new("agent-0");

        let pick = selector
            .select(&[], &roster, Some(&last), &mut rng)
            .unwrap();
        assert_eq!(pick.id.as_str(), "agent-0");
    }

    #[test]
    fn test_excluded_speaker_absent_from_picks() {
        let selector = SpeakerSelector::default();
        let roster = roster(4);
        let mut rng = StdRng::seed_from_u64(99);
        let last = SpeakerId::new("agent-2");

        for _ in 0..50 {
            let pick = selector
                .select(&[], &roster, Some(&last), &mut rng)
                .unwrap();
            assert_ne!(pick.id.as_str(), "agent-2");
        }
    }
}
