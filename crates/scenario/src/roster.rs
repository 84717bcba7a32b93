//! Roster generation
//!
//! Agents are drawn from a shared pool of personas. The shuffle takes an
//! injected rng so that roster generation is reproducible under a fixed seed.

use rand::seq::SliceRandom;
use rand::Rng;

use roundtable_core::Agent;

use crate::catalog::Scenario;

fn agent_pool() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("Alex", "friendly and outgoing", "👨"),
        ("Sarah", "professional and direct", "👩"),
        ("Mike", "curious and inquisitive", "👨‍💼"),
        ("Emma", "supportive and encouraging", "👩‍💼"),
        ("David", "analytical and thoughtful", "👨‍🏫"),
        ("Lisa", "energetic and enthusiastic", "👩‍🎓"),
        ("James", "calm and collected", "👨‍🎓"),
        ("Rachel", "challenging and critical", "👩‍🏫"),
    ]
}

/// Shuffle the persona pool and take as many agents as the scenario calls
/// for. Ids are positional (`agent-0`, `agent-1`, ...).
pub fn generate_roster<R: Rng>(scenario: &Scenario, rng: &mut R) -> Vec<Agent> {
    let mut pool = agent_pool();
    pool.shuffle(rng);

    pool.into_iter()
        .take(scenario.participant_count)
        .enumerate()
        .map(|(index, (name, personality, avatar))| {
            Agent::new(format!("agent-{index}"), name, personality, avatar)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::scenario_by_id;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_roster_size_matches_scenario() {
        let scenario = scenario_by_id("party").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let roster = generate_roster(&scenario, &mut rng);
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[0].id.as_str(), "agent-0");
        assert_eq!(roster[3].id.as_str(), "agent-3");
    }

    #[test]
    fn test_roster_deterministic_under_seed() {
        let scenario = scenario_by_id("presentation").unwrap();
        let a = generate_roster(&scenario, &mut StdRng::seed_from_u64(42));
        let b = generate_roster(&scenario, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_roster_names_unique() {
        let scenario = scenario_by_id("presentation").unwrap();
        let roster = generate_roster(&scenario, &mut StdRng::seed_from_u64(1));
        let mut names: Vec<_> = roster.iter().map(|a| a.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), roster.len());
    }
}
