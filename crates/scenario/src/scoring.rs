//! Session scoring
//!
//! Computed once by the session-end consumer: participation (user messages)
//! carries most of the weight, a small bonus rewards finishing quickly, and
//! the tier multiplier rewards harder sessions.

use roundtable_core::DifficultyTier;

/// Score a completed session.
pub fn session_score(user_messages: usize, elapsed_secs: u64, tier: DifficultyTier) -> u32 {
    let base = user_messages as f64 * 10.0;
    let time_bonus = (100.0 - elapsed_secs as f64 / 10.0).max(0.0);
    ((base + time_bonus) * tier.score_multiplier()).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_formula() {
        // 5 messages, 200s, medium: (50 + 80) * 1.2 = 156
        assert_eq!(session_score(5, 200, DifficultyTier::Medium), 156);
    }

    #[test]
    fn test_time_bonus_floors_at_zero() {
        // 2000s exhausts the bonus entirely
        assert_eq!(session_score(3, 2000, DifficultyTier::Easy), 30);
    }

    #[test]
    fn test_tier_multipliers_ordered() {
        let easy = session_score(10, 100, DifficultyTier::Easy);
        let medium = session_score(10, 100, DifficultyTier::Medium);
        let hard = session_score(10, 100, DifficultyTier::Hard);
        assert!(easy < medium && medium < hard);
    }

    #[test]
    fn test_silent_session_scores_time_bonus_only() {
        assert_eq!(session_score(0, 0, DifficultyTier::Easy), 100);
    }
}
