//! Difficulty tiers
//!
//! The tier controls how quickly agents respond: harder sessions leave the
//! user less breathing room. A bounded random jitter is added on top of the
//! base delay at scheduling time (owned by the scheduler, not here).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyTier {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl DifficultyTier {
    /// Base delay before an agent response fires.
    pub fn base_delay(&self) -> Duration {
        match self {
            DifficultyTier::Easy => Duration::from_millis(8000),
            DifficultyTier::Medium => Duration::from_millis(5000),
            DifficultyTier::Hard => Duration::from_millis(3000),
        }
    }

    /// Score multiplier applied by the session-end consumer.
    pub fn score_multiplier(&self) -> f64 {
        match self {
            DifficultyTier::Easy => 1.0,
            DifficultyTier::Medium => 1.2,
            DifficultyTier::Hard => 1.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }
}

impl std::fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            other => Err(format!("unknown difficulty tier: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_delays() {
        assert_eq!(DifficultyTier::Easy.base_delay(), Duration::from_millis(8000));
        assert_eq!(DifficultyTier::Medium.base_delay(), Duration::from_millis(5000));
        assert_eq!(DifficultyTier::Hard.base_delay(), Duration::from_millis(3000));
    }

    #[test]
    fn test_parse_round_trip() {
        for tier in [DifficultyTier::Easy, DifficultyTier::Medium, DifficultyTier::Hard] {
            let parsed: DifficultyTier = tier.as_str().parse().unwrap();
            assert_eq!(parsed, tier);
        }
        assert!("impossible".parse::<DifficultyTier>().is_err());
    }
}
