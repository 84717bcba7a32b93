//! Turn-taking state machine
//!
//! `TurnState` tracks whose turn it conceptually is. It is an immutable
//! value: every transition returns a new state instead of mutating in place,
//! so a caller can hold a snapshot taken at scheduling time and compare it
//! against the current state when a timer fires.
//!
//! Invariants:
//! - `AwaitingAgent` is entered only via `on_user_turn`
//! - `AwaitingUser` is entered only via `on_agent_turn`
//! - `turn_index` changes only on `on_user_turn`

use serde::{Deserialize, Serialize};

use crate::turn::SpeakerId;

/// Whose turn the conversation is waiting on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// An agent (or nobody yet) just spoke; the floor is the user's
    #[default]
    AwaitingUser,
    /// The most recent turn was the user's; an agent response is owed
    AwaitingAgent,
}

/// Immutable turn-taking state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Incremented exactly once per completed user turn
    pub turn_index: u64,
    /// Current phase
    pub phase: TurnPhase,
    /// Last agent to have spoken, used to avoid immediate repeats
    pub last_speaker: Option<SpeakerId>,
}

impl TurnState {
    /// State at session start: index 0, floor with the user, no speaker yet.
    pub fn initial() -> Self {
        Self {
            turn_index: 0,
            phase: TurnPhase::AwaitingUser,
            last_speaker: None,
        }
    }

    /// The user spoke: advance the turn counter and owe an agent response.
    #[must_use]
    pub fn on_user_turn(&self) -> Self {
        Self {
            turn_index: self.turn_index + 1,
            phase: TurnPhase::AwaitingAgent,
            last_speaker: self.last_speaker.clone(),
        }
    }

    /// An agent spoke: the obligation is discharged and the floor returns to
    /// the user. Does not advance `turn_index`.
    #[must_use]
    pub fn on_agent_turn(&self, agent_id: impl Into<SpeakerId>) -> Self {
        Self {
            turn_index: self.turn_index,
            phase: TurnPhase::AwaitingUser,
            last_speaker: Some(agent_id.into()),
        }
    }

    /// The single gate consulted before scheduling a response and again
    /// before emitting one.
    pub fn can_respond(&self) -> bool {
        self.phase == TurnPhase::AwaitingAgent
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = TurnState::initial();
        assert_eq!(state.turn_index, 0);
        assert_eq!(state.phase, TurnPhase::AwaitingUser);
        assert!(state.last_speaker.is_none());
        assert!(!state.can_respond());
    }

    #[test]
    fn test_user_turn_advances_index_and_opens_gate() {
        let state = TurnState::initial().on_user_turn();
        assert_eq!(state.turn_index, 1);
        assert_eq!(state.phase, TurnPhase::AwaitingAgent);
        assert!(state.can_respond());
    }

    #[test]
    fn test_agent_turn_keeps_index_and_closes_gate() {
        let state = TurnState::initial().on_user_turn().on_agent_turn("agent-1");
        assert_eq!(state.turn_index, 1);
        assert_eq!(state.phase, TurnPhase::AwaitingUser);
        assert_eq!(state.last_speaker, Some(SpeakerId::new("agent-1")));
        assert!(!state.can_respond());
    }

    #[test]
    fn test_index_monotonic_across_user_turns_only() {
        let mut state = TurnState::initial();
        for expected in 1..=5u64 {
            state = state.on_user_turn();
            assert_eq!(state.turn_index, expected);
            state = state.on_agent_turn("agent-0");
            assert_eq!(state.turn_index, expected);
        }
    }

    #[test]
    fn test_last_speaker_survives_user_turn() {
        let state = TurnState::initial()
            .on_user_turn()
            .on_agent_turn("agent-2")
            .on_user_turn();
        assert_eq!(state.last_speaker, Some(SpeakerId::new("agent-2")));
    }
}
