//! Core types for the conversation practice engine
//!
//! This crate provides the leaf types shared by all other crates:
//! - Turn log entries and speaker identity
//! - The turn-taking state machine (pure transition functions)
//! - Synthetic participant descriptors
//! - Difficulty tiers and their response-delay policy

pub mod agent;
pub mod difficulty;
pub mod turn;
pub mod turn_state;

pub use agent::Agent;
pub use difficulty::DifficultyTier;
pub use turn::{SpeakerId, Turn};
pub use turn_state::{TurnPhase, TurnState};
