//! Scenario content for the conversation practice engine
//!
//! This crate holds the content collaborators the session core consumes:
//! - the built-in scenario catalog
//! - roster generation from the shared agent pool
//! - the template-based reply generator
//! - session scoring for the session-end consumer

pub mod catalog;
pub mod replies;
pub mod roster;
pub mod scoring;

pub use catalog::{builtin_scenarios, scenario_by_id, Scenario, ScenarioKind, Vibe};
pub use replies::{ReplyGenerator, ScenarioContext, TalkingPoint, TemplateReplies};
pub use roster::generate_roster;
pub use scoring::session_score;
