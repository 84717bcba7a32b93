//! Session core: turn-taking, response scheduling and live transcription
//!
//! A running session is a [`PracticeSession`], which owns:
//! - a [`ConversationController`], the single writer of the turn log and
//!   the turn-taking state, and the only component allowed to emit turns
//! - a [`CaptureBuffer`] fed by the audio capture side
//! - a [`TranscriptionPump`] draining that buffer into user turns
//!
//! Agent responses are never emitted synchronously: the controller schedules
//! them on a delay and re-validates at fire time, so superseded or post-end
//! timers discard themselves silently.

mod capture;
mod controller;
mod pump;
mod scheduler;
mod selector;
mod session;

pub use capture::CaptureBuffer;
pub use controller::{ControllerConfig, ConversationController, SessionEvent, SessionPhase};
pub use pump::TranscriptionPump;
pub use selector::{SelectionMode, SpeakerSelector};
pub use session::{PracticeSession, SessionBuilder, SessionSummary, GREETING};

use thiserror::Error;

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session has ended")]
    Ended,

    #[error("configuration error: {0}")]
    Config(#[from] roundtable_config::ConfigError),

    #[error("transcription error: {0}")]
    Transcribe(#[from] roundtable_transcribe::TranscribeError),
}
