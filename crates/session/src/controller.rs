//! Conversation controller
//!
//! Single writer of the turn log and the turn-taking state. Every mutation
//! funnels through one entry point holding the state lock, which is what
//! makes the scheduler's late validation sound: a timer observes the same
//! state it would race against, never a torn intermediate.
//!
//! Timers reference the controller through a `Weak`, so a dropped session
//! takes its sleeping timers down with it instead of keeping the controller
//! alive.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::broadcast;

use roundtable_core::{Agent, DifficultyTier, SpeakerId, Turn, TurnState};
use roundtable_scenario::{ReplyGenerator, ScenarioContext};

use crate::scheduler::{response_delay, ResponseScheduler};
use crate::selector::SpeakerSelector;
use crate::SessionError;

/// Lifecycle of the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Ended,
}

/// Events broadcast to session observers
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A turn (user or agent) was appended to the log
    TurnAdded(Turn),
    /// An agent response was scheduled for a user turn
    ResponseScheduled {
        turn_index: u64,
        agent_id: SpeakerId,
        delay: Duration,
    },
    /// A transcription attempt failed; the audio for that window is gone
    TranscriptionFailed(String),
    /// The session ended; no further turns will be emitted
    Ended,
}

/// Everything the controller needs at construction time
pub struct ControllerConfig {
    pub session_id: String,
    pub context: ScenarioContext,
    pub tier: DifficultyTier,
    pub roster: Vec<Agent>,
    pub replies: Arc<dyn ReplyGenerator>,
    /// Upper bound of the random addend on the response delay
    pub jitter: Duration,
    /// Fixed seed for deterministic selection and jitter (tests)
    pub seed: Option<u64>,
}

struct ControllerState {
    phase: SessionPhase,
    turn_state: TurnState,
    turns: Vec<Turn>,
    scheduler: ResponseScheduler,
    greeted: bool,
}

/// Owns the turn log, the turn-taking state and the response scheduler
pub struct ConversationController {
    session_id: String,
    context: ScenarioContext,
    tier: DifficultyTier,
    roster: Vec<Agent>,
    replies: Arc<dyn ReplyGenerator>,
    selector: SpeakerSelector,
    jitter: Duration,
    rng: Mutex<StdRng>,
    state: Mutex<ControllerState>,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl ConversationController {
    pub fn new(config: ControllerConfig) -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(64);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Arc::new(Self {
            session_id: config.session_id,
            context: config.context,
            tier: config.tier,
            roster: config.roster,
            replies: config.replies,
            selector: SpeakerSelector::default(),
            jitter: config.jitter,
            rng: Mutex::new(rng),
            state: Mutex::new(ControllerState {
                phase: SessionPhase::Active,
                turn_state: TurnState::initial(),
                turns: Vec::new(),
                scheduler: ResponseScheduler::default(),
                greeted: false,
            }),
            event_tx,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().phase == SessionPhase::Active
    }

    /// Snapshot of the turn log.
    pub fn turns(&self) -> Vec<Turn> {
        self.state.lock().turns.clone()
    }

    /// Snapshot of the turn-taking state.
    pub fn turn_state(&self) -> TurnState {
        self.state.lock().turn_state.clone()
    }

    /// Turn index the scheduler is currently committed to, if any.
    pub fn pending_turn(&self) -> Option<u64> {
        self.state.lock().scheduler.pending_turn()
    }

    /// Append a user turn and request an agent response for it.
    ///
    /// Both input paths (typed text and transcription) land here. Blank text
    /// is dropped without advancing the turn counter.
    pub fn on_user_turn(self: &Arc<Self>, text: &str) -> Result<(), SessionError> {
        let trimmed = text.trim();

        let mut state = self.state.lock();
        if state.phase != SessionPhase::Active {
            return Err(SessionError::Ended);
        }
        if trimmed.is_empty() {
            tracing::debug!(session_id = %self.session_id, "dropping blank user turn");
            return Ok(());
        }

        let turn = Turn::user(trimmed);
        state.turns.push(turn.clone());
        state.turn_state = state.turn_state.on_user_turn();
        tracing::debug!(
            session_id = %self.session_id,
            turn_index = state.turn_state.turn_index,
            "user turn appended"
        );
        let _ = self.event_tx.send(SessionEvent::TurnAdded(turn));

        self.schedule_locked(&mut state);
        Ok(())
    }

    /// Request an agent response for the current turn.
    ///
    /// Safe to call from any trigger at any time: the call is a no-op unless
    /// the floor is the agents' and nothing is pending for this turn yet.
    pub fn request_schedule(self: &Arc<Self>) {
        let mut state = self.state.lock();
        if state.phase != SessionPhase::Active {
            return;
        }
        self.schedule_locked(&mut state);
    }

    fn schedule_locked(self: &Arc<Self>, state: &mut ControllerState) {
        if !state.turn_state.can_respond() {
            return;
        }

        let turn_index = state.turn_state.turn_index;
        if state.scheduler.is_pending_for(turn_index) {
            tracing::debug!(turn_index, "response already pending, skipping");
            return;
        }

        let mut rng = self.rng.lock();
        let agent = match self.selector.select(
            &state.turns,
            &self.roster,
            state.turn_state.last_speaker.as_ref(),
            &mut *rng,
        ) {
            Some(agent) => agent,
            None => {
                tracing::debug!(turn_index, "no agent eligible, scheduler stays idle");
                return;
            }
        };
        let delay = response_delay(self.tier, self.jitter, &mut *rng);
        drop(rng);

        let weak: Weak<Self> = Arc::downgrade(self);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(controller) = weak.upgrade() {
                controller.fire_scheduled(turn_index);
            }
        });

        tracing::debug!(
            turn_index,
            agent_id = %agent.id,
            delay_ms = delay.as_millis() as u64,
            "agent response scheduled"
        );
        let _ = self.event_tx.send(SessionEvent::ResponseScheduled {
            turn_index,
            agent_id: agent.id.clone(),
            delay,
        });
        state.scheduler.arm(turn_index, agent, timer);
    }

    /// Timer callback. Re-validates everything against the current state and
    /// discards silently when the world has moved on.
    fn fire_scheduled(&self, turn_index: u64) {
        let mut state = self.state.lock();

        if state.phase != SessionPhase::Active {
            tracing::debug!(turn_index, "discarding fire after session end");
            return;
        }
        if !state.turn_state.can_respond() {
            tracing::debug!(turn_index, "discarding stale fire, floor is the user's");
            return;
        }
        if state.turn_state.turn_index != turn_index {
            tracing::debug!(
                fired = turn_index,
                current = state.turn_state.turn_index,
                "discarding fire for a superseded turn"
            );
            return;
        }
        let pending = match state.scheduler.take_if(turn_index) {
            Some(pending) => pending,
            None => return,
        };

        let text = self
            .replies
            .generate(&self.context, &pending.agent, self.tier, &state.turns);
        let turn = Turn::agent(pending.agent.id.clone(), pending.agent.name.clone(), text);
        state.turns.push(turn.clone());
        state.turn_state = state.turn_state.on_agent_turn(pending.agent.id);
        tracing::debug!(turn_index, speaker = %turn.speaker_id, "agent turn emitted");
        let _ = self.event_tx.send(SessionEvent::TurnAdded(turn));
    }

    /// Speak the opening greeting through the given agent. One-shot; later
    /// calls are no-ops. Does not schedule a follow-up response.
    pub fn greet(&self, agent: &Agent, base: &str) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        if state.phase != SessionPhase::Active {
            return Err(SessionError::Ended);
        }
        if state.greeted {
            return Ok(());
        }
        state.greeted = true;

        let turn = Turn::agent(agent.id.clone(), agent.name.clone(), agent.greeting_text(base));
        state.turns.push(turn.clone());
        state.turn_state = state.turn_state.on_agent_turn(agent.id.clone());
        tracing::debug!(session_id = %self.session_id, speaker = %agent.id, "greeting emitted");
        let _ = self.event_tx.send(SessionEvent::TurnAdded(turn));
        Ok(())
    }

    /// Abort all scheduled responses without ending the session. Used while
    /// draining the capture buffer at shutdown.
    pub fn cancel_pending(&self) {
        self.state.lock().scheduler.cancel_all();
    }

    /// Surface a failed transcription attempt to observers.
    pub fn report_transcription_failure(&self, message: &str) {
        tracing::warn!(session_id = %self.session_id, error = %message, "transcription failed");
        let _ = self
            .event_tx
            .send(SessionEvent::TranscriptionFailed(message.to_string()));
    }

    /// End the session. Idempotent; returns whether this call transitioned.
    pub fn end(&self) -> bool {
        let mut state = self.state.lock();
        if state.phase == SessionPhase::Ended {
            return false;
        }
        state.phase = SessionPhase::Ended;
        state.scheduler.cancel_all();
        tracing::info!(
            session_id = %self.session_id,
            turns = state.turns.len(),
            "session ended"
        );
        let _ = self.event_tx.send(SessionEvent::Ended);
        true
    }
}
