//! Practice session assembly
//!
//! Wires a scenario, a roster, the controller, the capture buffer and the
//! transcription pump into one running session. Missing transcription
//! credentials are not fatal: the session runs text-only and the pump simply
//! never starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use roundtable_config::Settings;
use roundtable_core::{DifficultyTier, Turn};
use roundtable_scenario::{
    generate_roster, session_score, ReplyGenerator, Scenario, ScenarioContext, TalkingPoint,
    TemplateReplies,
};
use roundtable_transcribe::{transcriber_from_settings, Transcriber};

use crate::capture::CaptureBuffer;
use crate::controller::{ControllerConfig, ConversationController, SessionEvent};
use crate::pump::TranscriptionPump;
use crate::SessionError;

/// Opening line spoken by the first roster agent after the warm-up delay.
pub const GREETING: &str = "Hello! Welcome to the session. Feel free to introduce yourself!";

/// Result of a completed session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub scenario_id: String,
    pub tier: DifficultyTier,
    pub score: u32,
    pub user_messages: usize,
    pub elapsed_secs: u64,
    pub turns: Vec<Turn>,
    pub ended_at: DateTime<Utc>,
}

/// Builder for [`PracticeSession`]
pub struct SessionBuilder {
    scenario: Scenario,
    settings: Settings,
    tier: Option<DifficultyTier>,
    seed: Option<u64>,
    replies: Option<Arc<dyn ReplyGenerator>>,
    transcriber: Option<Arc<dyn Transcriber>>,
    user_extras: String,
    talking_points: Vec<TalkingPoint>,
    duration_secs: Option<u64>,
}

impl SessionBuilder {
    pub fn new(scenario: Scenario) -> Self {
        Self {
            scenario,
            settings: Settings::default(),
            tier: None,
            seed: None,
            replies: None,
            transcriber: None,
            user_extras: String::new(),
            talking_points: Vec::new(),
            duration_secs: None,
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Override the scenario's default difficulty.
    pub fn tier(mut self, tier: DifficultyTier) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Fix the rng seed (roster shuffle, selection, jitter).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn replies(mut self, replies: Arc<dyn ReplyGenerator>) -> Self {
        self.replies = Some(replies);
        self
    }

    /// Inject a transcriber instead of resolving one from settings.
    pub fn transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Attach setup extras handed to the reply generator.
    pub fn setup(mut self, extras: impl Into<String>, points: Vec<TalkingPoint>) -> Self {
        self.user_extras = extras.into();
        self.talking_points = points;
        self
    }

    /// Override the scenario's session length; zero disables the clock.
    pub fn duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    /// Start the session. Never fails: a missing transcription provider
    /// leaves the session text-only.
    pub fn start(self) -> Arc<PracticeSession> {
        PracticeSession::start(self)
    }
}

/// One running practice session
pub struct PracticeSession {
    id: String,
    scenario: Scenario,
    tier: DifficultyTier,
    controller: Arc<ConversationController>,
    capture: Arc<CaptureBuffer>,
    pump: Option<Arc<TranscriptionPump>>,
    started_at: tokio::time::Instant,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    ended: AtomicBool,
}

impl PracticeSession {
    pub fn builder(scenario: Scenario) -> SessionBuilder {
        SessionBuilder::new(scenario)
    }

    fn start(builder: SessionBuilder) -> Arc<Self> {
        let SessionBuilder {
            scenario,
            settings,
            tier,
            seed,
            replies,
            transcriber,
            user_extras,
            talking_points,
            duration_secs,
        } = builder;

        let id = Uuid::new_v4().to_string();
        let tier = tier.unwrap_or(scenario.difficulty);

        let mut roster_rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let roster = generate_roster(&scenario, &mut roster_rng);

        let mut context = ScenarioContext::new(scenario.kind, scenario.base_prompt.clone())
            .with_setup(user_extras, talking_points);
        context.presentational = scenario.presentational;

        let replies = replies.unwrap_or_else(|| match seed {
            Some(seed) => Arc::new(TemplateReplies::with_seed(seed)),
            None => Arc::new(TemplateReplies::new()),
        });

        let controller = ConversationController::new(ControllerConfig {
            session_id: id.clone(),
            context,
            tier,
            roster: roster.clone(),
            replies,
            jitter: settings.session.response_jitter(),
            seed,
        });

        let capture = Arc::new(CaptureBuffer::new());

        let transcriber = match transcriber {
            Some(transcriber) => Some(transcriber),
            None if settings.transcription.enabled => {
                match transcriber_from_settings(&settings.transcription) {
                    Ok(transcriber) => Some(transcriber),
                    Err(err) => {
                        tracing::warn!(
                            session_id = %id,
                            error = %err,
                            "transcription unavailable, session runs text-only"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let pump = transcriber.map(|transcriber| {
            TranscriptionPump::new(
                &settings.session,
                &settings.transcription,
                Arc::clone(&capture),
                transcriber,
                Arc::clone(&controller),
            )
        });
        if let Some(pump) = &pump {
            pump.start();
        }

        tracing::info!(
            session_id = %id,
            scenario = %scenario.id,
            tier = %tier,
            agents = roster.len(),
            transcription = pump.is_some(),
            "session started"
        );

        let session = Arc::new(Self {
            id,
            scenario,
            tier,
            controller: Arc::clone(&controller),
            capture,
            pump,
            started_at: tokio::time::Instant::now(),
            tasks: Mutex::new(Vec::new()),
            ended: AtomicBool::new(false),
        });

        // Warm-up greeting from the first roster agent.
        if let Some(host) = roster.first().cloned() {
            let greeting_delay = settings.session.greeting_delay();
            let greeter = Arc::clone(&controller);
            let task = tokio::spawn(async move {
                tokio::time::sleep(greeting_delay).await;
                if let Err(err) = greeter.greet(&host, GREETING) {
                    tracing::debug!(error = %err, "greeting skipped");
                }
            });
            session.tasks.lock().push(task);
        }

        // Session clock; zero disables it.
        let duration = duration_secs.unwrap_or(session.scenario.duration_secs);
        if duration > 0 {
            let weak: Weak<Self> = Arc::downgrade(&session);
            let task = tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_secs(duration)).await;
                if let Some(session) = weak.upgrade() {
                    tracing::info!(session_id = %session.id, "session clock expired");
                    session.end().await;
                }
            });
            session.tasks.lock().push(task);
        }

        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn tier(&self) -> DifficultyTier {
        self.tier
    }

    pub fn is_active(&self) -> bool {
        self.controller.is_active()
    }

    /// Whether live transcription is running for this session.
    pub fn has_transcription(&self) -> bool {
        self.pump.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.controller.subscribe()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.controller.turns()
    }

    pub fn controller(&self) -> &Arc<ConversationController> {
        &self.controller
    }

    /// Submit a typed user message.
    pub fn send_text(&self, text: &str) -> Result<(), SessionError> {
        self.controller.on_user_turn(text)
    }

    /// Append one captured audio chunk.
    pub fn append_audio(&self, chunk: impl Into<Vec<u8>>) {
        self.capture.append(chunk);
    }

    /// End the session: cancel scheduled responses, drain the capture buffer
    /// through one final transcription, then close the log and score it.
    ///
    /// Idempotent; only the first call returns a summary.
    pub async fn end(self: &Arc<Self>) -> Option<SessionSummary> {
        if self.ended.swap(true, Ordering::SeqCst) {
            return None;
        }

        // No agent may speak during or after the drain.
        self.controller.cancel_pending();
        if let Some(pump) = &self.pump {
            pump.stop().await;
        }
        self.controller.end();

        for task in self.tasks.lock().drain(..) {
            task.abort();
        }

        let turns = self.controller.turns();
        let user_messages = turns.iter().filter(|t| t.is_user).count();
        let elapsed_secs = self.started_at.elapsed().as_secs();
        let score = session_score(user_messages, elapsed_secs, self.tier);

        Some(SessionSummary {
            session_id: self.id.clone(),
            scenario_id: self.scenario.id.clone(),
            tier: self.tier,
            score,
            user_messages,
            elapsed_secs,
            turns,
            ended_at: Utc::now(),
        })
    }
}
