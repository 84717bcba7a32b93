//! Transcription pump
//!
//! Periodically drains the capture buffer and turns speech into user turns.
//! One request in flight at a time: a tick that lands mid-request skips
//! without swapping, so the audio it would have taken merges into the next
//! flush instead of being dropped. Stopping the pump performs one final
//! best-effort drain so trailing speech still makes it into the log.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use roundtable_config::{SessionSettings, TranscribeSettings};
use roundtable_transcribe::{validate_payload, Transcriber};

use crate::capture::CaptureBuffer;
use crate::controller::ConversationController;

enum PumpRuntime {
    Stopped,
    Running {
        shutdown: watch::Sender<bool>,
        handle: JoinHandle<()>,
    },
}

/// Periodic capture-buffer flusher
pub struct TranscriptionPump {
    interval: Duration,
    min_flush_bytes: usize,
    settings: TranscribeSettings,
    capture: Arc<CaptureBuffer>,
    transcriber: Arc<dyn Transcriber>,
    controller: Arc<ConversationController>,
    in_flight: AtomicBool,
    runtime: Mutex<PumpRuntime>,
}

impl TranscriptionPump {
    pub fn new(
        session: &SessionSettings,
        transcription: &TranscribeSettings,
        capture: Arc<CaptureBuffer>,
        transcriber: Arc<dyn Transcriber>,
        controller: Arc<ConversationController>,
    ) -> Arc<Self> {
        Arc::new(Self {
            interval: session.flush_interval(),
            min_flush_bytes: session.min_flush_bytes,
            settings: transcription.clone(),
            capture,
            transcriber,
            controller,
            in_flight: AtomicBool::new(false),
            runtime: Mutex::new(PumpRuntime::Stopped),
        })
    }

    /// Start the flush loop. No-op if already running.
    pub fn start(self: &Arc<Self>) {
        let mut runtime = self.runtime.lock();
        if matches!(*runtime, PumpRuntime::Running { .. }) {
            return;
        }

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let pump = Arc::clone(self);
        let handle = tokio::spawn(async move {
            // First tick one full interval out, not immediately.
            let start = tokio::time::Instant::now() + pump.interval;
            let mut ticker = tokio::time::interval_at(start, pump.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        pump.flush(false).await;
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }

            // Trailing speech captured since the last tick.
            pump.flush(true).await;
        });

        tracing::debug!(
            provider = self.transcriber.provider_name(),
            interval_ms = self.interval.as_millis() as u64,
            "transcription pump started"
        );
        *runtime = PumpRuntime::Running { shutdown, handle };
    }

    /// Stop the loop and wait for its final drain to complete.
    pub async fn stop(&self) {
        let runtime = {
            let mut guard = self.runtime.lock();
            std::mem::replace(&mut *guard, PumpRuntime::Stopped)
        };

        if let PumpRuntime::Running { shutdown, handle } = runtime {
            let _ = shutdown.send(true);
            if handle.await.is_err() {
                tracing::warn!("transcription pump task aborted before final drain");
            }
        }
    }

    async fn flush(&self, final_drain: bool) {
        // A request already in flight wins the tick; the buffer keeps
        // accumulating and the skipped audio rides the next flush.
        if !final_drain && self.in_flight.load(Ordering::Acquire) {
            tracing::trace!("transcription in flight, skipping tick");
            return;
        }

        let chunks = self.capture.swap();
        if chunks.is_empty() {
            return;
        }

        let payload: Vec<u8> = chunks.concat();
        if payload.len() < self.min_flush_bytes {
            tracing::trace!(
                bytes = payload.len(),
                threshold = self.min_flush_bytes,
                "flush below threshold, discarding"
            );
            return;
        }

        if let Err(err) = validate_payload(&payload, &self.settings.mime_type, &self.settings) {
            self.controller.report_transcription_failure(&err.to_string());
            return;
        }

        self.in_flight.store(true, Ordering::Release);
        let result = self
            .transcriber
            .transcribe(&payload, &self.settings.mime_type)
            .await;
        self.in_flight.store(false, Ordering::Release);

        match result {
            Ok(text) => {
                let trimmed = text.trim();
                if trimmed.chars().count() > 1 {
                    if let Err(err) = self.controller.on_user_turn(trimmed) {
                        tracing::debug!(error = %err, "transcribed turn rejected");
                    }
                } else {
                    tracing::trace!("transcription returned silence");
                }
            }
            Err(err) => {
                // The audio for this window is gone; the next flush starts
                // from whatever accumulated since the swap.
                self.controller.report_transcription_failure(&err.to_string());
            }
        }
    }
}
