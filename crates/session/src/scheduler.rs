//! Response scheduler state
//!
//! Tracks at most one pending agent response per session. Timers are spawned
//! by the controller and never trusted: a firing timer must pass late
//! validation against the current turn state before it may emit a turn, so a
//! superseded timer fires harmlessly and is discarded. Handles are retained
//! only so `cancel_all` can abort whatever is still sleeping at session end.

use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;

use roundtable_core::{Agent, DifficultyTier};

/// The single response the scheduler is currently committed to
#[derive(Debug, Clone)]
pub(crate) struct PendingResponse {
    /// Turn index the response answers
    pub turn_index: u64,
    /// Agent chosen at scheduling time
    pub agent: Agent,
}

/// Pending-response slot plus outstanding timer handles
#[derive(Default)]
pub(crate) struct ResponseScheduler {
    pending: Option<PendingResponse>,
    timers: Vec<JoinHandle<()>>,
}

impl ResponseScheduler {
    /// Whether a response for exactly this turn index is already pending.
    pub fn is_pending_for(&self, turn_index: u64) -> bool {
        self.pending
            .as_ref()
            .map(|p| p.turn_index == turn_index)
            .unwrap_or(false)
    }

    pub fn pending_turn(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.turn_index)
    }

    /// Commit to a response and retain its timer handle. An older pending
    /// entry is simply overwritten; its timer keeps sleeping and is rejected
    /// by late validation when it fires.
    pub fn arm(&mut self, turn_index: u64, agent: Agent, timer: JoinHandle<()>) {
        self.timers.retain(|handle| !handle.is_finished());
        self.timers.push(timer);
        self.pending = Some(PendingResponse { turn_index, agent });
    }

    /// Take the pending response if it matches the firing turn index.
    pub fn take_if(&mut self, turn_index: u64) -> Option<PendingResponse> {
        if self.is_pending_for(turn_index) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Abort every outstanding timer and clear the slot.
    pub fn cancel_all(&mut self) {
        for handle in self.timers.drain(..) {
            handle.abort();
        }
        self.pending = None;
    }
}

/// Tier base delay plus a uniform random addend in `[0, jitter)`.
pub(crate) fn response_delay<R: Rng>(
    tier: DifficultyTier,
    jitter: Duration,
    rng: &mut R,
) -> Duration {
    let jitter_ms = jitter.as_millis() as u64;
    let addend = if jitter_ms == 0 {
        0
    } else {
        rng.gen_range(0..jitter_ms)
    };
    tier.base_delay() + Duration::from_millis(addend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_delay_within_tier_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let jitter = Duration::from_millis(2000);

        for _ in 0..100 {
            let delay = response_delay(DifficultyTier::Hard, jitter, &mut rng);
            assert!(delay >= Duration::from_millis(3000));
            assert!(delay < Duration::from_millis(5000));
        }
    }

    #[test]
    fn test_zero_jitter_is_exact_base() {
        let mut rng = StdRng::seed_from_u64(5);
        let delay = response_delay(DifficultyTier::Easy, Duration::ZERO, &mut rng);
        assert_eq!(delay, Duration::from_millis(8000));
    }

    #[test]
    fn test_tier_bases_ordered() {
        assert!(DifficultyTier::Easy.base_delay() > DifficultyTier::Medium.base_delay());
        assert!(DifficultyTier::Medium.base_delay() > DifficultyTier::Hard.base_delay());
    }
}
