use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::cooldown::{Admission, CooldownState};
use crate::domain::model::CooldownConfig;
use crate::ports::clock::Clock;

/// Shared gate in front of the notifier. Every read and write of the cooldown
/// state, including the clock read, happens under one lock so the ingestion
/// endpoint and the `!enable` command cannot interleave.
pub struct RateLimiter {
    state: Mutex<CooldownState>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(cfg: &CooldownConfig, clock: Arc<dyn Clock>) -> Self {
        let state = CooldownState::initial(cfg, clock.now_ms());
        Self {
            state: Mutex::new(state),
            clock,
        }
    }

    pub async fn admit(&self) -> Admission {
        let mut state = self.state.lock().await;
        let now_ms = self.clock.now_ms();
        let admission = state.admit(now_ms);
        debug!(
            admitted = admission.admitted,
            remaining = admission.remaining,
            window_end_ms = state.window_end_ms,
            "Cooldown admission"
        );
        admission
    }

    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        let now_ms = self.clock.now_ms();
        state.reset(now_ms);
        debug!(remaining = state.remaining, window_end_ms = state.window_end_ms, "Cooldown reset");
    }

    pub async fn touch(&self) {
        let mut state = self.state.lock().await;
        let now_ms = self.clock.now_ms();
        state.touch(now_ms);
    }

    pub async fn snapshot(&self) -> CooldownState {
        *self.state.lock().await
    }
}
