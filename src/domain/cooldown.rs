//! Cooldown state machine: a fixed budget of forwards per window, where the
//! window restarts when its timer elapses or when the channel has been idle
//! for longer than one window.
use crate::domain::model::CooldownConfig;

const MS_PER_MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownState {
    pub remaining: u32,
    pub capacity: u32,
    pub window_end_ms: i64,
    pub last_event_at_ms: i64,
    pub window_ms: i64,
    /// Whether the event that finds the window expired also spends a unit.
    pub charge_on_reset: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub admitted: bool,
    pub remaining: u32,
}

impl CooldownState {
    pub fn initial(cfg: &CooldownConfig, now_ms: i64) -> Self {
        let capacity = cfg.capacity.max(1);
        let window_ms = i64::try_from(cfg.window_minutes)
            .unwrap_or(i64::MAX)
            .saturating_mul(MS_PER_MINUTE);
        Self {
            remaining: capacity,
            capacity,
            window_end_ms: now_ms.saturating_add(window_ms),
            last_event_at_ms: now_ms,
            window_ms,
            charge_on_reset: cfg.charge_on_reset,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms > self.window_end_ms || now_ms > self.last_event_at_ms.saturating_add(self.window_ms)
    }

    pub fn admit(&mut self, now_ms: i64) -> Admission {
        let admitted = if self.is_expired(now_ms) {
            self.restart(now_ms);
            if self.charge_on_reset {
                self.remaining -= 1;
            }
            true
        } else if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        };

        self.last_event_at_ms = now_ms;
        Admission {
            admitted,
            remaining: self.remaining,
        }
    }

    /// Full budget, window restarting at `now_ms`.
    pub fn reset(&mut self, now_ms: i64) {
        self.restart(now_ms);
        self.last_event_at_ms = now_ms;
    }

    /// Records activity without an admission decision.
    pub fn touch(&mut self, now_ms: i64) {
        self.last_event_at_ms = now_ms;
    }

    fn restart(&mut self, now_ms: i64) {
        self.remaining = self.capacity;
        self.window_end_ms = now_ms.saturating_add(self.window_ms);
    }
}
