//! Wall-clock source in epoch milliseconds, injectable so cooldown windows can
//! be driven deterministically.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}
