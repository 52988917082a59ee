//! Heartbeat pump
//!
//! Keeps the engine's timers and animations running while the host is idle.
//! The host polls the pump from its frame callback. Each poll fires at most
//! once, so a late poll only delays the next tick.

use std::time::{Duration, Instant};

pub struct Heartbeat {
    interval: Duration,
    started: Instant,
    next_due: Instant,
    last_tick: Option<u32>,
    stopped: bool,
}

impl Heartbeat {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            started: now,
            next_due: now + interval,
            last_tick: None,
            stopped: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Fire if the interval has elapsed, returning the tick to send.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        if self.stopped || now < self.next_due {
            return None;
        }
        self.next_due = now + self.interval;
        Some(self.tick(now))
    }

    /// Milliseconds since the pump started, after the previous tick.
    ///
    /// Ticks are a 32-bit millisecond counter and wrap after about 49.7
    /// days, like a system tick count. "After" is modulo 2^32.
    fn tick(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.started).as_millis() as u32;
        let tick = match self.last_tick {
            Some(last) if (elapsed.wrapping_sub(last) as i32) <= 0 => last.wrapping_add(1),
            _ => elapsed,
        };
        self.last_tick = Some(tick);
        tick
    }

    /// Stop firing. Returns `false` if the pump was already stopped.
    pub fn stop(&mut self) -> bool {
        !std::mem::replace(&mut self.stopped, true)
    }
}
