//! Signal primitives: debounce, PLC-style on/off/pulse timers, edge
//! detection, and the toggle latch (§4.A).
//!
//! Grounded on `original_source/src/Signal/Signal.h` (`TimerBase`, `TON`,
//! `TOF`, `TP`, `Debounce`, `Edge`) and `original_source/src/PLC/PLC.h`
//! (`ToggleSignal`). The Arduino `micros()`/`millis()` calls are replaced by
//! an explicit `Instant` parameter threaded through every `run` call (Design
//! Notes: "Arduino ... time primitives replaced by ... a monotonic
//! millisecond clock"), which also makes every timer deterministic to test.

use std::time::{Duration, Instant};

/// Base timer state shared by [`OnDelay`], [`OffDelay`], and [`Pulse`].
#[derive(Debug, Clone, Copy)]
struct TimerState {
    preset: Duration,
    started_at: Option<Instant>,
    q: bool,
}

impl TimerState {
    fn new(preset: Duration) -> Self {
        Self { preset, started_at: None, q: false }
    }

    fn elapsed(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(t0) => now.saturating_duration_since(t0),
            None => Duration::ZERO,
        }
    }
}

/// On-delay timer (`TON`): `Q` goes true `preset` after `IN` goes true, and
/// drops immediately when `IN` goes false.
#[derive(Debug, Clone, Copy)]
pub struct OnDelay(TimerState);

impl OnDelay {
    pub fn new(preset: Duration) -> Self {
        Self(TimerState::new(preset))
    }

    pub fn run(&mut self, input: bool, now: Instant) {
        if input {
            if self.0.started_at.is_none() {
                self.0.started_at = Some(now);
            }
            if !self.0.q && self.0.elapsed(now) >= self.0.preset {
                self.0.q = true;
                self.0.started_at = None;
            }
        } else {
            self.0.started_at = None;
            self.0.q = false;
        }
    }

    pub fn q(&self) -> bool {
        self.0.q
    }

    pub fn et(&self, now: Instant) -> Duration {
        self.0.elapsed(now)
    }
}

/// Off-delay timer (`TOF`): `Q` stays true while `IN` is true and for
/// `preset` after `IN` drops.
#[derive(Debug, Clone, Copy)]
pub struct OffDelay(TimerState);

impl OffDelay {
    pub fn new(preset: Duration) -> Self {
        Self(TimerState::new(preset))
    }

    pub fn run(&mut self, input: bool, now: Instant) {
        if input {
            self.0.started_at = None;
            self.0.q = false;
        } else {
            if self.0.started_at.is_none() {
                self.0.started_at = Some(now);
            }
            if !self.0.q && self.0.elapsed(now) >= self.0.preset {
                self.0.q = true;
                self.0.started_at = None;
            }
        }
    }

    pub fn q(&self) -> bool {
        self.0.q
    }
}

/// Pulse timer (`TP`): `Q` goes true for exactly `preset` on the rising edge
/// of `IN`, regardless of how long `IN` stays high.
#[derive(Debug, Clone, Copy)]
pub struct Pulse(TimerState);

impl Pulse {
    pub fn new(preset: Duration) -> Self {
        Self(TimerState::new(preset))
    }

    pub fn run(&mut self, input: bool, now: Instant) {
        if input && self.0.started_at.is_none() {
            self.0.started_at = Some(now);
            self.0.q = true;
        }

        if self.0.started_at.is_some() && self.0.elapsed(now) >= self.0.preset {
            self.0.q = false;
            self.0.started_at = None;
        }

        if !input && self.0.started_at.is_none() {
            self.0.q = false;
        }
    }

    pub fn q(&self) -> bool {
        self.0.q
    }
}

/// Outputs the last raw input that has held its value continuously for at
/// least `preset`.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    ton: OnDelay,
    stable: bool,
}

impl Debounce {
    pub fn new(preset: Duration) -> Self {
        Self { ton: OnDelay::new(preset), stable: false }
    }

    pub fn run(&mut self, raw: bool, now: Instant) -> bool {
        if raw == self.stable {
            self.ton.run(false, now);
        } else {
            self.ton.run(true, now);
            if self.ton.q() {
                self.stable = raw;
            }
        }
        self.stable
    }
}

/// Rising/falling/any-change edge detector over a boolean input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edge {
    last: bool,
}

impl Edge {
    pub fn rising(&mut self, input: bool) -> bool {
        let r = !self.last && input;
        self.last = input;
        r
    }

    pub fn falling(&mut self, input: bool) -> bool {
        let f = self.last && !input;
        self.last = input;
        f
    }

    pub fn change(&mut self, input: bool) -> bool {
        let c = self.last != input;
        self.last = input;
        c
    }
}

/// Rising-edge latch: on a 0→1 transition of its observed input, flips a
/// passed-in output value between 0 and 1. Falling edges leave the stored
/// output untouched. Stores only the last observed input (§4.A).
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleLatch {
    old_input: i64,
}

impl ToggleLatch {
    pub fn new() -> Self {
        Self { old_input: 0 }
    }

    pub fn old_input(&self) -> i64 {
        self.old_input
    }

    /// Returns the flipped value if a rising edge of `status_in` was
    /// detected, `None` otherwise (falling/no-change edges never flip).
    pub fn apply(&mut self, status_in: i64, current_value: i64) -> Option<i64> {
        if self.old_input != status_in {
            self.old_input = status_in;
            if status_in == 1 {
                return Some(if current_value == 0 { 1 } else { 0 });
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
