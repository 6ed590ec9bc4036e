//! Cycle-timing watchdog: an exponential moving average per measured
//! callback, spike detection, and the blocked/overload/unstable/inactive
//! classifiers (§4.K).
//!
//! Grounded on `original_source/src/Domo/Domo.h` (`ExecTiming`,
//! `CallbackTimings`, `UpdateTiming`, `CheckWatchdog`). The original's
//! "inactive" branch is present in the struct but commented out in
//! `CheckWatchdog` itself; per the Design Notes resolution of that Open
//! Question, it's implemented here rather than left dormant.

use std::time::{Duration, Instant};

const EMA_ALPHA: f64 = 0.1;
const DEFAULT_SPIKE_THRESHOLD_FACTOR: f64 = 11.5;

const BLOCKED_MS: u64 = 120;
const ACTIVITY_OVERLOAD_AVG_MS: f64 = 70.0;
const UPDATE_CYCLE_OVERLOAD_LAST_MS: u64 = 150;
const UPDATE_CYCLE_OVERLOAD_AVG_MS: f64 = 120.0;
const UNSTABLE_SPIKE_COUNT: u32 = 10;
const UNSTABLE_WINDOW: Duration = Duration::from_secs(60);
const INACTIVE_WINDOW: Duration = Duration::from_secs(60);

/// Timing history for one repeatedly-invoked callback.
#[derive(Debug, Clone, Copy)]
pub struct ExecTiming {
    name: &'static str,
    last_ms: u64,
    avg: f64,
    spike: bool,
    max_spike_ms: u64,
    spike_count: u32,
    last_spike_at: Option<Instant>,
    last_exec_at: Option<Instant>,
}

impl ExecTiming {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            last_ms: 0,
            avg: 0.0,
            spike: false,
            max_spike_ms: 0,
            spike_count: 0,
            last_spike_at: None,
            last_exec_at: None,
        }
    }

    /// Records one execution's duration, updates the EMA, and flags a
    /// spike when this execution exceeds `avg * threshold` (`UpdateTiming`).
    fn record(&mut self, exec: Duration, threshold: f64, now: Instant) {
        let exec_ms = exec.as_millis() as u64;
        self.last_ms = exec_ms;
        self.last_exec_at = Some(now);

        if self.avg == 0.0 {
            self.avg = exec_ms as f64;
            return;
        }

        self.avg = self.avg * (1.0 - EMA_ALPHA) + exec_ms as f64 * EMA_ALPHA;

        let was_spike = self.spike;
        self.spike = exec_ms as f64 > self.avg * threshold;

        if self.spike {
            self.max_spike_ms = self.max_spike_ms.max(exec_ms);
            self.spike_count += 1;
            self.last_spike_at = Some(now);

            if !was_spike {
                tracing::warn!(
                    callback = self.name,
                    exec_ms,
                    avg = self.avg,
                    threshold_ms = self.avg * threshold,
                    "execution spike"
                );
            }
        }
    }

    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }

    pub fn avg(&self) -> f64 {
        self.avg
    }
}

/// Timing history for every callback the watchdog tracks.
#[derive(Debug, Clone, Copy)]
pub struct CallbackTimings {
    pub something_changed: ExecTiming,
    pub route: ExecTiming,
    pub activity_loop: ExecTiming,
    pub update_cycle: ExecTiming,
    pub spike_threshold_factor: f64,
}

impl Default for CallbackTimings {
    fn default() -> Self {
        Self {
            something_changed: ExecTiming::new("somethingChanged"),
            route: ExecTiming::new("route"),
            activity_loop: ExecTiming::new("activityLoop"),
            update_cycle: ExecTiming::new("updateCycle"),
            spike_threshold_factor: DEFAULT_SPIKE_THRESHOLD_FACTOR,
        }
    }
}

impl CallbackTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_something_changed(&mut self, exec: Duration, now: Instant) {
        let threshold = self.spike_threshold_factor;
        self.something_changed.record(exec, threshold, now);
    }

    pub fn record_route(&mut self, exec: Duration, now: Instant) {
        let threshold = self.spike_threshold_factor;
        self.route.record(exec, threshold, now);
    }

    pub fn record_activity_loop(&mut self, exec: Duration, now: Instant) {
        let threshold = self.spike_threshold_factor;
        self.activity_loop.record(exec, threshold, now);
    }

    pub fn record_update_cycle(&mut self, exec: Duration, now: Instant) {
        let threshold = self.spike_threshold_factor;
        self.update_cycle.record(exec, threshold, now);
    }

    /// Classifies current health (`CheckWatchdog`). Later checks can
    /// override an earlier reason within the same pass exactly as the
    /// original: the `activityLoop` checks are mutually exclusive, but the
    /// `updateCycle` checks always run afterward and may overwrite them.
    pub fn check(&self, now: Instant) -> WatchdogStatus {
        let mut status = WatchdogStatus::default();
        let t = &self.activity_loop;

        if t.last_ms > BLOCKED_MS {
            status.blocked = true;
            status.reason = Some("activityLoop blocked (>120ms)");
        } else if t.avg > ACTIVITY_OVERLOAD_AVG_MS {
            status.overload = true;
            status.reason = Some("activityLoop avg too high (>70ms)");
        } else if t.spike_count > UNSTABLE_SPIKE_COUNT
            && t.last_spike_at.map(|ts| now.saturating_duration_since(ts) < UNSTABLE_WINDOW).unwrap_or(false)
        {
            status.unstable = true;
            status.reason = Some("too many spikes in 60s");
        }

        if status.reason.is_none() {
            if let Some(last_exec) = t.last_exec_at {
                if now.saturating_duration_since(last_exec) > INACTIVE_WINDOW {
                    status.inactive = true;
                    status.reason = Some("no activityLoop execution for 60s");
                }
            }
        }

        let u = &self.update_cycle;
        if u.last_ms > UPDATE_CYCLE_OVERLOAD_LAST_MS {
            status.overload = true;
            status.reason = Some("update cycle too slow (>150ms)");
        }
        if u.avg > UPDATE_CYCLE_OVERLOAD_AVG_MS {
            status.overload = true;
            status.reason = Some("update cycle avg too high (>120ms)");
        }

        status
    }
}

/// One watchdog classification pass's outcome (`WatchdogStatus`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchdogStatus {
    pub overload: bool,
    pub blocked: bool,
    pub unstable: bool,
    pub inactive: bool,
    pub reason: Option<&'static str>,
}

impl WatchdogStatus {
    pub fn is_healthy(&self) -> bool {
        self.reason.is_none()
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
