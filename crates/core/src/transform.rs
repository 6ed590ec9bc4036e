//! Per-item read transforms: analog deadband, digital polarity, and the
//! toggle/forwards decision tree (§4.D).
//!
//! Grounded on `original_source/src/Fncs/Fncs.cpp`'s `DeviceManagement_Read`
//! (the `ANALOG_TRESHOLD` deadband, the `IsReverse` polarity flip, and the
//! no-toggle / toggle-without-forwards / toggle-with-forwards branches) and
//! `GetToggleFwdValue`, plus `original_source/src/PLC/PLC.h`'s
//! `ToggleManager`/`ToggleSignalItem`.

use std::collections::HashMap;

use crate::area::{Area, View};
use crate::buffer::Buffer;
use crate::signal::ToggleLatch;

/// An analog reading is only re-evaluated once it has moved more than this
/// many raw units from what's buffered (`ANALOG_TRESHOLD`).
pub const ANALOG_THRESHOLD: i64 = 25;

pub fn analog_should_process(raw_value: i64, buffered_value: i64) -> bool {
    (raw_value - buffered_value).abs() > ANALOG_THRESHOLD
}

/// Applies an area's configured polarity flip to a raw digital reading
/// (`IsReverse`). Readings are carried as `0`/`1`.
pub fn apply_polarity(buffer: &Buffer, area: Area, raw_value: i64) -> i64 {
    if buffer.is_reverse(area) {
        if raw_value == 0 { 1 } else { 0 }
    } else {
        raw_value
    }
}

#[derive(Debug, Clone, Default)]
struct ToggleEntry {
    latch: ToggleLatch,
    /// Other areas whose `Field` value, if any is nonzero, should drive
    /// this toggle instead of its own directly-read input.
    forwards: Vec<Area>,
}

/// The set of digital areas that are toggle-latched rather than passed
/// straight through (`ToggleManager`).
#[derive(Debug, Clone, Default)]
pub struct Toggles {
    entries: HashMap<Area, ToggleEntry>,
}

impl Toggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, area: Area, forwards: Vec<Area>) {
        self.entries.insert(area, ToggleEntry { latch: ToggleLatch::new(), forwards });
    }

    pub fn is_toggle(&self, area: Area) -> bool {
        self.entries.contains_key(&area)
    }

    /// `GetToggleFwdValue`: true if any of `area`'s forward sources
    /// currently holds a positive `Field` value.
    fn any_forward_high(&self, area: Area, buffer: &Buffer) -> bool {
        match self.entries.get(&area) {
            Some(entry) => entry.forwards.iter().any(|&fwd| buffer.read(View::Field, fwd) > 0),
            None => false,
        }
    }

    /// Decides whether a digital reading at `area` should be written out,
    /// and with what value. Returns `None` when nothing should change.
    ///
    /// - No toggle registered: pass the (polarity-corrected) reading
    ///   straight through whenever it differs from what's buffered.
    /// - Toggle, no forwards: flip the buffered output on a rising edge of
    ///   the reading itself.
    /// - Toggle with forwards: flip the buffered output on a rising edge
    ///   of the OR of the forward sources, falling back to the reading
    ///   itself when none of them are high.
    pub fn evaluate_digital(&mut self, area: Area, raw_value: i64, buffered_value: i64, buffer: &Buffer) -> Option<i64> {
        let forwards = match self.entries.get(&area) {
            None => return (raw_value != buffered_value).then_some(raw_value),
            Some(entry) => entry.forwards.clone(),
        };

        let signal = if forwards.is_empty() {
            raw_value
        } else if self.any_forward_high(area, buffer) {
            1
        } else {
            raw_value
        };

        let entry = self.entries.get_mut(&area)?;
        let should_process = signal != buffered_value || signal != entry.latch.old_input();
        if !should_process {
            return None;
        }
        entry.latch.apply(signal, buffered_value)
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
