//! Priority-scheduled, round-robin device polling within one Modbus
//! gateway (§4.E).
//!
//! Grounded on `original_source/src/PLC/PLC.h` / `PLC.cpp`
//! (`structIP`, `structPriority`, `PriorityMgmt`, `BuildIps`,
//! `GetUsedPriorities`, `GetDevicesByPriority`, `GetJump`): one gateway
//! groups its devices by [`crate::device::Priority`], keeps a cursor per
//! priority (the original's `PriorityMgmt.DeviceIndex`, `-1` meaning
//! "not yet started this sweep"), and round-robins across priorities via
//! `structPriority.Index`. The warm-up sweep (`cursor == -1`) always returns
//! every device at that priority, regardless of jump size; it only happens
//! once, on the very first call, since every subsequent reset — including
//! wrapping back around after a full lap — lands the cursor on `0`, not
//! back on the warm-up sentinel. Per the Design Notes resolution of
//! `GetJump`'s `default: return 0` for `High`, a `High` priority is swept in
//! full every round instead of advancing by a fixed jump.

use std::net::IpAddr;

use crate::device::Priority;
use crate::error_budget::ErrorBudget;

#[derive(Debug, Clone)]
struct PriorityCursor {
    priority: Priority,
    /// Device indices (into the controller's device table) at this priority,
    /// in configuration order.
    devices: Vec<usize>,
    /// `-1` is the original's warm-up sentinel: no sweep has started yet.
    cursor: i32,
}

impl PriorityCursor {
    fn new(priority: Priority, devices: Vec<usize>) -> Self {
        Self { priority, devices, cursor: -1 }
    }

    fn advance(&mut self) -> Vec<usize> {
        if self.devices.is_empty() {
            return Vec::new();
        }
        if self.priority == Priority::High {
            return self.devices.clone();
        }
        if self.cursor < 0 {
            self.cursor = 0;
            return self.devices.clone();
        }

        let jump = self.priority.jump().max(1) as i32;
        let start = self.cursor;
        let mut out = Vec::new();
        let mut idx = start;
        while idx < self.devices.len() as i32 && (idx - start) < jump {
            out.push(self.devices[idx as usize]);
            idx += 1;
        }
        self.cursor = if idx >= self.devices.len() as i32 { 0 } else { idx };
        out
    }
}

/// One Modbus gateway (a distinct field IP address) and the devices
/// reachable through it.
#[derive(Debug)]
pub struct Gateway {
    pub ip: IpAddr,
    cursors: Vec<PriorityCursor>,
    ring: usize,
    errors: ErrorBudget,
}

impl Gateway {
    /// `devices_by_priority` should list every priority actually used by a
    /// device on this gateway, in first-seen order (`GetUsedPriorities`).
    pub fn new(ip: IpAddr, devices_by_priority: Vec<(Priority, Vec<usize>)>, errors: ErrorBudget) -> Self {
        let cursors = devices_by_priority
            .into_iter()
            .map(|(priority, devices)| PriorityCursor::new(priority, devices))
            .collect();
        Self { ip, cursors, ring: 0, errors }
    }

    pub fn errors(&self) -> &ErrorBudget {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorBudget {
        &mut self.errors
    }

    /// Advances the priority ring by one slot and returns the device
    /// indices due for polling this round.
    pub fn next_round(&mut self) -> Vec<usize> {
        if self.cursors.is_empty() {
            return Vec::new();
        }
        let i = self.ring % self.cursors.len();
        self.ring = (self.ring + 1) % self.cursors.len();
        self.cursors[i].advance()
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
