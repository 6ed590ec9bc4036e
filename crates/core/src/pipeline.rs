//! Per-gateway cycle glue: redirecting changed `Field` areas to their
//! configured destination and selecting which output channels need a
//! field write (§4.E).
//!
//! Grounded on `original_source/src/Fncs/Fncs.cpp`'s `ManageMdbCli` (the
//! redirect loop calling `route()` per redirected area and `somethingChanged()`
//! once at the end if anything moved) and `DeviceManagement_Write` (selecting
//! `DO`/`AO` channel items whose `Field` value changed). The write pass's
//! actual Modbus I/O and its break-on-first-failure-per-device behavior live
//! in the async controller loop, since they need a live transport; this
//! module only supplies the decision of *what* to write.

use crate::area::{Area, View};
use crate::buffer::Buffer;
use crate::device::{ChannelKind, Device};

/// Notified once per redirected, changed area (`RouteFn`).
pub trait Route {
    fn route(&mut self, area: Area, value: i64, buffer: &Buffer);
}

/// Notified at most once per cycle, after every redirect has run, if at
/// least one area actually changed (`SomethingChangedFn`).
pub trait SomethingChanged {
    fn something_changed(&mut self, buffer: &Buffer);
}

/// Walks `areas` (every area the buffer tracks) and calls `host.route` for
/// every one whose `Field` value changed, whether or not it has a redirect
/// target configured. When a target is configured (`GetAreaToWrite` != 0),
/// the value is also copied to it and the source's change flag is cleared;
/// areas with no target are left with their change flag set so the write
/// pass below picks them up directly. `host.something_changed` fires once,
/// after the whole pass, only if at least one area was actually redirected.
/// Both callbacks are taken off one `host` (rather than two separate
/// parameters) so a single observer can implement both without the caller
/// juggling two live `&mut` borrows of the same value.
pub fn redirect_changed_field_areas(buffer: &mut Buffer, areas: &[Area], host: &mut (impl Route + SomethingChanged)) {
    let mut any_change = false;

    for &area in areas {
        if !buffer.has_changed(View::Field, area) {
            continue;
        }

        let value = buffer.read(View::Field, area);
        if let Some(target) = buffer.area_to_write(area) {
            let _ = buffer.write(View::Field, target, value, false);
            buffer.reset_changed(View::Field, area);
            any_change = true;
        }
        host.route(area, value, buffer);
    }

    if any_change {
        host.something_changed(buffer);
    }
}

/// One output item due to be written to a field device this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWrite {
    pub channel: usize,
    pub item: usize,
    pub area: Area,
    pub value: i64,
}

/// Selects every `DO`/`AO` channel item on `device` whose `Field` value has
/// changed since the last write pass (`DeviceManagement_Write`'s channel
/// scan). Caller is responsible for attempting each write in order and
/// stopping at the first failure — a failed write leaves that area's
/// change flag set so it's retried next cycle, matching the original
/// skipping `ResetElement` on write failure.
pub fn pending_writes(buffer: &Buffer, device: &Device) -> Vec<PendingWrite> {
    let mut out = Vec::new();
    for (channel_idx, channel) in device.channels.iter().enumerate() {
        if !matches!(channel.kind, ChannelKind::DigitalOutput | ChannelKind::AnalogOutput) {
            continue;
        }
        for item in 0..channel.items as usize {
            let Some(area) = device.area_for(channel_idx, item) else {
                continue;
            };
            if buffer.has_changed(View::Field, area) {
                out.push(PendingWrite { channel: channel_idx, item, area, value: buffer.read(View::Field, area) });
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
