//! Half-duplex HMI sync: alternating push (buffer → panel) and pull
//! (panel → buffer) passes with echo suppression (§4.H).
//!
//! Grounded on `original_source/src/Fncs/Fncs.cpp`'s `ManageMdbSvr`. The
//! original multiplexes both directions through one boolean `mode` flag
//! toggled by the caller every cycle; that's modeled here as two
//! functions so each direction reads as its own named operation, while the
//! caller (the controller loop) still alternates between them every
//! `hmi_period`.

use crate::area::{Area, View};
use crate::buffer::{Buffer, Comparison};

/// One register this pass wrote to the panel (buffer → panel direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelWrite {
    pub area: Area,
    pub value: i64,
}

/// Push pass: drains every changed `ToPanel` area (preserving the change
/// flag until the caller confirms the panel write succeeded), and arms
/// echo suppression by silently mirroring the value into `FromPanel` so
/// the pull pass doesn't re-report the command that just went out.
///
/// `areas` should be every area the buffer tracks (drain order follows
/// [`crate::buffer::Buffer::drain`]).
pub fn push_to_panel(buffer: &mut Buffer, areas: &[Area]) -> Vec<PanelWrite> {
    let drained = buffer.drain(View::ToPanel, areas, true);
    let mut writes = Vec::with_capacity(drained.len());
    for (area, value) in drained {
        buffer.reset_changed(View::ToPanel, area);
        let _ = buffer.write(View::FromPanel, area, value, true);
        writes.push(PanelWrite { area, value });
    }
    writes
}

/// Pull pass: for every area open for panel reads, compares the panel's
/// current value against what's buffered and, if different, writes it
/// into `FromPanel` and mirrors it into `Field` as though the value had
/// arrived from a field device. The `FromPanel` change flag is cleared
/// only if the `Field` mirror actually changed something — an unchanged
/// `Field` leaves `FromPanel` flagged for the next pass to retry, exactly
/// as in the original. Areas permitted to also echo back to the panel
/// (`CanWriteToPanel`) get a silent `ToPanel` mirror so their on-screen
/// twin stays in sync.
pub fn pull_from_panel(buffer: &mut Buffer, panel_values: &[(Area, i64)]) {
    for &(area, value) in panel_values {
        if buffer.compare(View::FromPanel, area, value) == Comparison::Equal {
            continue;
        }

        let _ = buffer.write(View::FromPanel, area, value, false);

        if let Ok(true) = buffer.write(View::Field, area, value, false) {
            buffer.reset_changed(View::FromPanel, area);
        }

        if buffer.can_write_to_panel(area) {
            let _ = buffer.write(View::ToPanel, area, value, true);
        }
    }
}

#[cfg(test)]
#[path = "hmi_tests.rs"]
mod tests;
