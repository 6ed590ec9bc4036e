//! The three-view buffered data store: `Field`, `FromPanel`, `ToPanel`
//! (§3 Data Model).
//!
//! Grounded on `original_source/src/Buffers/Buffers.h` / `Buffers.cpp`
//! (`ModbusBuffer`): `AddType`/`SetElement` (area definition), `WriteElement`
//! (no-op on an unchanged value, `silent` suppresses the change flag),
//! `Compare`, `GetData` (zero default on a missing area), `GetChangeFlag`/
//! `SetChangeFlag`, `getChanged` (drain, optionally preserving the flag),
//! and `AreaTracker` (definition-count diagnostics). The C++ `Compare`
//! also returned an `Error` variant for a type mismatch between the stored
//! and probed value; Rust's static typing removes that failure mode
//! entirely, so [`Comparison`] only has `NotFound`/`Equal`/`Different`.

use std::collections::HashMap;

use crate::area::{Area, View, DUMMY_AREA};
use crate::error::{FieldError, FieldResult};

/// Static metadata attached to an area at definition time: independent of
/// which view (`Field`/`FromPanel`/`ToPanel`) is being read or written.
#[derive(Debug, Clone)]
pub struct AreaMeta {
    pub name: String,
    /// Polarity is inverted before it leaves the field device (§4.D).
    pub reverse: bool,
    pub can_write_to_panel: bool,
    pub can_read_from_panel: bool,
    /// When set, a changed `Field` value is routed to this area instead
    /// (§4.E redirection via `areaToWrite`).
    pub redirect: Option<Area>,
}

impl AreaMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reverse: false,
            can_write_to_panel: false,
            can_read_from_panel: false,
            redirect: None,
        }
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn can_write_to_panel(mut self, yes: bool) -> Self {
        self.can_write_to_panel = yes;
        self
    }

    pub fn can_read_from_panel(mut self, yes: bool) -> Self {
        self.can_read_from_panel = yes;
        self
    }

    pub fn redirect_to(mut self, area: Area) -> Self {
        self.redirect = Some(area);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    value: i64,
    changed: bool,
    ever_written: bool,
}

/// Outcome of probing a stored value against a candidate (`ModbusBuffer::Compare`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    NotFound,
    Equal,
    Different,
}

#[derive(Debug, Default)]
struct ViewStore(HashMap<Area, Slot>);

impl ViewStore {
    fn slot(&self, area: Area) -> Option<&Slot> {
        self.0.get(&area)
    }

    fn slot_mut(&mut self, area: Area) -> &mut Slot {
        self.0.entry(area).or_default()
    }
}

/// The coupling engine's buffered data store.
///
/// Every area must be [`Buffer::define`]d before use; after all definitions
/// are made, call [`Buffer::finalize`] once (mirrors `ModbusBuffer::Init`
/// building `readFromPanelList`).
#[derive(Debug, Default)]
pub struct Buffer {
    meta: HashMap<Area, AreaMeta>,
    define_counts: HashMap<Area, u32>,
    field: ViewStore,
    from_panel: ViewStore,
    to_panel: ViewStore,
    read_from_panel_list: Vec<Area>,
    finalized: bool,
}

impl Buffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an area's static metadata. Calling this more than once for
    /// the same area is tracked (see [`Buffer::validate`]) but the later
    /// definition wins, matching `AddType` overwriting a prior `SetElement`.
    pub fn define(&mut self, area: Area, meta: AreaMeta) {
        *self.define_counts.entry(area).or_insert(0) += 1;
        self.meta.insert(area, meta);
    }

    /// Cross-checks `expected` areas (e.g. every area named by a device
    /// table) against how many times each was defined. Returns
    /// (never initialized, initialized more than once) — `AreaTracker`'s
    /// two diagnostics.
    pub fn validate(&self, expected: &[Area]) -> (Vec<Area>, Vec<Area>) {
        let mut never = Vec::new();
        let mut multiple = Vec::new();
        for &area in expected {
            match self.define_counts.get(&area).copied().unwrap_or(0) {
                0 => never.push(area),
                1 => {}
                _ => multiple.push(area),
            }
        }
        (never, multiple)
    }

    /// Builds the cached list of areas open for panel reads. Call once
    /// after every [`Buffer::define`] call.
    pub fn finalize(&mut self) {
        self.read_from_panel_list = self
            .meta
            .iter()
            .filter(|(_, m)| m.can_read_from_panel)
            .map(|(a, _)| *a)
            .collect();
        self.read_from_panel_list.sort();
        self.finalized = true;
    }

    fn store(&self, view: View) -> &ViewStore {
        match view {
            View::Field => &self.field,
            View::FromPanel => &self.from_panel,
            View::ToPanel => &self.to_panel,
        }
    }

    fn store_mut(&mut self, view: View) -> &mut ViewStore {
        match view {
            View::Field => &mut self.field,
            View::FromPanel => &mut self.from_panel,
            View::ToPanel => &mut self.to_panel,
        }
    }

    fn meta(&self, area: Area) -> FieldResult<&AreaMeta> {
        self.meta.get(&area).ok_or(FieldError::AreaOutOfRange)
    }

    pub fn name(&self, area: Area) -> &str {
        self.meta.get(&area).map(|m| m.name.as_str()).unwrap_or("?")
    }

    pub fn is_reverse(&self, area: Area) -> bool {
        self.meta.get(&area).map(|m| m.reverse).unwrap_or(false)
    }

    pub fn can_write_to_panel(&self, area: Area) -> bool {
        self.meta.get(&area).map(|m| m.can_write_to_panel).unwrap_or(false)
    }

    pub fn can_read_from_panel(&self, area: Area) -> bool {
        self.meta.get(&area).map(|m| m.can_read_from_panel).unwrap_or(false)
    }

    /// The area a changed `Field` value should be redirected to
    /// (`areaToWrite`). `None` means no redirect is configured for `area`
    /// — the original's `areatoWrite==0` case, which skips redirection
    /// entirely rather than falling back to `area` itself.
    pub fn area_to_write(&self, area: Area) -> Option<Area> {
        self.meta.get(&area).and_then(|m| m.redirect)
    }

    pub fn read_from_panel_list(&self) -> &[Area] {
        &self.read_from_panel_list
    }

    /// Every area this buffer has metadata for, in a stable (sorted) order —
    /// the list the redirect pass and the HMI push pass walk each cycle.
    pub fn defined_areas(&self) -> Vec<Area> {
        let mut areas: Vec<Area> = self.meta.keys().copied().collect();
        areas.sort();
        areas
    }

    /// Reads the current value, `0` if the area was never written or is
    /// `DUMMY_AREA` (`GetData`'s zero default on a miss).
    pub fn read(&self, view: View, area: Area) -> i64 {
        if area.is_dummy() {
            return 0;
        }
        self.store(view).slot(area).map(|s| s.value).unwrap_or(0)
    }

    /// Writes a value, returning whether it actually changed anything. A
    /// `DUMMY_AREA` write is always a silent no-op. Writing the value
    /// already stored leaves the change flag untouched and reports no
    /// change (`WriteElement`'s "if same value, do nothing" — callers such
    /// as [`crate::hmi`] rely on this return value to decide whether a
    /// downstream flag should also be cleared). `silent` forces the change
    /// flag to stay clear even when the value does change.
    pub fn write(&mut self, view: View, area: Area, value: i64, silent: bool) -> FieldResult<bool> {
        if area.is_dummy() {
            return Ok(false);
        }
        self.meta(area)?;
        let slot = self.store_mut(view).slot_mut(area);
        if slot.ever_written && slot.value == value {
            return Ok(false);
        }
        slot.value = value;
        slot.ever_written = true;
        slot.changed = !silent;
        Ok(true)
    }

    /// Compares a candidate value against what's stored (`Compare`).
    pub fn compare(&self, view: View, area: Area, value: i64) -> Comparison {
        match self.store(view).slot(area) {
            None => Comparison::NotFound,
            Some(s) if !s.ever_written => Comparison::NotFound,
            Some(s) if s.value == value => Comparison::Equal,
            Some(_) => Comparison::Different,
        }
    }

    pub fn has_changed(&self, view: View, area: Area) -> bool {
        self.store(view).slot(area).map(|s| s.changed).unwrap_or(false)
    }

    pub fn set_changed(&mut self, view: View, area: Area, changed: bool) {
        self.store_mut(view).slot_mut(area).changed = changed;
    }

    pub fn reset_changed(&mut self, view: View, area: Area) {
        self.set_changed(view, area, false);
    }

    /// Drains every changed area among `areas`, visited in reverse order
    /// (`getChanged` walks its list back to front). Unless `preserve` is
    /// set, the change flag is cleared as each entry is collected.
    pub fn drain(&mut self, view: View, areas: &[Area], preserve: bool) -> Vec<(Area, i64)> {
        let mut out = Vec::new();
        for &area in areas.iter().rev() {
            let store = self.store_mut(view);
            let slot = store.slot_mut(area);
            if slot.changed {
                out.push((area, slot.value));
                if !preserve {
                    slot.changed = false;
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
