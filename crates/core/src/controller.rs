//! The main coupling-engine loop: owns the buffer, every gateway and
//! device, and runs the per-gateway read/redirect/write cycle, the
//! half-duplex HMI sync, and the watchdog/system-flags housekeeping
//! (§5 Concurrency Model, §4 operations end to end).
//!
//! Grounded on `original_source/src/Domo/Domo.h`'s `DomoManager::Update`
//! (one IP's cycle, then either HMI sync or the activity-loop/watchdog
//! callback — never both in the same pass — then the all-gateways-failing
//! hard-reset escape hatch) and
//! `groblegark-coop`'s `crates/mux/src/upstream/health.rs`
//! (`tokio::select!` over a `CancellationToken` plus a
//! `tokio::time::interval` with `MissedTickBehavior::Skip`) for the async
//! run loop shape. Per §5, the controller owns all of its state directly —
//! no `Arc`/`Mutex` — since only the run loop touches it.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::area::{Area, View, AREA_SYSTEM_FLAGS};
use crate::buffer::Buffer;
use crate::callbacks::{ActivityLoop, WatchdogObserver};
use crate::device::{ChannelKind, Device, HwKind};
use crate::error::{FieldError, FieldResult};
use crate::gateway::Gateway;
use crate::hmi::{self, PanelWrite};
use crate::modbus::{FieldTransport, PanelTransport, Table};
use crate::pipeline::{self, Route, SomethingChanged};
use crate::system::SystemFlags;
use crate::transform::{self, Toggles};
use crate::watchdog::{CallbackTimings, WatchdogStatus};

/// A gateway is reconnected fresh every cycle, matching the original's
/// connect/read/write/close-per-pass `ManageMdbCli`. Implemented by the
/// production `TcpFieldTransport` wrapper and by test doubles.
pub trait FieldConnector {
    type Transport: FieldTransport;

    async fn connect(&self, ip: IpAddr) -> FieldResult<Self::Transport>;
}

/// A connector over `tokio-modbus`, one Modbus/TCP port shared by every
/// gateway on the field network.
pub struct TcpFieldConnector {
    pub port: u16,
}

impl FieldConnector for TcpFieldConnector {
    type Transport = crate::modbus::TcpFieldTransport;

    async fn connect(&self, ip: IpAddr) -> FieldResult<Self::Transport> {
        crate::modbus::TcpFieldTransport::connect(SocketAddr::new(ip, self.port)).await
    }
}

fn hw_table(hw: HwKind) -> Table {
    match hw {
        HwKind::Coil => Table::Coil,
        HwKind::Input => Table::Input,
        HwKind::Hold => Table::Hold,
        HwKind::Discrete => Table::Discrete,
    }
}

/// Owns every piece of the coupling engine's state. `areas` is the full,
/// stable list of buffer areas in the order redirects and HMI drains walk
/// them — callers build it once from their [`crate::config::FieldConfig`].
pub struct Controller {
    buffer: Buffer,
    gateways: Vec<Gateway>,
    devices: Vec<Device>,
    toggles: Toggles,
    system: SystemFlags,
    timings: CallbackTimings,
    areas: Vec<Area>,
    hmi_push_next: bool,
}

/// Gateways whose error budget has tripped past this many strikes, on
/// every gateway at once, are treated as total field-network loss
/// (`DomoManager::Update`'s `Errors > 5` condition, checked across all
/// `IPs`).
const HARD_RESET_STRIKE_THRESHOLD: u32 = 5;

impl Controller {
    pub fn new(
        buffer: Buffer,
        gateways: Vec<Gateway>,
        devices: Vec<Device>,
        toggles: Toggles,
        system: SystemFlags,
        areas: Vec<Area>,
    ) -> Self {
        Self {
            buffer,
            gateways,
            devices,
            toggles,
            system,
            timings: CallbackTimings::new(),
            areas,
            hmi_push_next: true,
        }
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut self.buffer
    }

    pub fn timings(&self) -> &CallbackTimings {
        &self.timings
    }

    /// True once every gateway's error budget has run past the hard-reset
    /// threshold — the original's cue to call `NVIC_SystemReset()`. A
    /// hosted service has no firmware reset vector, so the run loop
    /// surfaces this as [`FieldError::SystemicFault`] instead, for the
    /// binary entry point to act on (process exit, orchestrator restart).
    pub fn should_hard_reset(&self) -> bool {
        !self.gateways.is_empty() && self.gateways.iter().all(|g| g.errors().strikes() > HARD_RESET_STRIKE_THRESHOLD)
    }

    /// Runs one device's read pass: banks through its input channels,
    /// decodes each item, applies the analog deadband / polarity / toggle
    /// transform, and buffers the result. Errors are recorded against the
    /// device's own budget; the gateway-level budget is the caller's
    /// responsibility (`GenericPrgDevice::Read` plus `DeviceManagement_Read`).
    async fn poll_device<T: FieldTransport>(&mut self, transport: &mut T, device_idx: usize, now: Instant) -> FieldResult<()> {
        let unit_id = self.devices[device_idx].unit_id;
        let channel_count = self.devices[device_idx].channels.len();

        for channel_idx in 0..channel_count {
            let channel = self.devices[device_idx].channels[channel_idx];
            if !matches!(channel.kind, ChannelKind::AnalogInput | ChannelKind::DigitalInput) {
                continue;
            }

            let plan = self.devices[device_idx].next_bank(&channel);
            let table = hw_table(channel.hw);

            let read_result = if channel.kind == ChannelKind::DigitalInput {
                transport
                    .read_bits(unit_id, table, plan.starting_addr, plan.items)
                    .await
                    .map(|bits| bits.into_iter().map(|b| if b { 1 } else { 0 }).collect::<Vec<i64>>())
            } else {
                let word_count = plan.items * channel.items_per_call;
                transport
                    .read_words(unit_id, table, plan.starting_addr, word_count)
                    .await
                    .map(|words| decode_analog_words(&words, channel.items_per_call))
            };

            let values = match read_result {
                Ok(v) => v,
                Err(e) => {
                    self.devices[device_idx].errors_mut().record(true, now);
                    return Err(e);
                }
            };

            for (offset, raw_value) in values.into_iter().enumerate() {
                let Some(area) = self.devices[device_idx].area_for(channel_idx, plan.start_index as usize + offset) else {
                    continue;
                };
                self.apply_reading(channel.kind, area, raw_value);
            }
        }

        self.devices[device_idx].errors_mut().record(false, now);
        Ok(())
    }

    fn apply_reading(&mut self, kind: ChannelKind, area: Area, raw_value: i64) {
        match kind {
            ChannelKind::DigitalInput => {
                let polarity_corrected = transform::apply_polarity(&self.buffer, area, raw_value);
                let buffered = self.buffer.read(View::Field, area);
                if let Some(new_value) = self.toggles.evaluate_digital(area, polarity_corrected, buffered, &self.buffer) {
                    let _ = self.buffer.write(View::Field, area, new_value, false);
                }
            }
            ChannelKind::AnalogInput => {
                let buffered = self.buffer.read(View::Field, area);
                if transform::analog_should_process(raw_value, buffered) {
                    let _ = self.buffer.write(View::Field, area, raw_value, false);
                }
            }
            _ => {}
        }
    }

    /// Writes every pending `DO`/`AO` item for one device, stopping at the
    /// first failed write and leaving that area (and anything after it)
    /// flagged for retry next cycle (`DeviceManagement_Write`).
    async fn write_device<T: FieldTransport>(&mut self, transport: &mut T, device_idx: usize, now: Instant) {
        let pending = pipeline::pending_writes(&self.buffer, &self.devices[device_idx]);
        let unit_id = self.devices[device_idx].unit_id;

        for write in pending {
            let channel = self.devices[device_idx].channels[write.channel];
            let result = match channel.hw {
                HwKind::Coil => transport.write_coil(unit_id, channel.starting_addr + write.item as u16, write.value != 0).await,
                HwKind::Hold => {
                    transport
                        .write_holding_register(unit_id, channel.starting_addr + write.item as u16, write.value as u16)
                        .await
                }
                _ => Err(FieldError::ConfigFault),
            };

            match result {
                Ok(()) => self.buffer.reset_changed(View::Field, write.area),
                Err(_) => {
                    self.devices[device_idx].errors_mut().record(true, now);
                    break;
                }
            }
        }
    }

    /// Runs one full cycle against one gateway: connect, read every due
    /// device, redirect changed areas, write every pending output
    /// (`ManageMdbCli`). No-ops if the gateway's own error budget says to
    /// back off this cycle.
    pub async fn poll_gateway<C: FieldConnector>(
        &mut self,
        gateway_idx: usize,
        connector: &C,
        host: &mut (impl Route + SomethingChanged),
        now: Instant,
    ) -> FieldResult<()> {
        if !self.gateways[gateway_idx].errors().should_attempt(now) {
            return Ok(());
        }

        let ip = self.gateways[gateway_idx].ip;
        let due = self.gateways[gateway_idx].next_round();
        if due.is_empty() {
            return Ok(());
        }

        let mut transport = match connector.connect(ip).await {
            Ok(t) => t,
            Err(e) => {
                self.gateways[gateway_idx].errors_mut().record(true, now);
                return Err(e);
            }
        };

        let mut gateway_failed = false;
        for &device_idx in &due {
            if !self.devices[device_idx].errors().should_attempt(now) {
                continue;
            }
            if self.poll_device(&mut transport, device_idx, now).await.is_err() {
                gateway_failed = true;
            }
        }

        pipeline::redirect_changed_field_areas(&mut self.buffer, &self.areas, host);

        for &device_idx in &due {
            self.write_device(&mut transport, device_idx, now).await;
        }

        self.gateways[gateway_idx].errors_mut().record(gateway_failed, now);
        Ok(())
    }

    /// Runs one half-duplex HMI pass, alternating push and pull every call
    /// (`ManageMdbSvr`'s mode toggle). On a push pass the returned writes
    /// are the caller's responsibility to send to the panel transport; on a
    /// pull pass the caller supplies what it already read from the panel.
    pub async fn hmi_cycle<T: PanelTransport>(&mut self, panel: &mut T) -> FieldResult<Vec<PanelWrite>> {
        let push_this_pass = self.hmi_push_next;
        self.hmi_push_next = !self.hmi_push_next;

        if push_this_pass {
            let writes = hmi::push_to_panel(&mut self.buffer, &self.areas);
            for w in &writes {
                panel.write_register(w.area.raw(), w.value).await?;
            }
            Ok(writes)
        } else {
            let mut panel_values = Vec::with_capacity(self.buffer.read_from_panel_list().len());
            for &area in self.buffer.read_from_panel_list() {
                let value = panel.read_register(area.raw()).await?;
                panel_values.push((area, value));
            }
            hmi::pull_from_panel(&mut self.buffer, &panel_values);
            Ok(Vec::new())
        }
    }

    /// Recomputes the system status bitmask and pushes it out to the panel
    /// view, returning the mask (`SystemManager::getBitmask`, consumed by
    /// the original at `AREA_SYSTEM_FLAGS`).
    pub fn push_system_flags(&mut self) -> u16 {
        let mask = self.system.bitmask();
        let _ = self.buffer.write(View::ToPanel, AREA_SYSTEM_FLAGS, mask as i64, false);
        mask
    }

    pub fn system_mut(&mut self) -> &mut SystemFlags {
        &mut self.system
    }

    /// Records one activity-loop execution against the watchdog and
    /// classifies current health (`UpdateTiming` + `CheckWatchdog`).
    pub fn check_watchdog(&mut self, exec: Duration, now: Instant, observer: &mut impl WatchdogObserver) -> WatchdogStatus {
        self.timings.record_activity_loop(exec, now);
        let status = self.timings.check(now);
        if !status.is_healthy() {
            observer.on_watchdog(&status);
        }
        status
    }

    /// Drives the whole engine until `shutdown` is cancelled: one round
    /// through every gateway, then — per completed sweep, never both —
    /// either an HMI pass or the activity-loop/watchdog/system-flags
    /// housekeeping (`DomoManager::Update`'s single decision point: "has
    /// enough time passed since the last panel poll?", else run the
    /// callback). `hmi_period` is the minimum time that must have elapsed
    /// since the last HMI pass for it to be due again; it no longer ticks
    /// independently of the gateway sweep.
    pub async fn run<C: FieldConnector, P: PanelTransport>(
        &mut self,
        connector: &C,
        mut panel: P,
        gateway_period: Duration,
        hmi_period: Duration,
        host: &mut (impl ActivityLoop + Route + SomethingChanged + WatchdogObserver),
        shutdown: CancellationToken,
    ) -> FieldResult<()> {
        let mut gateway_timer = tokio::time::interval(gateway_period);
        gateway_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut last_hmi_at: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                _ = gateway_timer.tick() => {
                    let now = Instant::now();
                    for gw in 0..self.gateways.len() {
                        let _ = self.poll_gateway(gw, connector, host, now).await;
                    }
                    if self.should_hard_reset() {
                        return Err(FieldError::SystemicFault);
                    }

                    let hmi_due = last_hmi_at.map_or(true, |t0| now.saturating_duration_since(t0) >= hmi_period);
                    if hmi_due {
                        let _ = self.hmi_cycle(&mut panel).await;
                        last_hmi_at = Some(now);
                    } else {
                        let start = Instant::now();
                        host.activity_loop(&mut self.buffer);
                        self.check_watchdog(start.elapsed(), Instant::now(), host);
                        self.push_system_flags();
                    }
                }
            }
        }
    }
}

/// Decodes a raw word slice into one value per logical item: a plain word
/// per item when `items_per_call == 1`, or an IEEE-754 float (rounded to
/// the nearest integer — the buffer's only numeric representation) per
/// register pair when `items_per_call == 2` (`get_float`).
fn decode_analog_words(words: &[u16], items_per_call: u16) -> Vec<i64> {
    if items_per_call == 2 {
        words.chunks(2).filter(|c| c.len() == 2).map(|c| crate::device::decode_float([c[0], c[1]]).round() as i64).collect()
    } else {
        words.iter().map(|&w| w as i64).collect()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
