//! Declarative device/area/toggle tables, loaded from a JSON file (§7
//! Configuration).
//!
//! Grounded on `groblegark-coop`'s `crates/mux/src/credential/mod.rs`
//! (`CredentialConfig`/`AccountConfig`): a plain serde DTO tree kept
//! separate from the domain types in [`crate::area`]/[`crate::device`], with
//! a loader following the same `read_to_string` + `serde_json::from_str`
//! shape as `mux::run`'s credential-config load.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::area::Area;
use crate::buffer::{AreaMeta, Buffer};
use crate::device::{Channel, ChannelKind, Device, HwKind, Priority};
use crate::error_budget::ErrorBudget;
use crate::gateway::Gateway;
use crate::transform::Toggles;

/// Top-level configuration file: every area, device, and toggle the
/// controller should know about.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub areas: Vec<AreaConfig>,
    #[serde(default)]
    pub toggles: Vec<ToggleConfig>,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

/// One buffer area's static metadata (`AreaMeta`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaConfig {
    pub area: u16,
    pub name: String,
    #[serde(default)]
    pub reverse: bool,
    #[serde(default)]
    pub can_write_to_panel: bool,
    #[serde(default)]
    pub can_read_from_panel: bool,
    #[serde(default)]
    pub redirect_to: Option<u16>,
}

/// A toggle-latched area and the other areas that can drive it
/// (`ToggleManager::Add`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleConfig {
    pub area: u16,
    #[serde(default)]
    pub forwards: Vec<u16>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityConfig {
    Low,
    Medium,
    Normal,
    High,
}

impl From<PriorityConfig> for Priority {
    fn from(p: PriorityConfig) -> Self {
        match p {
            PriorityConfig::Low => Priority::Low,
            PriorityConfig::Medium => Priority::Medium,
            PriorityConfig::Normal => Priority::Normal,
            PriorityConfig::High => Priority::High,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKindConfig {
    AnalogInput,
    AnalogOutput,
    DigitalInput,
    DigitalOutput,
}

impl From<ChannelKindConfig> for ChannelKind {
    fn from(k: ChannelKindConfig) -> Self {
        match k {
            ChannelKindConfig::AnalogInput => ChannelKind::AnalogInput,
            ChannelKindConfig::AnalogOutput => ChannelKind::AnalogOutput,
            ChannelKindConfig::DigitalInput => ChannelKind::DigitalInput,
            ChannelKindConfig::DigitalOutput => ChannelKind::DigitalOutput,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HwKindConfig {
    Coil,
    Input,
    Hold,
    Discrete,
}

impl From<HwKindConfig> for HwKind {
    fn from(k: HwKindConfig) -> Self {
        match k {
            HwKindConfig::Coil => HwKind::Coil,
            HwKindConfig::Input => HwKind::Input,
            HwKindConfig::Hold => HwKind::Hold,
            HwKindConfig::Discrete => HwKind::Discrete,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub kind: ChannelKindConfig,
    pub hw: HwKindConfig,
    pub starting_addr: u16,
    pub items: u16,
    #[serde(default = "default_items_per_call")]
    pub items_per_call: u16,
}

fn default_items_per_call() -> u16 {
    1
}

/// A field device's connection info, channel table, and error budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub ip: std::net::IpAddr,
    pub unit_id: u8,
    pub priority: PriorityConfig,
    pub channels: Vec<ChannelConfig>,
    /// Buffer areas backing every channel item, in channel order.
    pub io_areas: Vec<u16>,
    #[serde(default = "default_max_strikes")]
    pub max_strikes: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

fn default_max_strikes() -> u32 {
    5
}

fn default_cooldown_ms() -> u64 {
    5_000
}

impl FieldConfig {
    /// Loads and parses a configuration file (mirrors `mux::run`'s
    /// credential-config load: read the whole file, then deserialize it).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading field config {}: {e}", path.display()))?;
        let config: FieldConfig = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("parsing field config {}: {e}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            areas = config.areas.len(),
            devices = config.devices.len(),
            toggles = config.toggles.len(),
            "loaded field configuration"
        );
        Ok(config)
    }

    /// Populates a [`Buffer`] with every configured area and finalizes it.
    pub fn apply_areas(&self, buffer: &mut Buffer) {
        for a in &self.areas {
            let mut meta = AreaMeta::new(a.name.clone())
                .reverse(a.reverse)
                .can_write_to_panel(a.can_write_to_panel)
                .can_read_from_panel(a.can_read_from_panel);
            if let Some(redirect) = a.redirect_to {
                meta = meta.redirect_to(Area::new(redirect));
            }
            buffer.define(Area::new(a.area), meta);
        }
        buffer.finalize();
    }

    /// Builds the toggle table (`ToggleManager::Add` per entry).
    pub fn build_toggles(&self) -> Toggles {
        let mut toggles = Toggles::new();
        for t in &self.toggles {
            let forwards = t.forwards.iter().map(|&raw| Area::new(raw)).collect();
            toggles.register(Area::new(t.area), forwards);
        }
        toggles
    }

    /// Builds every configured device (`BuildIps`'s per-device construction,
    /// minus the IP grouping, which [`Self::build_gateways`] does).
    pub fn build_devices(&self) -> Vec<Device> {
        self.devices
            .iter()
            .map(|d| {
                let channels: Vec<Channel> = d
                    .channels
                    .iter()
                    .map(|c| Channel {
                        kind: c.kind.into(),
                        hw: c.hw.into(),
                        starting_addr: c.starting_addr,
                        items: c.items,
                        items_per_call: c.items_per_call,
                    })
                    .collect();
                let io_areas = d.io_areas.iter().map(|&raw| Area::new(raw)).collect();
                let errors = ErrorBudget::new(d.max_strikes, std::time::Duration::from_millis(d.cooldown_ms));
                Device::new(d.name.clone(), d.ip, d.unit_id, d.priority.into(), channels, io_areas, errors)
            })
            .collect()
    }

    /// Groups the built devices by IP into one [`Gateway`] per distinct
    /// address, each device bucketed by priority in first-seen order
    /// (`BuildIps` + `GetUsedPriorities` + `GetDevicesByPriority`).
    pub fn build_gateways(&self, devices: &[Device]) -> Vec<Gateway> {
        let mut by_ip: HashMap<std::net::IpAddr, Vec<usize>> = HashMap::new();
        for (idx, d) in devices.iter().enumerate() {
            by_ip.entry(d.ip).or_default().push(idx);
        }

        let mut ips: Vec<std::net::IpAddr> = by_ip.keys().copied().collect();
        ips.sort();

        ips.into_iter()
            .map(|ip| {
                let indices = &by_ip[&ip];
                let mut order: Vec<Priority> = Vec::new();
                let mut grouped: HashMap<Priority, Vec<usize>> = HashMap::new();
                for &idx in indices {
                    let p = devices[idx].priority;
                    if !grouped.contains_key(&p) {
                        order.push(p);
                    }
                    grouped.entry(p).or_default().push(idx);
                }
                let by_priority = order.into_iter().map(|p| (p, grouped.remove(&p).unwrap_or_default())).collect();
                let errors = ErrorBudget::new(default_max_strikes(), duration_from_default_cooldown());
                Gateway::new(ip, by_priority, errors)
            })
            .collect()
    }
}

fn duration_from_default_cooldown() -> std::time::Duration {
    std::time::Duration::from_millis(default_cooldown_ms())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
