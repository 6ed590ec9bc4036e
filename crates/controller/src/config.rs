//! Command-line configuration for the field controller.
//!
//! Grounded on `groblegark-coop`'s `mux/src/config.rs` (`MuxConfig`): one
//! `clap::Args` struct, `#[arg(long, default_value..., env = ...)]` per
//! field, `_ms` knobs paired with an `_interval()` accessor.

#[derive(Debug, Clone, clap::Args)]
pub struct Config {
    /// Path to the declarative field configuration JSON file.
    #[arg(long, env = "FIELDCTL_CONFIG")]
    pub config: std::path::PathBuf,

    /// TCP port every field gateway listens on.
    #[arg(long, default_value_t = 502, env = "FIELDCTL_FIELD_PORT")]
    pub field_port: u16,

    /// Host:port of the HMI panel's Modbus/TCP server.
    #[arg(long, env = "FIELDCTL_PANEL_ADDR")]
    pub panel_addr: std::net::SocketAddr,

    /// Gateway poll period in milliseconds.
    #[arg(long, default_value_t = 200, env = "FIELDCTL_GATEWAY_POLL_MS")]
    pub gateway_poll_ms: u64,

    /// Minimum time in milliseconds since the last HMI sync before it's due
    /// again; checked once per completed gateway sweep, not on its own timer.
    #[arg(long, default_value_t = 100, env = "FIELDCTL_HMI_POLL_MS")]
    pub hmi_poll_ms: u64,

    /// Log level (`error`, `warn`, `info`, `debug`, `trace`, or an `EnvFilter` string).
    #[arg(long, default_value = "info", env = "FIELDCTL_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format (`pretty` or `json`).
    #[arg(long, default_value = "pretty", env = "FIELDCTL_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    pub fn gateway_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.gateway_poll_ms)
    }

    pub fn hmi_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.hmi_poll_ms)
    }

    /// Rejects nonsensical combinations before anything is dialed or bound
    /// (ground: `mux/src/config.rs`'s sibling crate validates in the same
    /// fail-fast spot, before `run()` starts spawning tasks).
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.gateway_poll_ms == 0 {
            anyhow::bail!("--gateway-poll-ms must be greater than zero");
        }
        if self.hmi_poll_ms == 0 {
            anyhow::bail!("--hmi-poll-ms must be greater than zero");
        }
        Ok(())
    }
}
