//! Wires a loaded [`fieldcore::config::FieldConfig`] into a running
//! [`fieldcore::controller::Controller`] and drives it to completion or
//! shutdown.
//!
//! Grounded on `groblegark-coop`'s `cli/src/run.rs::run`/`prepare` (load
//! config, build the shutdown token, spawn the signal handler, run the
//! session loop) and `cli/src/run.rs`'s SIGTERM/SIGINT handler.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fieldcore::area::Area;
use fieldcore::buffer::Buffer;
use fieldcore::callbacks::{ActivityLoop, WatchdogObserver};
use fieldcore::config::FieldConfig;
use fieldcore::controller::{Controller, TcpFieldConnector};
use fieldcore::modbus::TcpPanelTransport;
use fieldcore::pipeline::{Route, SomethingChanged};
use fieldcore::system::SystemFlags;
use fieldcore::watchdog::WatchdogStatus;

use crate::config::Config;
use crate::logging::init_tracing;

/// Host-side hooks for domain overlays; the core engine only needs logging
/// out of this, since intrusion/HVAC/power-management rules are an explicit
/// Non-goal (out-of-scope collaborators named in §1).
#[derive(Default)]
struct LoggingHost;

impl Route for LoggingHost {
    fn route(&mut self, area: Area, value: i64, _buffer: &Buffer) {
        debug!(area = %area, value, "redirected changed area");
    }
}

impl SomethingChanged for LoggingHost {
    fn something_changed(&mut self, _buffer: &Buffer) {
        debug!("at least one area redirected this cycle");
    }
}

impl ActivityLoop for LoggingHost {
    fn activity_loop(&mut self, _buffer: &mut Buffer) {}
}

impl WatchdogObserver for LoggingHost {
    fn on_watchdog(&mut self, status: &WatchdogStatus) {
        warn!(?status, "watchdog reported an unhealthy cycle");
    }
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    init_tracing(&config);

    let field_config = FieldConfig::load(&config.config)?;

    let mut buffer = Buffer::new();
    field_config.apply_areas(&mut buffer);
    let areas = buffer.defined_areas();

    let devices = field_config.build_devices();
    let gateways = field_config.build_gateways(&devices);
    let toggles = field_config.build_toggles();

    info!(gateways = gateways.len(), devices = devices.len(), "starting field controller");

    let mut controller = Controller::new(buffer, gateways, devices, toggles, SystemFlags::new(), areas);
    let connector = TcpFieldConnector { port: config.field_port };
    let panel = TcpPanelTransport::connect(config.panel_addr).await?;

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let mut host = LoggingHost;
    let result = controller
        .run(&connector, panel, config.gateway_poll_interval(), config.hmi_poll_interval(), &mut host, shutdown)
        .await;

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            error!(error = %e, "controller loop exited with a fault");
            Err(anyhow::anyhow!("controller loop exited: {e}"))
        }
    }
}

/// First SIGTERM/SIGINT requests a clean stop; a second forces an exit.
fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGTERM"),
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGINT"),
        }
        shutdown.cancel();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGTERM again, forcing exit"),
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => info!("received SIGINT again, forcing exit"),
        }
        std::process::exit(130);
    });
}
