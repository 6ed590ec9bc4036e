//! Tracing/logging initialization.
//!
//! Grounded on `groblegark-coop`'s `cli/src/run.rs::init_tracing`: `RUST_LOG`
//! takes priority when the user hasn't overridden `--log-level`, otherwise
//! the flag wins; `try_init` so it's safe to call more than once (tests).

use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

pub fn init_tracing(config: &Config) {
    let filter = if std::env::var("RUST_LOG").is_err() && config.log_level == "info" {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    } else {
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    drop(result);
}
