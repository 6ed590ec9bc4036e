// Grounded on `groblegark-coop`'s `cli/src/main.rs`: flatten the config
// struct onto a thin `clap::Parser` wrapper, validate before doing anything
// expensive, convert the top-level result into a process exit code.

mod config;
mod logging;
mod run;

use clap::Parser;
use tracing::error;

use config::Config;

#[derive(Parser)]
#[command(name = "fieldctl", version, about = "Modbus/TCP field-and-panel coupling controller.")]
struct Cli {
    #[command(flatten)]
    config: Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = cli.config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    if let Err(e) = run::run(cli.config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
