//! Pedestal TUI entry point.

use clap::Parser;
use pedestal_app::Runtime;
use pedestal_core::SystemEnv;
use pedestal_tui::{Args, ConnectionMode, TerminalDriver, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _log_guard = logging::init(&args.log_file, &args.log_level)?;

    let config = args.runtime_config();
    config.session.stream.validate()?;
    tracing::info!(
        server = %args.display_addr(),
        cadence_ms = args.cadence_ms,
        delayed_first = args.delayed_first,
        "pedestal controller starting"
    );

    let mode = match args.server.clone() {
        Some(addr) => ConnectionMode::Remote(addr),
        None => ConnectionMode::Simulated,
    };

    let driver = TerminalDriver::new(mode)?;
    let runtime = Runtime::new(driver, SystemEnv::new(), args.display_addr(), config)?;

    Ok(runtime.run().await?)
}
