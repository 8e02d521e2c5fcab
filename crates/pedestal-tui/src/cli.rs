//! Command line arguments.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use pedestal_app::RuntimeConfig;
use pedestal_core::{FirstEmission, SessionConfig, StreamConfig};

/// Pedestal terminal controller
#[derive(Parser, Debug)]
#[command(name = "pedestal-tui")]
#[command(about = "Drive a motorized pedestal through a device server")]
#[command(version)]
pub struct Args {
    /// Device server address (`host:port`)
    ///
    /// If not provided, runs against an in-process simulated server.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Milliseconds between streamed commands while a direction is held
    #[arg(long, default_value_t = 2)]
    pub cadence_ms: u64,

    /// Send the first streamed command one period after the press instead of
    /// immediately
    #[arg(long)]
    pub delayed_first: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Log file. The terminal belongs to the UI, so logs never go to stderr.
    #[arg(long, default_value = "pedestal-tui.log")]
    pub log_file: PathBuf,
}

impl Args {
    /// Runtime configuration selected by the arguments.
    ///
    /// Not validated here. [`pedestal_app::Runtime::new`] rejects a zero
    /// cadence.
    pub fn runtime_config(&self) -> RuntimeConfig {
        let first_emission =
            if self.delayed_first { FirstEmission::AfterPeriod } else { FirstEmission::Immediate };

        RuntimeConfig {
            session: SessionConfig {
                stream: StreamConfig {
                    cadence: Duration::from_millis(self.cadence_ms),
                    first_emission,
                },
            },
            ..RuntimeConfig::default()
        }
    }

    /// Address shown in the header.
    pub fn display_addr(&self) -> String {
        self.server.clone().unwrap_or_else(|| "in-process simulator".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_runtime_defaults() {
        let args = Args::try_parse_from(["pedestal-tui"]).unwrap();

        assert_eq!(args.runtime_config(), RuntimeConfig::default());
        assert_eq!(args.display_addr(), "in-process simulator");
    }

    #[test]
    fn stream_flags_shape_config() {
        let args = Args::try_parse_from([
            "pedestal-tui",
            "--server",
            "10.0.0.2:5000",
            "--cadence-ms",
            "5",
            "--delayed-first",
        ])
        .unwrap();

        let stream = args.runtime_config().session.stream;
        assert_eq!(stream.cadence, Duration::from_millis(5));
        assert_eq!(stream.first_emission, FirstEmission::AfterPeriod);
        assert_eq!(args.display_addr(), "10.0.0.2:5000");
    }
}
