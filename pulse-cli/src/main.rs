use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use env_logger::{Env, Target};
use log::{error, info};
use pulse::{runtime, EventLoop, HttpProbe, PulseConfig, PulseError, Registry, Summary};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Overrides;
use crate::tui::Tui;

mod config;
mod input;
mod tui;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File with one endpoint per line
    #[arg(default_value = "urls.txt")]
    endpoints: PathBuf,

    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Give up on an endpoint after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Refresh period of the elapsed column in milliseconds
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// HTTP method used for each probe
    #[arg(long, value_parser = ["head", "get"])]
    method: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Logs go to stderr at `warn` unless a file is given, the table owns the terminal
fn init_logging(log_file: Option<&Path>) -> std::io::Result<()> {
    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init(),
    }
    Ok(())
}

/// An error followed by everything that caused it, on one line
fn describe(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    message
}

/// Fatal errors go to stderr once. The log file, when there is one, gets a copy.
fn report(error: &dyn Error, to_log_file: bool) {
    let message = describe(error);
    if to_log_file {
        error!("{}", message);
    }
    eprintln!("pulse: {}", message);
}

async fn run(registry: Registry, config: PulseConfig) -> Result<Summary, PulseError> {
    let probe = Arc::new(HttpProbe::new(&config)?);
    let cancel = CancellationToken::new();
    let (commands, commands_rx) = mpsc::unbounded_channel();

    tokio::spawn(input::forward_keys(commands, cancel.clone()));
    tokio::spawn(runtime::cancel_on_signal(cancel.clone()));

    let tui = Tui::setup().map_err(PulseError::Render)?;
    let progress = EventLoop::new(registry, tui, config)
        .run(probe, commands_rx, cancel.clone())
        .await;

    // stops key forwarding and the signal watch
    cancel.cancel();
    Ok(progress?.summary())
}

pub fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.log_file.as_deref()) {
        eprintln!("pulse: cannot open log file: {}", e);
        return ExitCode::FAILURE;
    }

    let to_log_file = cli.log_file.is_some();
    info!("Value for config: {:?}", cli.config);

    let overrides = Overrides {
        timeout: cli.timeout_ms,
        tick: cli.tick_ms,
        method: cli.method,
    };
    let layered = config::figment(cli.config.as_deref(), &overrides);
    let config = match PulseConfig::from_figment(&layered) {
        Ok(config) => config,
        Err(e) => {
            report(&e, to_log_file);
            return ExitCode::FAILURE;
        }
    };

    let registry = match Registry::load(&cli.endpoints) {
        Ok(registry) => registry,
        Err(e) => {
            report(&e, to_log_file);
            return ExitCode::FAILURE;
        }
    };

    let started = Instant::now();
    match runtime::block_on(run(registry, config)) {
        Ok(summary) => {
            info!("Finished: {}", summary);
            println!("{} - Elapsed Time - {:?}", summary, started.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e, to_log_file);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn describe_joins_the_cause_chain_once() {
        let error = PulseError::Source {
            path: PathBuf::from("urls.txt"),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file"),
        };

        let message = describe(&error);
        assert_eq!(message, "Failed to read endpoints from \"urls.txt\": No such file");
        assert_eq!(message.matches("urls.txt").count(), 1);
    }

    #[test]
    fn describe_without_cause() {
        let error = PulseError::InvalidConfig {
            field: "tick",
            reason: "must be greater than zero",
        };

        assert_eq!(
            describe(&error),
            "Invalid configuration: `tick` must be greater than zero"
        );
    }
}
