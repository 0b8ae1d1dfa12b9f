use chrono::Local;
use log::LevelFilter;
use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::ArgMatches;
use env_logger::{Builder, Target};
use ratatui::backend::CrosstermBackend;

use crate::{
    cli::build_poll_config,
    core::{run_poll_session, Outcome, TerminalEvents},
};

/// Environment variable naming the log file of the dashboard binary.
pub const LOG_FILE_ENV: &str = "MODPOLL_LOG_FILE";

/// Logger setup for the dashboard.
///
/// The dashboard owns the terminal, so log output goes to a file when
/// `MODPOLL_LOG_FILE` is set and is otherwise off unless `RUST_LOG` asks
/// for it.
pub fn init_common() {
    if let Ok(path) = std::env::var(LOG_FILE_ENV) {
        match init_file_logger(&path) {
            Ok(()) => return,
            Err(err) => eprintln!("Failed to initialize file logger at '{path}': {err}"),
        }
    }

    Builder::new()
        .filter_level(LevelFilter::Off)
        .parse_default_env()
        .target(Target::Stderr)
        .init();
}

/// Logger for the device simulator, which has no screen to protect.
pub fn init_simulator_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Stderr)
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn init_file_logger(path: &str) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    let mut builder = Builder::new();
    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}

/// Validate the arguments, run the dashboard and map the result to the
/// process exit status.
///
/// Diagnostics are printed only after the terminal has been restored.
pub fn run(matches: &ArgMatches) -> ExitCode {
    let config = match build_poll_config(matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return err.exit_code();
        }
    };
    log::info!(
        "Polling {}:{} unit {} every {:?}",
        config.target.host,
        config.target.port,
        config.target.unit_id,
        config.poll_interval
    );

    let result = TerminalEvents::install().and_then(|mut events| {
        let backend = CrosstermBackend::new(io::stdout());
        run_poll_session(config, backend, &mut events)
    });

    match result {
        Ok(Outcome::Shutdown(cause)) => {
            eprintln!("Caught {cause}, exiting.");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    }
}
