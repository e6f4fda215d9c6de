//! Headless parking lot allocator.
//!
//! Reads newline-delimited JSON commands on stdin and answers on stdout; logs
//! go to stderr. Configuration comes from the `PARKING_*` environment
//! variables, overridden by `--data-dir <path>` or `--memory`.

mod protocol;
mod session;

use std::process::ExitCode;
use std::sync::Arc;

use bevy::log::LogPlugin;
use bevy::prelude::*;

use service::{ParkingPlugin, ParkingService, ServiceConfig};

use session::Session;

fn main() -> ExitCode {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    let mut config = ServiceConfig::from_env();
    if let Err(message) = apply_args(std::env::args().skip(1), &mut config) {
        error!("{message}");
        eprintln!("usage: parking [--data-dir <path> | --memory]");
        return ExitCode::FAILURE;
    }

    let service = match config
        .open_store()
        .and_then(|store| ParkingService::open(store, config.clone()))
    {
        Ok(service) => Arc::new(service),
        Err(e) => {
            error!("Failed to start parking service: {e}");
            return ExitCode::FAILURE;
        }
    };
    match &config.data_dir {
        Some(dir) => info!("Parking service ready, data in {}", dir.display()),
        None => info!("Parking service ready, in-memory store"),
    }

    app.add_plugins(ParkingPlugin::new(service));
    app.update();

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = Session::new(app).run(stdin.lock(), stdout.lock()) {
        error!("stdout write error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Apply command-line overrides on top of the environment configuration.
fn apply_args(
    mut args: impl Iterator<Item = String>,
    config: &mut ServiceConfig,
) -> Result<(), String> {
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                let dir = args
                    .next()
                    .filter(|dir| !dir.trim().is_empty())
                    .ok_or("--data-dir needs a path")?;
                config.data_dir = Some(dir.into());
            }
            "--memory" => config.data_dir = None,
            other => return Err(format!("unknown argument {other:?}")),
        }
    }
    Ok(())
}
