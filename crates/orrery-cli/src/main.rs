//! Orrery command-line entry point.
//!
//! Loads one or more system configuration files, assembles the planetary
//! system and prints the body tree with flight indices and derived orbits.
//!
//! Run with: `cargo run -p orrery-cli -- system.cfg`

mod report;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use orrery_config::{CliArgs, Config, default_config_dir};
use orrery_system::{LoadContext, PrototypeCatalog, load_files};
use tracing::{info, warn};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(default_config_dir);
    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Failed to load config: {e}, using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    orrery_log::init_logging(
        config.debug.log_dir.as_deref(),
        cfg!(debug_assertions),
        Some(&config),
    );

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs, config: &Config) -> Result<(), Box<dyn Error>> {
    let catalog = if config.system.stock_templates {
        PrototypeCatalog::stock()?
    } else {
        PrototypeCatalog::new()
    };
    info!(
        inputs = args.inputs.len(),
        templates = catalog.len(),
        home = %config.system.home_world,
        "loading planetary system"
    );

    let mut ctx = LoadContext::from_config(config, catalog);
    let system = load_files(&args.inputs, &mut ctx)?;

    for discarded in system.discarded() {
        warn!(
            kind = %discarded.kind,
            object = %discarded.name,
            reason = %discarded.reason,
            "definition was discarded"
        );
    }

    print!("{}", report::render(&system, args.at));
    Ok(())
}
