//! Loader settings for Orrery.
//!
//! Physical constants, home-world selection and diagnostics settings persist
//! to disk as RON. Command-line arguments override the stored values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, PhysicsConfig, SystemConfig, default_config_dir};
pub use error::ConfigError;
