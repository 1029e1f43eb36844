//! Command-line argument parsing for Orrery.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Load and inspect planetary system configuration")]
pub struct CliArgs {
    /// Configuration files describing the system, read in order.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Name or identifier of the home body.
    #[arg(long)]
    pub home_world: Option<String>,

    /// Offset in seconds added to every orbit epoch.
    #[arg(long)]
    pub epoch: Option<f64>,

    /// Reject unknown configuration entries.
    #[arg(long)]
    pub strict: bool,

    /// Do not seed templates from the bundled stock system.
    #[arg(long)]
    pub no_stock: bool,

    /// Report body positions at this universal time, in seconds.
    #[arg(long)]
    pub at: Option<f64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref home) = args.home_world {
            self.system.home_world = home.clone();
        }
        if let Some(epoch) = args.epoch {
            self.system.epoch = epoch;
        }
        if args.strict {
            self.system.strict = true;
        }
        if args.no_stock {
            self.system.stock_templates = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from([
            "orrery",
            "system.cfg",
            "--home-world",
            "Earth",
            "--strict",
            "--log-level",
            "debug",
        ]);
        config.apply_cli_overrides(&args);
        assert_eq!(config.system.home_world, "Earth");
        assert!(config.system.strict);
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert!(config.system.stock_templates);
        assert_eq!(config.system.epoch, 0.0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        let args = CliArgs {
            inputs: vec![PathBuf::from("a.cfg")],
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(CliArgs::try_parse_from(["orrery"]).is_err());
    }

    #[test]
    fn test_cli_positionals_keep_order() {
        let args = CliArgs::parse_from(["orrery", "b.cfg", "a.cfg", "--no-stock", "--at", "60"]);
        assert_eq!(args.inputs, [PathBuf::from("b.cfg"), PathBuf::from("a.cfg")]);
        assert!(args.no_stock);
        assert_eq!(args.at, Some(60.0));
    }
}
