//! Loader settings with stock defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level loader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Physical constants used when deriving orbits and gravity.
    pub physics: PhysicsConfig,
    /// Planetary system assembly settings.
    pub system: SystemConfig,
    /// Diagnostics.
    pub debug: DebugConfig,
}

/// Physical constants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Newtonian gravitational constant in m³ kg⁻¹ s⁻².
    pub gravitational_constant: f64,
    /// Standard gravity used to express surface gravity in g, in m/s².
    pub standard_gravity: f64,
    /// The sphere of influence is never smaller than this multiple of the radius.
    pub soi_min_radius_mult: f64,
    /// The sphere of influence always reaches at least this far above the surface, in meters.
    pub soi_min_altitude: f64,
}

/// Planetary system assembly settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    /// Name or identifier of the body flagged as home.
    pub home_world: String,
    /// Offset in seconds added to every orbit epoch given in configuration.
    pub epoch: f64,
    /// Reject configuration entries that no member answers to.
    pub strict: bool,
    /// Seed the template catalog with the bundled stock system.
    pub stock_templates: bool,
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Default log level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Directory for JSON log files in debug builds.
    pub log_dir: Option<PathBuf>,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: 6.67408e-11,
            standard_gravity: 9.80665,
            soi_min_radius_mult: 2.0,
            soi_min_altitude: 40_000.0,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            home_world: "Kerbin".to_string(),
            epoch: 0.0,
            strict: false,
            stock_templates: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

/// File name of the persisted settings inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Platform configuration directory for Orrery, if the platform has one.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("orrery"))
}

impl Config {
    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] for an
    /// unreadable or malformed file, [`ConfigError::NonPositive`] for
    /// out-of-range constants, and the errors of [`Config::save`] when the
    /// defaults cannot be written.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        if !path.exists() {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default loader settings to {}", path.display());
            return Ok(config);
        }

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Config =
            ron::from_str(&text).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;
        config.validate()?;
        log::info!("Read loader settings from {}", path.display());
        Ok(config)
    }

    /// Writes the settings to `config_dir/config.ron`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Write`] or [`ConfigError::Serialize`].
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let text = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let path = config_dir.join(CONFIG_FILE);
        std::fs::write(&path, text).map_err(|source| ConfigError::Write { path, source })
    }

    /// Checks that every physical constant is strictly positive.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositive`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let physics = &self.physics;
        for (field, value) in [
            ("gravitational_constant", physics.gravitational_constant),
            ("standard_gravity", physics.standard_gravity),
            ("soi_min_radius_mult", physics.soi_min_radius_mult),
            ("soi_min_altitude", physics.soi_min_altitude),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }
}
