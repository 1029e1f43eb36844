//! State shared by every step of one load.

use std::fmt;

use orrery_config::{Config, PhysicsConfig};
use orrery_parser::BindContext;

use crate::body::Body;
use crate::events::Events;
use crate::template::PrototypeCatalog;

/// Physical constants used by gravity derivation and orbit finalization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constants {
    /// Newtonian gravitational constant.
    pub gravitational_constant: f64,
    /// Standard gravity used to express surface gravity in g.
    pub standard_gravity: f64,
    /// Minimum sphere of influence as a multiple of the radius.
    pub soi_min_radius_mult: f64,
    /// Minimum sphere of influence altitude above the surface.
    pub soi_min_altitude: f64,
}

impl Default for Constants {
    fn default() -> Self {
        Self::from(&PhysicsConfig::default())
    }
}

impl From<&PhysicsConfig> for Constants {
    fn from(physics: &PhysicsConfig) -> Self {
        Self {
            gravitational_constant: physics.gravitational_constant,
            standard_gravity: physics.standard_gravity,
            soi_min_radius_mult: physics.soi_min_radius_mult,
            soi_min_altitude: physics.soi_min_altitude,
        }
    }
}

/// Decides which body is the home body.
pub enum HomePredicate {
    /// The body whose name or primary identifier equals this string.
    Named(String),
    /// An arbitrary test.
    Custom(Box<dyn Fn(&Body) -> bool>),
}

impl HomePredicate {
    /// Returns `true` if `body` is the home body.
    pub fn matches(&self, body: &Body) -> bool {
        match self {
            Self::Named(name) => body.name == *name || body.identifier.as_deref() == Some(name),
            Self::Custom(test) => test(body),
        }
    }
}

impl Default for HomePredicate {
    fn default() -> Self {
        Self::Named("Kerbin".to_string())
    }
}

impl fmt::Display for HomePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "\"{name}\""),
            Self::Custom(_) => f.write_str("the custom home predicate"),
        }
    }
}

impl fmt::Debug for HomePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HomePredicate({self})")
    }
}

/// Everything a load reads or notifies besides the configuration itself.
///
/// Each load owns its context, so independent loads never share catalogs,
/// registries or subscribers.
#[derive(Debug, Default)]
pub struct LoadContext {
    /// Physical constants.
    pub constants: Constants,
    /// Seconds added to every orbit `epoch` read from configuration.
    pub epoch: f64,
    /// Reject entries that no member answers to.
    pub strict: bool,
    /// Selects the home body.
    pub home: HomePredicate,
    /// Bodies available as templates.
    pub catalog: PrototypeCatalog,
    /// Lifecycle subscribers.
    pub events: Events,
}

impl LoadContext {
    /// A context with stock constants and the given template catalog.
    pub fn new(catalog: PrototypeCatalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// A context configured from loader settings.
    pub fn from_config(config: &Config, catalog: PrototypeCatalog) -> Self {
        Self {
            constants: Constants::from(&config.physics),
            epoch: config.system.epoch,
            strict: config.system.strict,
            home: HomePredicate::Named(config.system.home_world.clone()),
            catalog,
            events: Events::default(),
        }
    }
}

impl BindContext for LoadContext {
    fn strict(&self) -> bool {
        self.strict
    }
}
