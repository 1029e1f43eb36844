//! Planetary system assembly.
//!
//! Bodies are bound from configuration (optionally starting from a cloned
//! template), linked into a single orbital tree through the unique body
//! identifier registry, indexed, and given derived orbital quantities.
//!
//! The entry points are [`load_system`] and [`load_files`]; [`assemble`] can
//! also be driven directly with bodies built in code.

pub mod assembly;
pub mod asteroid;
pub mod body;
mod context;
mod error;
pub mod events;
pub mod loader;
pub mod orbit;
mod system;
pub mod template;
pub mod ubi;

pub use assembly::assemble;
pub use asteroid::Asteroid;
pub use body::{Body, BodyId};
pub use context::{Constants, HomePredicate, LoadContext};
pub use error::{AssemblyError, LoadError, TemplateError, UbiError};
pub use events::Events;
pub use loader::{SystemSettings, load_files, load_system};
pub use orbit::{Orbit, OrbitalState, ParentParams, PhysicalParams, finalize};
pub use system::{DepthFirst, Discarded, PlanetarySystem};
pub use template::{Prototype, PrototypeCatalog, Template};
pub use ubi::{UbiKind, UbiRegistry};
