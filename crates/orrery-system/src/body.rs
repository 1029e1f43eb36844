//! Celestial bodies and their bindable records.

mod properties;
mod ring;
mod scaled;
mod terrain;

pub use properties::{Atmosphere, Biome, Gravity, GravitySource, Properties, Visibility};
pub use ring::Ring;
pub use scaled::{BodyKind, Corona, ScaledVersion};
pub use terrain::{Ocean, Terrain, TerrainMod};

use std::fmt;
use std::sync::LazyLock;

use orrery_parser::{BindError, Bindable, ConfigNode, Member, Schema, StringCollection};
use tracing::warn;

use crate::context::LoadContext;
use crate::orbit::{Orbit, OrbitalState, PhysicalParams};
use crate::template::Template;

/// Handle of a body inside one load batch or one assembled system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-body debugging switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugSettings {
    /// Always regenerate the scaled mesh.
    pub update: bool,
    /// Draw the sphere of influence.
    pub show_soi: bool,
}

impl Bindable for DebugSettings {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<DebugSettings, LoadContext>> = LazyLock::new(|| {
            Schema::new("Debug")
                .member(Member::field("update", |d: &mut DebugSettings| &mut d.update))
                .member(Member::field("showSOI", |d: &mut DebugSettings| &mut d.show_soi))
        });
        &SCHEMA
    }
}

/// A celestial body.
///
/// Binding fills the configured records. Assembly fills the graph fields
/// (`children`, `is_root`, `is_home`, the orbit's parent) and `state`.
#[derive(Clone, Debug, Default)]
pub struct Body {
    /// Internal name.
    pub name: String,
    /// Primary identifier; the name when unset.
    pub identifier: Option<String>,
    /// Alias identifiers.
    pub implements: Vec<String>,
    /// Template the body was cloned from.
    pub template: Option<Template>,
    /// Physical properties.
    pub properties: Properties,
    /// Orbit record. Exactly one body of a system has none.
    pub orbit: Option<Orbit>,
    /// Scaled-space settings.
    pub scaled_version: ScaledVersion,
    /// Terrain controller.
    pub terrain: Option<Terrain>,
    /// Ocean sub-controller.
    pub ocean: Option<Ocean>,
    /// Rings.
    pub rings: Vec<Ring>,
    /// Debug switches.
    pub debug: DebugSettings,
    /// Orbit applied once the body has spawned, kept raw.
    pub post_spawn_orbit: Option<ConfigNode>,
    /// Whether the body is a massless point other bodies orbit.
    pub barycenter: bool,
    /// Weight of the body when picking contract targets.
    pub contract_weight: i32,
    /// Flight index; unique after assembly.
    pub flight_index: i32,
    /// Children ordered by apoapsis.
    pub children: Vec<BodyId>,
    /// Whether this is the root of the system.
    pub is_root: bool,
    /// Whether this is the home body.
    pub is_home: bool,
    /// Derived orbital quantities.
    pub state: OrbitalState,
}

impl Body {
    /// A body with only a name, for building systems in code.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Primary identifier: `identifier`, or the name when that is unset.
    pub fn primary_identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.name)
    }

    /// Name shown to players.
    pub fn display_name(&self) -> &str {
        self.properties.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Resolved parent, available after assembly.
    pub fn parent(&self) -> Option<BodyId> {
        self.orbit.as_ref().and_then(|o| o.parent)
    }

    /// Whether the body has an ocean.
    pub fn has_ocean(&self) -> bool {
        self.ocean.is_some()
    }

    pub(crate) fn physical_params(&self) -> PhysicalParams {
        PhysicalParams {
            mass: self.properties.mass(),
            radius: self.properties.radius,
            sphere_of_influence: self.properties.sphere_of_influence,
            hill_sphere: self.properties.hill_sphere,
        }
    }

    /// Turns the body into a barycenter: no surface, no ocean, no scaled mesh.
    pub fn convert_to_barycenter(&mut self) {
        self.barycenter = true;
        self.terrain = None;
        self.ocean = None;
        self.scaled_version.defer_mesh = true;
    }

    fn adopt_template(&mut self) {
        let Some(prototype) = self.template.as_mut().and_then(|t| t.cloned.take()) else {
            return;
        };
        self.properties = prototype.properties;
        self.properties.display_name = None;
        self.orbit = prototype.orbit;
        self.scaled_version = prototype.scaled_version;
        self.terrain = prototype.terrain;
        self.ocean = prototype.ocean;
        self.rings = prototype.rings;
        self.flight_index = prototype.flight_index;
    }

    fn needs_scaled_rebuild(&self) -> bool {
        if self.scaled_version.defer_mesh || self.barycenter {
            return false;
        }
        if self.debug.update {
            return true;
        }
        match &self.template {
            None => true,
            Some(template) => {
                (template.original_radius - self.properties.radius).abs() > 1.0
                    || template.original_kind != self.scaled_version.kind
            }
        }
    }
}

impl Bindable for Body {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Body, LoadContext>> = LazyLock::new(|| {
            Schema::new("Body")
                .member(
                    Member::field("name", |b: &mut Body| &mut b.name)
                        .required()
                        .pre_apply(),
                )
                .member(Member::child("Template", |b: &mut Body| &mut b.template).pre_apply())
                .member(Member::optional("identifier", |b: &mut Body| &mut b.identifier))
                .member(Member::each(
                    "implements",
                    |b: &mut Body, ids: StringCollection, _: &mut LoadContext| {
                        b.implements.extend(ids.into_inner());
                        Ok(())
                    },
                ))
                .member(Member::field("barycenter", |b: &mut Body| &mut b.barycenter))
                .member(Member::field("contractWeight", |b: &mut Body| {
                    &mut b.contract_weight
                }))
                .member(Member::field("flightGlobalsIndex", |b: &mut Body| {
                    &mut b.flight_index
                }))
                .member(Member::section("Properties", |b: &mut Body| &mut b.properties).merge())
                .member(Member::child("Orbit", |b: &mut Body| &mut b.orbit).merge())
                .member(
                    Member::section("ScaledVersion", |b: &mut Body| &mut b.scaled_version)
                        .merge(),
                )
                .member(
                    Member::child("Terrain", |b: &mut Body| &mut b.terrain)
                        .alias("PQS")
                        .merge(),
                )
                .member(Member::child("Ocean", |b: &mut Body| &mut b.ocean).merge())
                .member(Member::collection("Rings", |b: &mut Body| &mut b.rings).merge())
                .member(Member::section("Debug", |b: &mut Body| &mut b.debug).merge())
                .member(Member::raw_node("PostSpawnOrbit", |b: &mut Body| {
                    &mut b.post_spawn_orbit
                }))
        });
        &SCHEMA
    }

    fn apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        self.adopt_template();
        Ok(())
    }

    fn post_apply(&mut self, _node: &ConfigNode, ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.barycenter {
            self.convert_to_barycenter();
        }
        if self.ocean.is_some() && self.terrain.is_none() {
            warn!(body = %self.name, "ocean without terrain, dropping the ocean");
            self.ocean = None;
        }
        if self.properties.gravity.source.is_none() {
            return Err(BindError::Rejected(
                "body has no surface gravity, mass or gravitational parameter".to_owned(),
            ));
        }
        if self.properties.radius.is_nan() || self.properties.radius <= 0.0 {
            return Err(BindError::Rejected(format!(
                "radius must be positive, got {}",
                self.properties.radius
            )));
        }

        self.scaled_version.rebuild_requested = self.needs_scaled_rebuild();
        if self.scaled_version.rebuild_requested {
            ctx.events.scaled_space_requested(self);
        }
        ctx.events.body_post_apply(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    use orrery_parser::{create, parse_str};

    use crate::template::PrototypeCatalog;

    fn load(text: &str, ctx: &mut LoadContext) -> Result<Body, BindError> {
        let root = parse_str(text, "test").unwrap();
        create(root.node("Body").unwrap(), ctx)
    }

    #[test]
    fn test_plain_body() {
        let body = load(
            r#"
            Body
            {
                name = Rock
                identifier = Orrery/Rock
                implements = Orrery/Stone, Orrery/Pebble
                Properties
                {
                    radius = 1000
                    mass = 1e15
                }
                Orbit
                {
                    referenceBody = Sun
                    semiMajorAxis = 5e9
                }
            }
            "#,
            &mut LoadContext::default(),
        )
        .unwrap();
        assert_eq!(body.primary_identifier(), "Orrery/Rock");
        assert_eq!(body.implements, ["Orrery/Stone", "Orrery/Pebble"]);
        assert_eq!(body.display_name(), "Rock");
        assert!(body.scaled_version.rebuild_requested);
        assert_eq!(body.orbit.unwrap().reference_body.as_deref(), Some("Sun"));
    }

    #[test]
    fn test_missing_gravity_is_rejected() {
        let err = load(
            "Body { name = Void\nProperties { radius = 10 } }",
            &mut LoadContext::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("no surface gravity"));
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let err = load(
            "Body { Properties { radius = 10\ngeeASL = 1 } }",
            &mut LoadContext::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BindError::MissingRequired { key: "name", .. }));
    }

    #[test]
    fn test_barycenter_drops_surface() {
        let body = load(
            r#"
            Body
            {
                name = Center
                barycenter = true
                Properties
                {
                    radius = 1
                    gravParameter = 1e10
                }
                Terrain { maxLevel = 6 }
                Ocean { density = 1 }
            }
            "#,
            &mut LoadContext::default(),
        );
        let body = body.unwrap();
        assert!(body.terrain.is_none());
        assert!(!body.has_ocean());
        assert!(body.scaled_version.defer_mesh);
        assert!(!body.scaled_version.rebuild_requested);
    }

    #[test]
    fn test_ocean_without_terrain_is_dropped() {
        let body = load(
            "Body\n{\nname = Wet\nProperties\n{\nradius = 5\ngeeASL = 0.1\n}\nOcean\n{\n}\n}",
            &mut LoadContext::default(),
        )
        .unwrap();
        assert!(!body.has_ocean());
    }

    #[test]
    fn test_template_keeps_radius_without_rebuild() {
        let mut ctx = LoadContext::new(PrototypeCatalog::stock().unwrap());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        ctx.events
            .on_scaled_space_requested(move |b: &Body| log.borrow_mut().push(b.name.clone()));

        let same = load(
            "Body\n{\nname = Copy\nTemplate\n{\nname = Mun\n}\n}",
            &mut ctx,
        )
        .unwrap();
        assert!(!same.scaled_version.rebuild_requested);
        assert_eq!(same.properties.radius, 200_000.0);
        assert_eq!(same.display_name(), "Copy");

        let bigger = load(
            "Body\n{\nname = Big\nTemplate\n{\nname = Mun\n}\nProperties\n{\nradius = 250000\n}\n}",
            &mut ctx,
        )
        .unwrap();
        assert!(bigger.scaled_version.rebuild_requested);
        assert_eq!(*seen.borrow(), ["Big"]);

        // The template's gravity source survives; only the derived surface gravity moves.
        assert_eq!(
            bigger.properties.grav_parameter(),
            same.properties.grav_parameter()
        );
        assert!(bigger.properties.gee_asl() < same.properties.gee_asl());
    }
}
