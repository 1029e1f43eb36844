//! Prototype bodies and template cloning.
//!
//! A body may start from a copy of a catalog prototype instead of from
//! defaults. Copies are deep: every record is owned, so two bodies cloned from
//! the same prototype never share state.

use std::sync::LazyLock;

use orrery_parser::{BindError, Bindable, ConfigNode, Member, Schema, StringCollection, parse_str};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::body::{Body, BodyKind, Ocean, Properties, Ring, ScaledVersion, Terrain};
use crate::context::LoadContext;
use crate::error::{LoadError, TemplateError};
use crate::loader::load_system;
use crate::orbit::Orbit;
use crate::system::PlanetarySystem;

const STOCK_SYSTEM: &str = include_str!("../data/stock.cfg");

/// A body shape that can be cloned into new bodies.
#[derive(Clone, Debug, Default)]
pub struct Prototype {
    /// Name the prototype is catalogued under.
    pub name: String,
    /// Physical properties.
    pub properties: Properties,
    /// Orbit, with the reference kept as an identifier.
    pub orbit: Option<Orbit>,
    /// Scaled-space settings.
    pub scaled_version: ScaledVersion,
    /// Terrain controller and its modifiers.
    pub terrain: Option<Terrain>,
    /// Ocean sub-controller.
    pub ocean: Option<Ocean>,
    /// Rings.
    pub rings: Vec<Ring>,
    /// Flight index of the original body.
    pub flight_index: i32,
}

impl Prototype {
    /// Captures the configured records of `body`. Graph links are not kept.
    pub fn from_body(body: &Body) -> Self {
        let orbit = body.orbit.clone().map(|mut orbit| {
            orbit.parent = None;
            orbit
        });
        Self {
            name: body.name.clone(),
            properties: body.properties.clone(),
            orbit,
            scaled_version: body.scaled_version.clone(),
            terrain: body.terrain.clone(),
            ocean: body.ocean.clone(),
            rings: body.rings.clone(),
            flight_index: body.flight_index,
        }
    }

    /// Whether the prototype has an ocean.
    pub fn has_ocean(&self) -> bool {
        self.ocean.is_some()
    }
}

/// Prototypes by name.
#[derive(Clone, Debug, Default)]
pub struct PrototypeCatalog {
    prototypes: FxHashMap<String, Prototype>,
}

impl PrototypeCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the bundled stock system and catalogs every body in it.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the bundled description fails to load.
    pub fn stock() -> Result<Self, LoadError> {
        let root = parse_str(STOCK_SYSTEM, "stock.cfg")?;
        let mut ctx = LoadContext::new(Self::new());
        let system = load_system(&root, &mut ctx)?;
        let catalog = Self::from_system(&system);
        info!(prototypes = catalog.len(), "loaded stock prototype catalog");
        Ok(catalog)
    }

    /// Catalogs every body of an assembled system under its name.
    pub fn from_system(system: &PlanetarySystem) -> Self {
        let mut catalog = Self::new();
        for body in system.bodies() {
            catalog.insert(Prototype::from_body(body));
        }
        catalog
    }

    /// Adds or replaces a prototype.
    pub fn insert(&mut self, prototype: Prototype) {
        self.prototypes.insert(prototype.name.clone(), prototype);
    }

    /// Returns the prototype called `name`.
    pub fn get(&self, name: &str) -> Option<&Prototype> {
        self.prototypes.get(name)
    }

    /// Returns `true` if a prototype called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    /// Prototype names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.prototypes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of prototypes.
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns `true` if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    /// Returns an independent copy of the prototype `name` and its radius.
    ///
    /// With `suppress_terrain` the copy has neither terrain nor ocean.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::NotFound`] for an unknown name.
    pub fn clone_prototype(
        &self,
        name: &str,
        suppress_terrain: bool,
    ) -> Result<(Prototype, f64), TemplateError> {
        let source = self
            .get(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_owned()))?;
        let mut copy = source.clone();
        if suppress_terrain {
            copy.terrain = None;
            copy.ocean = None;
        }
        let radius = copy.properties.radius;
        Ok((copy, radius))
    }
}

/// The `Template` node of a body.
#[derive(Clone, Debug, Default)]
pub struct Template {
    /// Prototype name.
    pub name: String,
    /// Clone without terrain (and therefore without ocean).
    pub remove_terrain: bool,
    /// Drop the atmosphere.
    pub remove_atmosphere: bool,
    /// Drop the ocean.
    pub remove_ocean: bool,
    /// Drop every biome.
    pub remove_biomes: bool,
    /// Terrain modifier selectors to drop: `Kind` or `Kind[name]`.
    pub remove_terrain_mods: Vec<String>,
    /// Drop every terrain modifier.
    pub remove_all_terrain_mods: bool,
    /// Drop the star coronas.
    pub remove_coronas: bool,
    /// Radius of the prototype.
    pub original_radius: f64,
    /// Scaled-space kind of the prototype.
    pub original_kind: BodyKind,
    pub(crate) cloned: Option<Prototype>,
}

impl Template {
    fn apply_removals(&self, prototype: &mut Prototype) {
        if self.remove_atmosphere {
            prototype.properties.atmosphere = None;
        }
        if self.remove_ocean {
            prototype.ocean = None;
        }
        if self.remove_biomes {
            prototype.properties.biomes.clear();
        }
        if self.remove_coronas {
            prototype.scaled_version.coronas.clear();
        }
        let Some(terrain) = prototype.terrain.as_mut() else {
            return;
        };
        if self.remove_all_terrain_mods {
            terrain.mods.clear();
            return;
        }
        for selector in &self.remove_terrain_mods {
            if terrain.remove_mods(selector) == 0 {
                debug!(template = %self.name, selector, "no terrain modifier matched");
            }
        }
    }
}

impl Bindable for Template {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Template, LoadContext>> = LazyLock::new(|| {
            Schema::new("Template")
                .member(
                    Member::setter(
                        "name",
                        |t: &mut Template, name: String, ctx: &mut LoadContext| {
                            if !ctx.catalog.contains(&name) {
                                return Err(BindError::other(TemplateError::NotFound(name)));
                            }
                            t.name = name;
                            Ok(())
                        },
                    )
                    .required()
                    .pre_apply(),
                )
                .member(
                    Member::field("removeTerrain", |t: &mut Template| &mut t.remove_terrain)
                        .alias("removePQS")
                        .pre_apply(),
                )
                .member(Member::field("removeAtmosphere", |t: &mut Template| {
                    &mut t.remove_atmosphere
                }))
                .member(Member::field("removeOcean", |t: &mut Template| {
                    &mut t.remove_ocean
                }))
                .member(Member::field("removeBiomes", |t: &mut Template| {
                    &mut t.remove_biomes
                }))
                .member(
                    Member::each(
                        "removeTerrainMods",
                        |t: &mut Template, selectors: StringCollection, _: &mut LoadContext| {
                            t.remove_terrain_mods.extend(selectors.into_inner());
                            Ok(())
                        },
                    )
                    .alias("removePQSMods"),
                )
                .member(
                    Member::field("removeAllTerrainMods", |t: &mut Template| {
                        &mut t.remove_all_terrain_mods
                    })
                    .alias("removeAllPQSMods"),
                )
                .member(Member::field("removeCoronas", |t: &mut Template| {
                    &mut t.remove_coronas
                }))
        });
        &SCHEMA
    }

    fn apply(&mut self, _node: &ConfigNode, ctx: &mut LoadContext) -> Result<(), BindError> {
        let (prototype, radius) = ctx
            .catalog
            .clone_prototype(&self.name, self.remove_terrain)
            .map_err(BindError::other)?;
        self.original_radius = radius;
        self.original_kind = prototype.scaled_version.kind;
        self.cloned = Some(prototype);
        ctx.events.template_applied(self);
        Ok(())
    }

    fn post_apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        if let Some(mut prototype) = self.cloned.take() {
            self.apply_removals(&mut prototype);
            self.cloned = Some(prototype);
        }
        debug!(template = %self.name, "template cloned");
        Ok(())
    }
}
