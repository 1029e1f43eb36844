//! Terrain controller and ocean records.
//!
//! These are plain data for the collaborator that builds surfaces; modifier
//! parameters are kept as raw nodes.

use std::sync::LazyLock;

use orrery_parser::{BindError, Bindable, Color, ConfigNode, Member, Schema};

use crate::context::LoadContext;

/// Terrain controller of a body.
#[derive(Clone, Debug, PartialEq)]
pub struct Terrain {
    /// Coarsest subdivision level.
    pub min_level: u32,
    /// Finest subdivision level.
    pub max_level: u32,
    /// Height range of the height map in meters.
    pub map_max_height: f64,
    /// Terrain modifiers in configuration order.
    pub mods: Vec<TerrainMod>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            min_level: 2,
            max_level: 8,
            map_max_height: 0.0,
            mods: Vec::new(),
        }
    }
}

impl Terrain {
    /// Removes every modifier matching `selector`: either a kind (`VertexHeightMap`)
    /// or a kind with a name (`VertexHeightMap[Craters]`). Returns how many were removed.
    pub fn remove_mods(&mut self, selector: &str) -> usize {
        let (kind, name) = match selector.split_once('[') {
            Some((kind, rest)) => (kind.trim(), Some(rest.trim_end_matches(']').trim())),
            None => (selector.trim(), None),
        };
        let before = self.mods.len();
        self.mods.retain(|m| {
            let kind_matches = m.kind == kind;
            let name_matches = name.is_none_or(|n| m.name.as_deref() == Some(n));
            !(kind_matches && name_matches)
        });
        before - self.mods.len()
    }
}

impl Bindable for Terrain {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Terrain, LoadContext>> = LazyLock::new(|| {
            Schema::new("Terrain")
                .member(Member::field("minLevel", |t: &mut Terrain| &mut t.min_level))
                .member(Member::field("maxLevel", |t: &mut Terrain| &mut t.max_level))
                .member(Member::field("mapMaxHeight", |t: &mut Terrain| {
                    &mut t.map_max_height
                }))
                .member(Member::collection("Mods", |t: &mut Terrain| &mut t.mods).merge())
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.min_level > self.max_level {
            return Err(BindError::Rejected(format!(
                "minLevel {} exceeds maxLevel {}",
                self.min_level, self.max_level
            )));
        }
        Ok(())
    }
}

/// One terrain modifier. The node name is its kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMod {
    /// Modifier kind, taken from the node name.
    pub kind: String,
    /// Optional instance name used by removal selectors.
    pub name: Option<String>,
    /// Evaluation order.
    pub order: i32,
    /// Whether the modifier runs.
    pub enabled: bool,
    /// The whole modifier node, for the surface builder.
    pub parameters: Option<ConfigNode>,
}

impl Bindable for TerrainMod {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<TerrainMod, LoadContext>> = LazyLock::new(|| {
            Schema::new("TerrainMod")
                .member(Member::optional("name", |m: &mut TerrainMod| &mut m.name))
                .member(Member::field("order", |m: &mut TerrainMod| &mut m.order))
                .member(Member::field("enabled", |m: &mut TerrainMod| &mut m.enabled))
                .lenient()
        });
        &SCHEMA
    }

    fn apply(&mut self, node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        self.kind = node.name().to_owned();
        self.enabled = true;
        self.parameters = Some(node.clone());
        Ok(())
    }
}

/// Ocean sub-controller.
#[derive(Clone, Debug, PartialEq)]
pub struct Ocean {
    /// Fluid density in kg/m³.
    pub density: f64,
    /// Surface tint.
    pub color: Color,
    /// Coarsest subdivision level.
    pub min_level: u32,
    /// Finest subdivision level.
    pub max_level: u32,
}

impl Default for Ocean {
    fn default() -> Self {
        Self {
            density: 1.0,
            color: Color::new(0.1, 0.2, 0.4, 1.0),
            min_level: 1,
            max_level: 6,
        }
    }
}

impl Bindable for Ocean {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Ocean, LoadContext>> = LazyLock::new(|| {
            Schema::new("Ocean")
                .member(Member::field("density", |o: &mut Ocean| &mut o.density))
                .member(Member::field("oceanColor", |o: &mut Ocean| &mut o.color).alias("color"))
                .member(Member::field("minLevel", |o: &mut Ocean| &mut o.min_level))
                .member(Member::field("maxLevel", |o: &mut Ocean| &mut o.max_level))
        });
        &SCHEMA
    }
}
