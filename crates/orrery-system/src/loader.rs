//! Loading a whole planetary system from configuration.

use std::path::Path;
use std::sync::LazyLock;

use orrery_parser::{BindError, Bindable, ConfigNode, Member, Schema, create, parse_file};
use rustc_hash::FxHashSet;
use tracing::{debug, error, info, info_span, warn};

use crate::assembly::link;
use crate::asteroid::Asteroid;
use crate::body::Body;
use crate::context::LoadContext;
use crate::error::LoadError;
use crate::system::{Discarded, PlanetarySystem};

/// Node kind of a body definition.
pub const BODY_NODE: &str = "Body";

/// Node kind of an asteroid spawn definition.
pub const ASTEROID_NODE: &str = "Asteroid";

/// Values read from the root of the system configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemSettings {
    /// Name of the system.
    pub name: Option<String>,
    /// Time scale multiplier.
    pub time_scale: f64,
    /// Distance scale multiplier.
    pub scale: f64,
    /// Offset added to every orbit epoch, on top of the context's offset.
    pub epoch: Option<f64>,
    /// Body shown behind the main menu.
    pub main_menu_body: Option<String>,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            name: None,
            time_scale: 1.0,
            scale: 1.0,
            epoch: None,
            main_menu_body: None,
        }
    }
}

impl Bindable for SystemSettings {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<SystemSettings, LoadContext>> = LazyLock::new(|| {
            Schema::new("System")
                .member(
                    Member::setter(
                        "Epoch",
                        |s: &mut SystemSettings, epoch: f64, _ctx: &mut LoadContext| {
                            s.epoch = Some(epoch);
                            Ok(())
                        },
                    ),
                )
                .member(Member::optional("name", |s: &mut SystemSettings| &mut s.name))
                .member(Member::field("timeScale", |s: &mut SystemSettings| {
                    &mut s.time_scale
                }))
                .member(Member::field("scale", |s: &mut SystemSettings| &mut s.scale))
                .member(Member::optional("mainMenuBody", |s: &mut SystemSettings| {
                    &mut s.main_menu_body
                }))
                .lenient()
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.time_scale <= 0.0 || self.scale <= 0.0 {
            return Err(BindError::Rejected(format!(
                "timeScale and scale must be positive, got {} and {}",
                self.time_scale, self.scale
            )));
        }
        Ok(())
    }
}

/// Binds every top-level object of `kind` in `root`, one span per object.
///
/// Duplicate names are skipped before binding; objects that fail to bind are
/// dropped. Both are recorded in `discarded`.
fn bind_each<T: Bindable<Context = LoadContext> + Default>(
    root: &ConfigNode,
    kind: &'static str,
    ctx: &mut LoadContext,
    discarded: &mut Vec<Discarded>,
) -> Vec<T> {
    let mut names = FxHashSet::default();
    let mut bound = Vec::new();
    for node in root.nodes_named(kind) {
        let name = node.value("name").unwrap_or_default();
        if !name.is_empty() && !names.insert(name) {
            warn!(kind, name, "duplicate name, skipping the later definition");
            discarded.push(Discarded {
                kind: kind.to_owned(),
                name: name.to_owned(),
                reason: "duplicate name".to_owned(),
            });
            continue;
        }

        let span = info_span!("bind", kind, object = name);
        let _guard = span.enter();
        match create::<T>(node, ctx) {
            Ok(object) => {
                debug!("bound");
                bound.push(object);
            }
            Err(e) => {
                error!(error = %e, "binding failed, discarding");
                discarded.push(Discarded {
                    kind: kind.to_owned(),
                    name: name.to_owned(),
                    reason: e.to_string(),
                });
            }
        }
    }
    bound
}

/// Loads the system described by the children of `root`.
///
/// The root's own values are bound as [`SystemSettings`]; every `Body` and
/// `Asteroid` child is bound independently, then the bodies are assembled.
/// A root `Epoch` is added to `ctx.epoch` while this load runs; the context's
/// offset is restored afterwards.
///
/// # Errors
///
/// Returns [`LoadError::Settings`] if the root values are invalid and
/// [`LoadError::Assembly`] if the bound bodies do not form a valid system.
/// Bodies and asteroids that fail to bind do not abort the load.
pub fn load_system(root: &ConfigNode, ctx: &mut LoadContext) -> Result<PlanetarySystem, LoadError> {
    let settings: SystemSettings = create(root, ctx).map_err(LoadError::Settings)?;

    let base_epoch = ctx.epoch;
    if let Some(epoch) = settings.epoch {
        ctx.epoch = base_epoch + epoch;
        debug!(base = base_epoch, file = epoch, effective = ctx.epoch, "epoch offset");
    }
    let result = load_objects(root, settings, ctx);
    ctx.epoch = base_epoch;
    result
}

fn load_objects(
    root: &ConfigNode,
    settings: SystemSettings,
    ctx: &mut LoadContext,
) -> Result<PlanetarySystem, LoadError> {
    let mut discarded = Vec::new();

    let bodies: Vec<Body> = bind_each(root, BODY_NODE, ctx, &mut discarded);
    for body in &bodies {
        ctx.events.body_loaded(body);
    }
    let asteroids: Vec<Asteroid> = bind_each(root, ASTEROID_NODE, ctx, &mut discarded);
    info!(
        bodies = bodies.len(),
        asteroids = asteroids.len(),
        discarded = discarded.len(),
        "bound system configuration"
    );
    ctx.events.bodies_loaded(&bodies);

    let mut system = link(bodies, ctx)?;

    for asteroid in &asteroids {
        for location in asteroid.locations.iter() {
            if system.resolve(&location.body).is_none() {
                warn!(
                    asteroid = %asteroid.name,
                    body = %location.body,
                    "asteroid location names an unknown body"
                );
            }
        }
    }
    if let Some(menu) = &settings.main_menu_body
        && system.resolve(menu).is_none()
    {
        warn!(body = %menu, "main menu body is not part of the system");
    }

    system.settings = settings;
    system.asteroids = asteroids;
    system.discarded = discarded;
    ctx.events.system_assembled(&system);
    Ok(system)
}

/// Parses every file in `paths`, merges their top-level entries in order, and
/// loads the result with [`load_system`].
///
/// # Errors
///
/// Returns [`LoadError::Parse`] for unreadable or malformed files, otherwise
/// the errors of [`load_system`].
pub fn load_files<P: AsRef<Path>>(
    paths: &[P],
    ctx: &mut LoadContext,
) -> Result<PlanetarySystem, LoadError> {
    let mut root = ConfigNode::new("System");
    for path in paths {
        root.append(parse_file(path.as_ref())?);
    }
    load_system(&root, ctx)
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
