//! Asteroid spawn definitions.
//!
//! Each top-level `Asteroid` node is bound on its own. Locations name bodies
//! by identifier; they are checked once the system is assembled.

use std::sync::LazyLock;

use orrery_parser::{BindError, Bindable, ConfigNode, FloatCurve, Member, Schema};

use crate::context::LoadContext;

/// A value drawn uniformly between two bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomRange {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Default for RandomRange {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl Bindable for RandomRange {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<RandomRange, LoadContext>> = LazyLock::new(|| {
            Schema::new("RandomRange")
                .member(Member::field("minValue", |r: &mut RandomRange| &mut r.min))
                .member(Member::field("maxValue", |r: &mut RandomRange| &mut r.max))
        });
        &SCHEMA
    }
}

/// Where an asteroid may spawn relative to a body.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnLocation {
    /// Identifier of the body.
    pub body: String,
    /// Relative spawn weight.
    pub probability: f32,
    /// Only spawn once the body has been reached.
    pub reached: bool,
    /// Semi-major axis range.
    pub semi_major_axis: Option<RandomRange>,
    /// Eccentricity range.
    pub eccentricity: Option<RandomRange>,
    /// Inclination range.
    pub inclination: Option<RandomRange>,
    /// Shortest flyby in days.
    pub min_duration: f32,
    /// Longest flyby in days.
    pub max_duration: f32,
}

impl Default for SpawnLocation {
    fn default() -> Self {
        Self {
            body: String::new(),
            probability: 100.0,
            reached: false,
            semi_major_axis: None,
            eccentricity: None,
            inclination: None,
            min_duration: 0.0,
            max_duration: 0.0,
        }
    }
}

impl Bindable for SpawnLocation {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<SpawnLocation, LoadContext>> = LazyLock::new(|| {
            Schema::new("Location")
                .member(Member::field("body", |l: &mut SpawnLocation| &mut l.body).required())
                .member(Member::field("probability", |l: &mut SpawnLocation| {
                    &mut l.probability
                }))
                .member(Member::field("reached", |l: &mut SpawnLocation| &mut l.reached))
                .member(Member::child("semiMajorAxis", |l: &mut SpawnLocation| {
                    &mut l.semi_major_axis
                }))
                .member(Member::child("eccentricity", |l: &mut SpawnLocation| {
                    &mut l.eccentricity
                }))
                .member(Member::child("inclination", |l: &mut SpawnLocation| {
                    &mut l.inclination
                }))
                .member(Member::field("minDuration", |l: &mut SpawnLocation| {
                    &mut l.min_duration
                }))
                .member(Member::field("maxDuration", |l: &mut SpawnLocation| {
                    &mut l.max_duration
                }))
                .lenient()
        });
        &SCHEMA
    }
}

/// Spawn locations by kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Locations {
    /// Orbits around a body.
    pub around: Vec<SpawnLocation>,
    /// Orbits near a body.
    pub nearby: Vec<SpawnLocation>,
    /// Trajectories passing a body.
    pub flyby: Vec<SpawnLocation>,
}

impl Locations {
    /// Every location, in `Around`, `Nearby`, `Flyby` order.
    pub fn iter(&self) -> impl Iterator<Item = &SpawnLocation> {
        self.around.iter().chain(&self.nearby).chain(&self.flyby)
    }
}

impl Bindable for Locations {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Locations, LoadContext>> = LazyLock::new(|| {
            Schema::new("Locations")
                .member(Member::list("Around", |l: &mut Locations| &mut l.around).merge())
                .member(Member::list("Nearby", |l: &mut Locations| &mut l.nearby).merge())
                .member(Member::list("Flyby", |l: &mut Locations| &mut l.flyby).merge())
        });
        &SCHEMA
    }
}

/// One asteroid spawn definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Asteroid {
    /// Definition name.
    pub name: String,
    /// Spawn locations.
    pub locations: Locations,
    /// Seconds between spawn attempts.
    pub interval: f32,
    /// Chance of a spawn per attempt, in percent.
    pub probability: f32,
    /// Shortest untracked lifetime in days.
    pub min_untracked_lifetime: f32,
    /// Longest untracked lifetime in days.
    pub max_untracked_lifetime: f32,
    /// Smallest number of asteroids kept alive.
    pub spawn_group_min_limit: i32,
    /// Largest number of asteroids kept alive.
    pub spawn_group_max_limit: i32,
    /// Whether the name must be unique per game.
    pub unique_name: bool,
    /// Size class distribution.
    pub size: Option<FloatCurve>,
    /// Overrides for the spawned vessel, kept raw.
    pub vessel: Option<ConfigNode>,
}

impl Default for Asteroid {
    fn default() -> Self {
        Self {
            name: String::new(),
            locations: Locations::default(),
            interval: 0.0,
            probability: 0.0,
            min_untracked_lifetime: 1.0,
            max_untracked_lifetime: 20.0,
            spawn_group_min_limit: 3,
            spawn_group_max_limit: 8,
            unique_name: false,
            size: None,
            vessel: None,
        }
    }
}

impl Bindable for Asteroid {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Asteroid, LoadContext>> = LazyLock::new(|| {
            Schema::new("Asteroid")
                .member(Member::field("name", |a: &mut Asteroid| &mut a.name).required())
                .member(Member::section("Locations", |a: &mut Asteroid| &mut a.locations).merge())
                .member(Member::field("interval", |a: &mut Asteroid| &mut a.interval))
                .member(Member::field("probability", |a: &mut Asteroid| {
                    &mut a.probability
                }))
                .member(Member::field("minUntrackedLifetime", |a: &mut Asteroid| {
                    &mut a.min_untracked_lifetime
                }))
                .member(Member::field("maxUntrackedLifetime", |a: &mut Asteroid| {
                    &mut a.max_untracked_lifetime
                }))
                .member(Member::field("spawnGroupMinLimit", |a: &mut Asteroid| {
                    &mut a.spawn_group_min_limit
                }))
                .member(Member::field("spawnGroupMaxLimit", |a: &mut Asteroid| {
                    &mut a.spawn_group_max_limit
                }))
                .member(Member::field("uniqueName", |a: &mut Asteroid| &mut a.unique_name))
                .member(Member::node_value("Size", |a: &mut Asteroid| &mut a.size))
                .member(Member::raw_node("VESSEL", |a: &mut Asteroid| &mut a.vessel))
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.min_untracked_lifetime > self.max_untracked_lifetime {
            return Err(BindError::Rejected(format!(
                "minUntrackedLifetime {} exceeds maxUntrackedLifetime {}",
                self.min_untracked_lifetime, self.max_untracked_lifetime
            )));
        }
        if self.spawn_group_min_limit > self.spawn_group_max_limit {
            return Err(BindError::Rejected(format!(
                "spawnGroupMinLimit {} exceeds spawnGroupMaxLimit {}",
                self.spawn_group_min_limit, self.spawn_group_max_limit
            )));
        }
        ctx.events.asteroid_loaded(self);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use orrery_parser::{create, parse_str};

    const DRESTEROIDS: &str = "
Asteroid
{
    name = Dresteroids
    interval = 1800
    probability = 40
    Locations
    {
        Around
        {
            body = Dres
            reached = true
            semiMajorAxis
            {
                minValue = 1e6
                maxValue = 4e6
            }
        }
        Around
        {
            body = Squad/Ike
        }
        Flyby
        {
            body = Kerbin
            minDuration = 10
            maxDuration = 30
        }
    }
    Size
    {
        key = 0 0
        key = 1 4
    }
    VESSEL
    {
        type = SpaceObject
    }
}
";

    fn bind(text: &str) -> Result<Asteroid, BindError> {
        let root = parse_str(text, "asteroids").unwrap();
        create(root.node("Asteroid").unwrap(), &mut LoadContext::default())
    }

    #[test]
    fn test_locations_keep_order() {
        let asteroid = bind(DRESTEROIDS).unwrap();
        let bodies: Vec<&str> = asteroid.locations.iter().map(|l| l.body.as_str()).collect();
        assert_eq!(bodies, ["Dres", "Squad/Ike", "Kerbin"]);

        let dres = &asteroid.locations.around[0];
        assert!(dres.reached);
        assert_eq!(
            dres.semi_major_axis,
            Some(RandomRange {
                min: 1e6,
                max: 4e6
            })
        );
        assert_eq!(asteroid.locations.flyby[0].max_duration, 30.0);
        assert_eq!(asteroid.size.unwrap().evaluate(1.0), 4.0);
        assert_eq!(
            asteroid.vessel.unwrap().value("type"),
            Some("SpaceObject")
        );
    }

    #[test]
    fn test_location_without_body_fails() {
        let err = bind("Asteroid\n{\nname = Lost\nLocations\n{\nAround\n{\nprobability = 1\n}\n}\n}")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Locations: Around: Around[0]: missing required entry `body` in Location"
        );
    }

    #[test]
    fn test_inverted_limits_are_rejected() {
        let err = bind("Asteroid\n{\nname = Bad\nspawnGroupMinLimit = 9\nspawnGroupMaxLimit = 2\n}")
            .unwrap_err();
        assert!(err.to_string().contains("spawnGroupMinLimit 9 exceeds"));
    }
}
