//! Physical properties of a body: size, gravity, rotation, atmosphere and biomes.

use std::sync::LazyLock;

use orrery_parser::convert::{ConfigEnum, enum_literal, parse_enum};
use orrery_parser::{
    BindError, Bindable, Color, ConfigNode, ConvertError, FloatCurve, Member, NumericCollection,
    Parsable, Schema,
};

use crate::context::{Constants, LoadContext};

/// Which gravity quantity was configured last and therefore defines the other two.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GravitySource {
    /// Surface gravity in multiples of standard gravity.
    SurfaceGravity(f64),
    /// Mass in kilograms.
    Mass(f64),
    /// Standard gravitational parameter in m³/s².
    GravParameter(f64),
}

/// Gravity of a body: the authoritative source and the values derived from it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gravity {
    /// Authoritative quantity, if any has been configured.
    pub source: Option<GravitySource>,
    /// Surface gravity in g.
    pub gee_asl: f64,
    /// Mass in kilograms.
    pub mass: f64,
    /// Standard gravitational parameter in m³/s².
    pub grav_parameter: f64,
}

impl Gravity {
    /// Derives all three quantities from `source` for a body of `radius` meters.
    ///
    /// Uses `GM = g·g0·r²` and `M = GM/G`.
    pub fn resolve(source: GravitySource, radius: f64, constants: &Constants) -> Self {
        let g0 = constants.standard_gravity;
        let big_g = constants.gravitational_constant;
        let r2 = radius * radius;
        let (gee_asl, mass, grav_parameter) = match source {
            GravitySource::SurfaceGravity(gee) => {
                let gm = gee * g0 * r2;
                (gee, gm / big_g, gm)
            }
            GravitySource::Mass(mass) => {
                let gm = mass * big_g;
                (gm / g0 / r2, mass, gm)
            }
            GravitySource::GravParameter(gm) => (gm / g0 / r2, gm / big_g, gm),
        };
        Self {
            source: Some(source),
            gee_asl,
            mass,
            grav_parameter,
        }
    }

    /// Re-derives the values from the current source, if there is one.
    pub fn update(&mut self, radius: f64, constants: &Constants) {
        if let Some(source) = self.source {
            *self = Self::resolve(source, radius, constants);
        }
    }
}

/// How a body appears in the research and development archive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    /// Listed with its icon.
    #[default]
    Visible,
    /// Listed without an icon.
    NoIcon,
    /// Not listed.
    Hidden,
    /// Skipped entirely, children included.
    Skip,
}

impl ConfigEnum for Visibility {
    const NAME: &'static str = "visibility";
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("VISIBLE", Self::Visible),
        ("NOICON", Self::NoIcon),
        ("HIDDEN", Self::Hidden),
        ("SKIP", Self::Skip),
    ];
}

impl Parsable for Visibility {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        parse_enum(literal)
    }

    fn to_literal(&self) -> String {
        enum_literal(self).to_owned()
    }
}

/// Physical and descriptive properties of a body.
#[derive(Clone, Debug, PartialEq)]
pub struct Properties {
    /// Name shown to players; the body name when unset.
    pub display_name: Option<String>,
    /// Flavor text.
    pub description: String,
    /// Mean radius in meters.
    pub radius: f64,
    /// Gravity source and derived values.
    pub gravity: Gravity,
    /// Whether the body spins.
    pub rotates: bool,
    /// Sidereal rotation period in seconds.
    pub rotation_period: f64,
    /// Whether the rotation is locked to the orbital period.
    pub tidally_locked: bool,
    /// Rotation angle at time zero, in degrees.
    pub initial_rotation: f64,
    /// Bond albedo.
    pub albedo: f64,
    /// Thermal emissivity.
    pub emissivity: f64,
    /// Altitudes above which each time warp rate becomes available.
    pub timewarp_altitude_limits: Vec<f32>,
    /// Sphere of influence that replaces the computed one.
    pub sphere_of_influence: Option<f64>,
    /// Hill sphere that replaces the computed one.
    pub hill_sphere: Option<f64>,
    /// Whether the display name takes an article.
    pub use_the_in_name: bool,
    /// Whether the body can be targeted.
    pub selectable: bool,
    /// Archive visibility.
    pub visibility: Visibility,
    /// Biome map entries.
    pub biomes: Vec<Biome>,
    /// Atmosphere, if the body has one.
    pub atmosphere: Option<Atmosphere>,
}

impl Default for Properties {
    fn default() -> Self {
        Self {
            display_name: None,
            description: String::new(),
            radius: 0.0,
            gravity: Gravity::default(),
            rotates: true,
            rotation_period: 0.0,
            tidally_locked: false,
            initial_rotation: 0.0,
            albedo: 0.3,
            emissivity: 0.7,
            timewarp_altitude_limits: Vec::new(),
            sphere_of_influence: None,
            hill_sphere: None,
            use_the_in_name: false,
            selectable: true,
            visibility: Visibility::Visible,
            biomes: Vec::new(),
            atmosphere: None,
        }
    }
}

impl Properties {
    /// Mass in kilograms.
    pub fn mass(&self) -> f64 {
        self.gravity.mass
    }

    /// Standard gravitational parameter in m³/s².
    pub fn grav_parameter(&self) -> f64 {
        self.gravity.grav_parameter
    }

    /// Surface gravity in g.
    pub fn gee_asl(&self) -> f64 {
        self.gravity.gee_asl
    }
}

fn set_gravity(props: &mut Properties, source: GravitySource) -> Result<(), BindError> {
    props.gravity.source = Some(source);
    Ok(())
}

impl Bindable for Properties {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Properties, LoadContext>> = LazyLock::new(|| {
            Schema::new("Properties")
                .member(Member::optional("displayName", |p: &mut Properties| {
                    &mut p.display_name
                }))
                .member(Member::field("description", |p: &mut Properties| {
                    &mut p.description
                }))
                .member(Member::field("radius", |p: &mut Properties| &mut p.radius))
                .member(Member::setter(
                    "geeASL",
                    |p: &mut Properties, v: f64, _: &mut LoadContext| {
                        set_gravity(p, GravitySource::SurfaceGravity(v))
                    },
                ))
                .member(Member::setter(
                    "mass",
                    |p: &mut Properties, v: f64, _: &mut LoadContext| {
                        set_gravity(p, GravitySource::Mass(v))
                    },
                ))
                .member(Member::setter(
                    "gravParameter",
                    |p: &mut Properties, v: f64, _: &mut LoadContext| {
                        set_gravity(p, GravitySource::GravParameter(v))
                    },
                ))
                .member(Member::field("rotates", |p: &mut Properties| &mut p.rotates))
                .member(Member::field("rotationPeriod", |p: &mut Properties| {
                    &mut p.rotation_period
                }))
                .member(Member::field("tidallyLocked", |p: &mut Properties| {
                    &mut p.tidally_locked
                }))
                .member(Member::field("initialRotation", |p: &mut Properties| {
                    &mut p.initial_rotation
                }))
                .member(Member::field("albedo", |p: &mut Properties| &mut p.albedo))
                .member(Member::field("emissivity", |p: &mut Properties| {
                    &mut p.emissivity
                }))
                .member(Member::setter(
                    "timewarpAltitudeLimits",
                    |p: &mut Properties, v: NumericCollection<f32>, _: &mut LoadContext| {
                        p.timewarp_altitude_limits = v.into_inner();
                        Ok(())
                    },
                ))
                .member(Member::optional("sphereOfInfluence", |p: &mut Properties| {
                    &mut p.sphere_of_influence
                }))
                .member(Member::optional("hillSphere", |p: &mut Properties| {
                    &mut p.hill_sphere
                }))
                .member(Member::field("useTheInName", |p: &mut Properties| {
                    &mut p.use_the_in_name
                }))
                .member(Member::field("selectable", |p: &mut Properties| {
                    &mut p.selectable
                }))
                .member(
                    Member::field("RnDVisibility", |p: &mut Properties| &mut p.visibility)
                        .alias("RDVisibility"),
                )
                .member(Member::collection("Biomes", |p: &mut Properties| &mut p.biomes).merge())
                .member(
                    Member::child("Atmosphere", |p: &mut Properties| &mut p.atmosphere).merge(),
                )
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, ctx: &mut LoadContext) -> Result<(), BindError> {
        self.gravity.update(self.radius, &ctx.constants);
        Ok(())
    }
}

/// One biome map entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Biome {
    /// Internal biome name.
    pub name: String,
    /// Name shown to players.
    pub display_name: Option<String>,
    /// Science multiplier.
    pub value: f32,
    /// Color key in the biome map.
    pub color: Color,
}

impl Bindable for Biome {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Biome, LoadContext>> = LazyLock::new(|| {
            Schema::new("Biome")
                .member(Member::field("name", |b: &mut Biome| &mut b.name).required())
                .member(Member::optional("displayName", |b: &mut Biome| {
                    &mut b.display_name
                }))
                .member(Member::field("value", |b: &mut Biome| &mut b.value))
                .member(Member::field("color", |b: &mut Biome| &mut b.color))
        });
        &SCHEMA
    }
}

/// Atmosphere parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Atmosphere {
    /// Whether the atmosphere exists at all.
    pub enabled: bool,
    /// Whether air-breathing engines work.
    pub oxygen: bool,
    /// Height of the atmosphere in meters.
    pub max_altitude: f64,
    /// Pressure at sea level in kPa.
    pub static_pressure_asl: f64,
    /// Pressure in kPa over altitude.
    pub pressure_curve: Option<FloatCurve>,
    /// Temperature in kelvin over altitude.
    pub temperature_curve: Option<FloatCurve>,
    /// Ambient light tint.
    pub ambient_color: Color,
    /// Scattering color seen from space.
    pub light_color: Color,
}

impl Default for Atmosphere {
    fn default() -> Self {
        Self {
            enabled: true,
            oxygen: false,
            max_altitude: 0.0,
            static_pressure_asl: 101.325,
            pressure_curve: None,
            temperature_curve: None,
            ambient_color: Color::BLACK,
            light_color: Color::WHITE,
        }
    }
}

impl Bindable for Atmosphere {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Atmosphere, LoadContext>> = LazyLock::new(|| {
            Schema::new("Atmosphere")
                .member(Member::field("enabled", |a: &mut Atmosphere| &mut a.enabled))
                .member(Member::field("oxygen", |a: &mut Atmosphere| &mut a.oxygen))
                .member(
                    Member::field("maxAltitude", |a: &mut Atmosphere| &mut a.max_altitude)
                        .alias("altitude"),
                )
                .member(Member::field("staticPressureASL", |a: &mut Atmosphere| {
                    &mut a.static_pressure_asl
                }))
                .member(Member::node_value("pressureCurve", |a: &mut Atmosphere| {
                    &mut a.pressure_curve
                }))
                .member(Member::node_value("temperatureCurve", |a: &mut Atmosphere| {
                    &mut a.temperature_curve
                }))
                .member(Member::field("ambientColor", |a: &mut Atmosphere| {
                    &mut a.ambient_color
                }))
                .member(Member::field("lightColor", |a: &mut Atmosphere| {
                    &mut a.light_color
                }))
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.enabled && self.max_altitude < 0.0 {
            return Err(BindError::Rejected(format!(
                "atmosphere height must not be negative, got {}",
                self.max_altitude
            )));
        }
        Ok(())
    }
}
