//! Orbit records and derived orbital quantities.

use std::f64::consts::TAU;
use std::sync::LazyLock;

use glam::{DVec3, Vec2};
use orrery_parser::convert::{ConfigEnum, enum_literal, parse_enum};
use orrery_parser::{BindError, Bindable, Color, ConfigNode, ConvertError, Member, Parsable, Schema};

use crate::body::BodyId;
use crate::context::{Constants, LoadContext};

/// Which parts of an orbit line are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawMode {
    /// No orbit line.
    Off,
    /// Line drawn once.
    Redraw,
    /// Line recomputed and redrawn every frame.
    #[default]
    RedrawAndRecalculate,
}

impl ConfigEnum for DrawMode {
    const NAME: &'static str = "orbit draw mode";
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("OFF", Self::Off),
        ("REDRAW_ONLY", Self::Redraw),
        ("REDRAW_AND_RECALCULATE", Self::RedrawAndRecalculate),
    ];
}

impl Parsable for DrawMode {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        parse_enum(literal)
    }

    fn to_literal(&self) -> String {
        enum_literal(self).to_owned()
    }
}

/// Which orbit markers are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawIcons {
    /// No markers.
    None,
    /// Only the body marker.
    Obj,
    /// Body marker plus apsis and node markers.
    ObjPeAp,
    /// Every marker.
    #[default]
    All,
}

impl ConfigEnum for DrawIcons {
    const NAME: &'static str = "orbit icons";
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("NONE", Self::None),
        ("OBJ", Self::Obj),
        ("OBJ_PE_AP", Self::ObjPeAp),
        ("ALL", Self::All),
    ];
}

impl Parsable for DrawIcons {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        parse_enum(literal)
    }

    fn to_literal(&self) -> String {
        enum_literal(self).to_owned()
    }
}

/// Orbit record of a body.
///
/// Angles are in degrees except the mean anomaly, which is in radians.
/// `reference_body` is an identifier resolved during assembly into `parent`.
#[derive(Clone, Debug, PartialEq)]
pub struct Orbit {
    /// Identifier of the body this one orbits.
    pub reference_body: Option<String>,
    /// Resolved parent, set during assembly.
    pub parent: Option<BodyId>,
    /// Semi-major axis in meters. Negative for hyperbolic orbits.
    pub semi_major_axis: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination in degrees.
    pub inclination: f64,
    /// Longitude of the ascending node in degrees.
    pub longitude_of_ascending_node: f64,
    /// Argument of periapsis in degrees.
    pub argument_of_periapsis: f64,
    /// Mean anomaly at epoch in radians.
    pub mean_anomaly_at_epoch: f64,
    /// Epoch in seconds.
    pub epoch: f64,
    /// Orbit line color.
    pub color: Option<Color>,
    /// Position marker color.
    pub icon_color: Option<Color>,
    /// Orbit line mode.
    pub mode: DrawMode,
    /// Orbit markers.
    pub icon: DrawIcons,
    /// Camera distance to semi-major axis ratios between which the line is drawn.
    pub camera_sma_ratio_bounds: Option<Vec2>,
}

impl Default for Orbit {
    fn default() -> Self {
        Self {
            reference_body: None,
            parent: None,
            semi_major_axis: 0.0,
            eccentricity: 0.0,
            inclination: 0.0,
            longitude_of_ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            mean_anomaly_at_epoch: 0.0,
            epoch: 0.0,
            color: None,
            icon_color: None,
            mode: DrawMode::RedrawAndRecalculate,
            icon: DrawIcons::All,
            camera_sma_ratio_bounds: None,
        }
    }
}

impl Orbit {
    /// Farthest distance from the parent, `a(1+e)`.
    pub fn apoapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Closest distance to the parent, `a(1-e)`.
    pub fn periapsis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Position relative to the parent `time` seconds after the epoch.
    ///
    /// Returns `None` for open orbits or a non-positive period.
    pub fn position_at_time(&self, state: &OrbitalState, time: f64) -> Option<DVec3> {
        if self.eccentricity >= 1.0 || state.period.is_nan() || state.period <= 0.0 {
            return None;
        }
        let e = self.eccentricity;
        let mean_anomaly = self.mean_anomaly_at_epoch + TAU * ((time - self.epoch) / state.period);

        // Kepler's equation: E - e*sin(E) = M.
        let mut ecc_anomaly = mean_anomaly;
        for _ in 0..10 {
            let delta = ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly;
            let derivative = 1.0 - e * ecc_anomaly.cos();
            ecc_anomaly -= delta / derivative;
        }

        let true_anomaly = 2.0
            * ((1.0 + e).sqrt() * (ecc_anomaly / 2.0).sin())
                .atan2((1.0 - e).sqrt() * (ecc_anomaly / 2.0).cos());
        let r = self.semi_major_axis * (1.0 - e * ecc_anomaly.cos());
        let x_orb = r * true_anomaly.cos();
        let y_orb = r * true_anomaly.sin();

        let (sin_o, cos_o) = self.longitude_of_ascending_node.to_radians().sin_cos();
        let (sin_i, cos_i) = self.inclination.to_radians().sin_cos();
        let (sin_w, cos_w) = self.argument_of_periapsis.to_radians().sin_cos();

        let x = x_orb * (cos_o * cos_w - sin_o * sin_w * cos_i)
            - y_orb * (cos_o * sin_w + sin_o * cos_w * cos_i);
        let y = x_orb * (sin_o * cos_w + cos_o * sin_w * cos_i)
            - y_orb * (sin_o * sin_w - cos_o * cos_w * cos_i);
        let z = x_orb * (sin_w * sin_i) + y_orb * (cos_w * sin_i);
        Some(DVec3::new(x, y, z))
    }
}

impl Bindable for Orbit {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Orbit, LoadContext>> = LazyLock::new(|| {
            Schema::new("Orbit")
                .member(Member::optional("referenceBody", |o: &mut Orbit| {
                    &mut o.reference_body
                }))
                .member(Member::field("semiMajorAxis", |o: &mut Orbit| {
                    &mut o.semi_major_axis
                }))
                .member(Member::field("eccentricity", |o: &mut Orbit| &mut o.eccentricity))
                .member(Member::field("inclination", |o: &mut Orbit| &mut o.inclination))
                .member(Member::field("longitudeOfAscendingNode", |o: &mut Orbit| {
                    &mut o.longitude_of_ascending_node
                }))
                .member(Member::field("argumentOfPeriapsis", |o: &mut Orbit| {
                    &mut o.argument_of_periapsis
                }))
                .member(Member::field("meanAnomalyAtEpoch", |o: &mut Orbit| {
                    &mut o.mean_anomaly_at_epoch
                }))
                .member(Member::setter(
                    "meanAnomalyAtEpochD",
                    |o: &mut Orbit, degrees: f64, _: &mut LoadContext| {
                        o.mean_anomaly_at_epoch = degrees.to_radians();
                        Ok(())
                    },
                ))
                .member(Member::setter(
                    "epoch",
                    |o: &mut Orbit, epoch: f64, ctx: &mut LoadContext| {
                        o.epoch = epoch + ctx.epoch;
                        Ok(())
                    },
                ))
                .member(Member::optional("color", |o: &mut Orbit| &mut o.color))
                .member(Member::optional("iconColor", |o: &mut Orbit| &mut o.icon_color))
                .member(Member::field("mode", |o: &mut Orbit| &mut o.mode))
                .member(Member::field("icon", |o: &mut Orbit| &mut o.icon))
                .member(Member::optional("cameraSmaRatioBounds", |o: &mut Orbit| {
                    &mut o.camera_sma_ratio_bounds
                }))
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.eccentricity < 0.0 {
            return Err(BindError::Rejected(format!(
                "eccentricity must not be negative, got {}",
                self.eccentricity
            )));
        }
        Ok(())
    }
}

/// Quantities derived from an orbit and the masses involved. Never configured directly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitalState {
    /// Orbital period in seconds.
    pub period: f64,
    /// Mean motion in radians per second.
    pub mean_motion: f64,
    /// Mean anomaly at the epoch in radians.
    pub mean_anomaly: f64,
    /// Fraction of the orbit completed at the epoch.
    pub orbit_percent: f64,
    /// Time since periapsis at the epoch in seconds.
    pub time_at_epoch: f64,
    /// Sphere of influence radius in meters.
    pub sphere_of_influence: f64,
    /// Hill sphere radius in meters.
    pub hill_sphere: f64,
}

impl Default for OrbitalState {
    fn default() -> Self {
        Self {
            period: 0.0,
            mean_motion: 0.0,
            mean_anomaly: 0.0,
            orbit_percent: 0.0,
            time_at_epoch: 0.0,
            sphere_of_influence: f64::INFINITY,
            hill_sphere: f64::INFINITY,
        }
    }
}

/// Mass and size of the body being finalized, with configured overrides.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicalParams {
    /// Mass in kilograms.
    pub mass: f64,
    /// Radius in meters.
    pub radius: f64,
    /// Configured sphere of influence, kept verbatim when set.
    pub sphere_of_influence: Option<f64>,
    /// Configured hill sphere, kept verbatim when set.
    pub hill_sphere: Option<f64>,
}

/// Gravity of the parent body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParentParams {
    /// Mass in kilograms.
    pub mass: f64,
    /// Standard gravitational parameter in m³/s².
    pub grav_parameter: f64,
}

/// Computes the derived quantities of a body.
///
/// Without a parent both radii are infinite. The closed-orbit period includes
/// the body's own mass; the open-orbit time since periapsis uses only the
/// parent's gravitational parameter.
pub fn finalize(
    orbit: Option<(&Orbit, ParentParams)>,
    body: &PhysicalParams,
    constants: &Constants,
) -> OrbitalState {
    let Some((orbit, parent)) = orbit else {
        return OrbitalState::default();
    };
    let a = orbit.semi_major_axis;
    let e = orbit.eccentricity;
    let mass_ratio = body.mass / parent.mass;

    let hill_sphere = body
        .hill_sphere
        .unwrap_or_else(|| a * (1.0 - e) * mass_ratio.cbrt());
    let sphere_of_influence = body.sphere_of_influence.unwrap_or_else(|| {
        let floor = (body.radius * constants.soi_min_radius_mult)
            .max(body.radius + constants.soi_min_altitude);
        (a * mass_ratio.powf(0.4)).max(floor)
    });

    let period = TAU
        * (a * a / constants.gravitational_constant * a / (parent.mass + body.mass)).sqrt();
    let mean_motion = TAU / period;
    let mean_anomaly = orbit.mean_anomaly_at_epoch;

    let (orbit_percent, time_at_epoch) = if e <= 1.0 {
        let percent = mean_anomaly / TAU;
        (percent, percent * period)
    } else {
        (0.0, (a.abs().powi(3) / parent.grav_parameter).sqrt() * mean_anomaly)
    };

    OrbitalState {
        period,
        mean_motion,
        mean_anomaly,
        orbit_percent,
        time_at_epoch,
        sphere_of_influence,
        hill_sphere,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use orrery_parser::create;

    const G: f64 = 6.67408e-11;

    fn moon_orbit() -> Orbit {
        Orbit {
            reference_body: Some("Planet".into()),
            semi_major_axis: 1.2e7,
            eccentricity: 0.05,
            mean_anomaly_at_epoch: 1.0,
            ..Orbit::default()
        }
    }

    fn planet() -> ParentParams {
        ParentParams {
            mass: 5.29e22,
            grav_parameter: 5.29e22 * G,
        }
    }

    fn moon() -> PhysicalParams {
        PhysicalParams {
            mass: 2.0e20,
            radius: 100_000.0,
            ..PhysicalParams::default()
        }
    }

    fn close(actual: f64, expected: f64) -> bool {
        ((actual - expected) / expected).abs() < 1e-12
    }

    #[test]
    fn test_closed_orbit_quantities() {
        let orbit = moon_orbit();
        let state = finalize(Some((&orbit, planet())), &moon(), &Constants::default());

        let a: f64 = 1.2e7;
        let hill = a * (1.0 - 0.05) * (2.0e20 / 5.29e22_f64).powf(1.0 / 3.0);
        let soi = a * (2.0e20 / 5.29e22_f64).powf(0.4);
        let period = TAU * (a.powi(3) / (G * (5.29e22 + 2.0e20))).sqrt();

        assert!(close(state.hill_sphere, hill), "{} vs {hill}", state.hill_sphere);
        assert!(close(state.sphere_of_influence, soi));
        assert!(close(state.period, period), "{} vs {period}", state.period);
        assert!(close(state.mean_motion, TAU / period));
        assert_eq!(state.mean_anomaly, 1.0);
        assert!(close(state.orbit_percent, 1.0 / TAU));
        assert!(close(state.time_at_epoch, period / TAU));
    }

    #[test]
    fn test_soi_floor_applies_to_tiny_bodies() {
        let orbit = moon_orbit();
        let pebble = PhysicalParams {
            mass: 1.0,
            radius: 30_000.0,
            ..PhysicalParams::default()
        };
        let state = finalize(Some((&orbit, planet())), &pebble, &Constants::default());
        assert_eq!(state.sphere_of_influence, 70_000.0);

        let boulder = PhysicalParams {
            radius: 50_000.0,
            ..pebble
        };
        let state = finalize(Some((&orbit, planet())), &boulder, &Constants::default());
        assert_eq!(state.sphere_of_influence, 100_000.0);
    }

    #[test]
    fn test_overrides_are_kept_verbatim() {
        let orbit = moon_orbit();
        let body = PhysicalParams {
            sphere_of_influence: Some(1234.0),
            hill_sphere: Some(5678.0),
            ..moon()
        };
        let state = finalize(Some((&orbit, planet())), &body, &Constants::default());
        assert_eq!(state.sphere_of_influence, 1234.0);
        assert_eq!(state.hill_sphere, 5678.0);
    }

    #[test]
    fn test_open_orbit_ignores_own_mass() {
        let orbit = Orbit {
            semi_major_axis: -2.0e7,
            eccentricity: 1.5,
            mean_anomaly_at_epoch: 0.5,
            ..moon_orbit()
        };
        let parent = planet();
        let state = finalize(Some((&orbit, parent)), &moon(), &Constants::default());
        let expected = (2.0e7_f64.powi(3) / parent.grav_parameter).sqrt() * 0.5;
        assert!(close(state.time_at_epoch, expected));
        assert_eq!(state.orbit_percent, 0.0);
    }

    #[test]
    fn test_root_has_infinite_radii() {
        let state = finalize(None, &moon(), &Constants::default());
        assert!(state.sphere_of_influence.is_infinite());
        assert!(state.hill_sphere.is_infinite());
        assert_eq!(state.period, 0.0);
    }

    #[test]
    fn test_degrees_and_epoch_offset() {
        let node = ConfigNode::new("Orbit")
            .with_value("referenceBody", "Sun")
            .with_value("meanAnomalyAtEpochD", "180")
            .with_value("epoch", "10")
            .with_value("mode", "off")
            .with_value("cameraSmaRatioBounds", "0.3 25");
        let mut ctx = LoadContext {
            epoch: 100.0,
            ..LoadContext::default()
        };
        let orbit: Orbit = create(&node, &mut ctx).unwrap();
        assert!((orbit.mean_anomaly_at_epoch - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(orbit.epoch, 110.0);
        assert_eq!(orbit.mode, DrawMode::Off);
        assert_eq!(orbit.camera_sma_ratio_bounds, Some(Vec2::new(0.3, 25.0)));

        let bare: Orbit = create(&ConfigNode::new("Orbit"), &mut ctx).unwrap();
        assert_eq!(bare.epoch, 0.0);
    }

    #[test]
    fn test_circular_orbit_keeps_radius() {
        let orbit = Orbit {
            eccentricity: 0.0,
            inclination: 30.0,
            mean_anomaly_at_epoch: 0.0,
            ..moon_orbit()
        };
        let state = finalize(Some((&orbit, planet())), &moon(), &Constants::default());
        for i in 0..20 {
            let t = (i as f64 / 20.0) * state.period;
            let r = orbit.position_at_time(&state, t).unwrap().length();
            assert!((r - orbit.semi_major_axis).abs() < orbit.semi_major_axis * 1e-6, "t={t} r={r}");
        }
        let start = orbit.position_at_time(&state, 0.0).unwrap();
        let lap = orbit.position_at_time(&state, state.period).unwrap();
        assert!((lap - start).length() < orbit.semi_major_axis * 1e-6);
    }

    #[test]
    fn test_open_orbit_has_no_position() {
        let orbit = Orbit {
            eccentricity: 1.2,
            ..moon_orbit()
        };
        let state = OrbitalState {
            period: 100.0,
            ..OrbitalState::default()
        };
        assert!(orbit.position_at_time(&state, 0.0).is_none());
    }
}
