//! Scaled-space representation settings.

use std::sync::LazyLock;

use orrery_parser::convert::{ConfigEnum, enum_literal, parse_enum};
use orrery_parser::{Bindable, Color, ConvertError, Member, Parsable, Schema};

use crate::context::LoadContext;

/// How the distant representation of a body is shaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyKind {
    /// Rocky body with an atmosphere rim.
    #[default]
    Atmospheric,
    /// Rocky body without atmosphere.
    Vacuum,
    /// Emissive body.
    Star,
}

impl ConfigEnum for BodyKind {
    const NAME: &'static str = "scaled body type";
    const VARIANTS: &'static [(&'static str, Self)] = &[
        ("Atmospheric", Self::Atmospheric),
        ("Vacuum", Self::Vacuum),
        ("Star", Self::Star),
    ];
}

impl Parsable for BodyKind {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        parse_enum(literal)
    }

    fn to_literal(&self) -> String {
        enum_literal(self).to_owned()
    }
}

/// Scaled-space settings of a body.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledVersion {
    /// Shading model.
    pub kind: BodyKind,
    /// Distance at which the scaled mesh starts fading in.
    pub fade_start: f32,
    /// Distance at which the scaled mesh is fully visible.
    pub fade_end: f32,
    /// Skip mesh regeneration for this body.
    pub defer_mesh: bool,
    /// Hide the scaled mesh entirely.
    pub invisible: bool,
    /// Corona layers of a star.
    pub coronas: Vec<Corona>,
    /// Set after binding when the mesh must be regenerated.
    pub rebuild_requested: bool,
}

impl Default for ScaledVersion {
    fn default() -> Self {
        Self {
            kind: BodyKind::Atmospheric,
            fade_start: 0.0,
            fade_end: 0.0,
            defer_mesh: false,
            invisible: false,
            coronas: Vec::new(),
            rebuild_requested: false,
        }
    }
}

impl Bindable for ScaledVersion {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<ScaledVersion, LoadContext>> = LazyLock::new(|| {
            Schema::new("ScaledVersion")
                .member(
                    Member::field("type", |s: &mut ScaledVersion| &mut s.kind).pre_apply(),
                )
                .member(Member::field("fadeStart", |s: &mut ScaledVersion| {
                    &mut s.fade_start
                }))
                .member(Member::field("fadeEnd", |s: &mut ScaledVersion| &mut s.fade_end))
                .member(Member::field("deferMesh", |s: &mut ScaledVersion| {
                    &mut s.defer_mesh
                }))
                .member(Member::field("invisible", |s: &mut ScaledVersion| {
                    &mut s.invisible
                }))
                .member(Member::collection("Coronas", |s: &mut ScaledVersion| {
                    &mut s.coronas
                }))
        });
        &SCHEMA
    }
}

/// One corona layer around a star.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corona {
    /// Scale relative to the star.
    pub scale: f32,
    /// Rotation speed.
    pub speed: f32,
    /// Tint.
    pub color: Color,
}

impl Bindable for Corona {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Corona, LoadContext>> = LazyLock::new(|| {
            Schema::new("Corona")
                .member(Member::field("scale", |c: &mut Corona| &mut c.scale))
                .member(Member::field("speed", |c: &mut Corona| &mut c.speed))
                .member(Member::field("color", |c: &mut Corona| &mut c.color))
        });
        &SCHEMA
    }
}
