use std::sync::LazyLock;

use orrery_parser::{BindError, Bindable, Color, ConfigNode, Member, Schema};

use crate::context::LoadContext;

/// A planetary ring.
#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    /// Inner radius in body radii.
    pub inner_radius: f64,
    /// Outer radius in body radii.
    pub outer_radius: f64,
    /// Tilt in degrees.
    pub angle: f64,
    /// Tint.
    pub color: Color,
    /// Whether the ring turns with the body.
    pub lock_rotation: bool,
    /// Texture path for the collaborator that draws it.
    pub texture: Option<String>,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            inner_radius: 1.5,
            outer_radius: 2.5,
            angle: 0.0,
            color: Color::WHITE,
            lock_rotation: false,
            texture: None,
        }
    }
}

impl Bindable for Ring {
    type Context = LoadContext;

    fn schema() -> &'static Schema<Self, LoadContext> {
        static SCHEMA: LazyLock<Schema<Ring, LoadContext>> = LazyLock::new(|| {
            Schema::new("Ring")
                .member(Member::field("innerRadius", |r: &mut Ring| &mut r.inner_radius))
                .member(Member::field("outerRadius", |r: &mut Ring| &mut r.outer_radius))
                .member(Member::field("angle", |r: &mut Ring| &mut r.angle))
                .member(Member::field("color", |r: &mut Ring| &mut r.color))
                .member(Member::field("lockRotation", |r: &mut Ring| &mut r.lock_rotation))
                .member(Member::optional("texture", |r: &mut Ring| &mut r.texture))
        });
        &SCHEMA
    }

    fn post_apply(&mut self, _node: &ConfigNode, _ctx: &mut LoadContext) -> Result<(), BindError> {
        if self.inner_radius >= self.outer_radius {
            return Err(BindError::Rejected(format!(
                "ring inner radius {} is not below outer radius {}",
                self.inner_radius, self.outer_radius
            )));
        }
        Ok(())
    }
}
