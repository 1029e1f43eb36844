//! The assembled body graph.

use std::any::Any;
use std::error::Error;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

use crate::asteroid::Asteroid;
use crate::body::{Body, BodyId};
use crate::context::Constants;
use crate::loader::SystemSettings;
use crate::orbit::{ParentParams, finalize};
use crate::ubi::UbiRegistry;

/// A top-level object dropped during a load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discarded {
    /// Node kind, such as `Body` or `Asteroid`.
    pub kind: String,
    /// Name of the object, if it had one.
    pub name: String,
    /// Why it was dropped.
    pub reason: String,
}

/// A validated planetary system: one root, one home body, unique identifiers
/// and flight indices, and children ordered by apoapsis.
#[derive(Debug)]
pub struct PlanetarySystem {
    pub(crate) bodies: Vec<Body>,
    pub(crate) root: BodyId,
    pub(crate) home: BodyId,
    pub(crate) registry: UbiRegistry,
    pub(crate) constants: Constants,
    pub(crate) settings: SystemSettings,
    pub(crate) asteroids: Vec<Asteroid>,
    pub(crate) discarded: Vec<Discarded>,
}

impl PlanetarySystem {
    /// The body no other body orbits.
    pub fn root(&self) -> BodyId {
        self.root
    }

    /// The home body.
    pub fn home(&self) -> BodyId {
        self.home
    }

    /// Returns the body behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this system.
    pub fn body(&self, id: BodyId) -> &Body {
        &self.bodies[id.0]
    }

    /// Every body, in load order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Returns `true` if the system has no bodies. Never the case after assembly.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Children of `id` by ascending apoapsis.
    pub fn children(&self, id: BodyId) -> &[BodyId] {
        &self.bodies[id.0].children
    }

    /// Parent of `id`; `None` for the root.
    pub fn parent(&self, id: BodyId) -> Option<BodyId> {
        self.bodies[id.0].parent()
    }

    /// Resolves an identifier, alias or name.
    pub fn resolve(&self, identifier: &str) -> Option<BodyId> {
        self.registry.resolve(identifier)
    }

    /// Resolves an identifier, alias or name to its body.
    pub fn lookup(&self, identifier: &str) -> Option<&Body> {
        self.resolve(identifier).map(|id| self.body(id))
    }

    /// Finds the body holding flight index `index`.
    pub fn by_flight_index(&self, index: i32) -> Option<&Body> {
        self.bodies.iter().find(|b| b.flight_index == index)
    }

    /// The identifier registry of the batch.
    pub fn registry(&self) -> &UbiRegistry {
        &self.registry
    }

    /// Settings bound from the root node.
    pub fn settings(&self) -> &SystemSettings {
        &self.settings
    }

    /// Asteroid spawn definitions that bound successfully.
    pub fn asteroids(&self) -> &[Asteroid] {
        &self.asteroids
    }

    /// Objects dropped during the load.
    pub fn discarded(&self) -> &[Discarded] {
        &self.discarded
    }

    /// Pre-order walk from the root, each child list in apoapsis order.
    pub fn depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            system: self,
            stack: vec![(self.root, 0)],
        }
    }

    pub(crate) fn finalize_body(&mut self, id: BodyId) {
        let body = &self.bodies[id.0];
        let parent = body.parent().map(|parent| {
            let props = &self.bodies[parent.0].properties;
            ParentParams {
                mass: props.mass(),
                grav_parameter: props.grav_parameter(),
            }
        });
        let orbit = body.orbit.as_ref().zip(parent);
        let state = finalize(orbit, &body.physical_params(), &self.constants);
        self.bodies[id.0].state = state;
    }

    /// Recomputes derived orbital quantities of every body, then hands each
    /// body to `hook`.
    ///
    /// Hook errors and panics are logged with the body name and do not stop
    /// the pass. A panicking hook may leave its body partially updated.
    pub fn recompute_orbits<F>(&mut self, mut hook: F)
    where
        F: FnMut(&mut Body) -> Result<(), Box<dyn Error + Send + Sync>>,
    {
        for index in 0..self.bodies.len() {
            self.finalize_body(BodyId(index));
            let body = &mut self.bodies[index];
            match catch_unwind(AssertUnwindSafe(|| hook(&mut *body))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(body = %body.name, error = %e, "orbit update hook failed"),
                Err(payload) => error!(
                    body = %body.name,
                    panic = panic_message(payload.as_ref()),
                    "orbit update hook panicked"
                ),
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

/// Iterator returned by [`PlanetarySystem::depth_first`]. Yields each body
/// with its depth below the root.
pub struct DepthFirst<'a> {
    system: &'a PlanetarySystem,
    stack: Vec<(BodyId, usize)>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (BodyId, usize, &'a Body);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let body = self.system.body(id);
        self.stack
            .extend(body.children.iter().rev().map(|&child| (child, depth + 1)));
        Some((id, depth, body))
    }
}
