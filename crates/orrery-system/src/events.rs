//! Lifecycle notifications for collaborators.
//!
//! Subscribers run synchronously at fixed points of a load. They observe
//! bodies but cannot change the outcome of binding or assembly.

use std::fmt;

use crate::asteroid::Asteroid;
use crate::body::Body;
use crate::system::PlanetarySystem;
use crate::template::Template;

type Handlers<T> = Vec<Box<dyn FnMut(&T)>>;

/// Subscriber lists, one per lifecycle point.
#[derive(Default)]
pub struct Events {
    template_applied: Handlers<Template>,
    body_post_apply: Handlers<Body>,
    scaled_space_requested: Handlers<Body>,
    body_loaded: Handlers<Body>,
    bodies_loaded: Vec<Box<dyn FnMut(&[Body])>>,
    asteroid_loaded: Handlers<Asteroid>,
    system_assembled: Handlers<PlanetarySystem>,
}

impl Events {
    /// After a template has been cloned for a body.
    pub fn on_template_applied(&mut self, handler: impl FnMut(&Template) + 'static) {
        self.template_applied.push(Box::new(handler));
    }

    /// After a body and all its nested members finished binding.
    pub fn on_body_post_apply(&mut self, handler: impl FnMut(&Body) + 'static) {
        self.body_post_apply.push(Box::new(handler));
    }

    /// When a body needs its scaled-space representation rebuilt.
    pub fn on_scaled_space_requested(&mut self, handler: impl FnMut(&Body) + 'static) {
        self.scaled_space_requested.push(Box::new(handler));
    }

    /// After the loader accepted a bound body into the batch.
    pub fn on_body_loaded(&mut self, handler: impl FnMut(&Body) + 'static) {
        self.body_loaded.push(Box::new(handler));
    }

    /// After every body of the batch has been bound, before assembly.
    pub fn on_bodies_loaded(&mut self, handler: impl FnMut(&[Body]) + 'static) {
        self.bodies_loaded.push(Box::new(handler));
    }

    /// After an asteroid definition has been bound.
    pub fn on_asteroid_loaded(&mut self, handler: impl FnMut(&Asteroid) + 'static) {
        self.asteroid_loaded.push(Box::new(handler));
    }

    /// After the whole batch has been linked, indexed and finalized.
    pub fn on_system_assembled(&mut self, handler: impl FnMut(&PlanetarySystem) + 'static) {
        self.system_assembled.push(Box::new(handler));
    }

    pub(crate) fn template_applied(&mut self, template: &Template) {
        fire(&mut self.template_applied, template);
    }

    pub(crate) fn body_post_apply(&mut self, body: &Body) {
        fire(&mut self.body_post_apply, body);
    }

    pub(crate) fn scaled_space_requested(&mut self, body: &Body) {
        fire(&mut self.scaled_space_requested, body);
    }

    pub(crate) fn body_loaded(&mut self, body: &Body) {
        fire(&mut self.body_loaded, body);
    }

    pub(crate) fn bodies_loaded(&mut self, bodies: &[Body]) {
        fire(&mut self.bodies_loaded, bodies);
    }

    pub(crate) fn asteroid_loaded(&mut self, asteroid: &Asteroid) {
        fire(&mut self.asteroid_loaded, asteroid);
    }

    pub(crate) fn system_assembled(&mut self, system: &PlanetarySystem) {
        fire(&mut self.system_assembled, system);
    }
}

fn fire<T: ?Sized>(handlers: &mut [Box<dyn FnMut(&T)>], arg: &T) {
    for handler in handlers.iter_mut() {
        handler(arg);
    }
}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("template_applied", &self.template_applied.len())
            .field("body_post_apply", &self.body_post_apply.len())
            .field("scaled_space_requested", &self.scaled_space_requested.len())
            .field("body_loaded", &self.body_loaded.len())
            .field("bodies_loaded", &self.bodies_loaded.len())
            .field("asteroid_loaded", &self.asteroid_loaded.len())
            .field("system_assembled", &self.system_assembled.len())
            .finish()
    }
}
