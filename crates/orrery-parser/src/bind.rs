//! Declarative binding of configuration nodes onto typed targets.
//!
//! Every target type publishes a static [`Schema`] listing its members. The
//! binder walks that table instead of inspecting the target at runtime:
//!
//! 1. strict targets reject entries no member answers to,
//! 2. pre-apply members bind in table order,
//! 3. [`Bindable::apply`] runs once,
//! 4. ordinary members bind in table order (nested targets complete their
//!    own lifecycle here),
//! 5. [`Bindable::post_apply`] runs once.

mod schema;

pub use schema::{Member, MergePolicy, Phase, Schema};

use crate::error::BindError;
use crate::node::ConfigNode;

/// Load-wide options a binding context exposes to the binder.
pub trait BindContext {
    /// Reject unmatched entries on targets that do not decide for themselves.
    fn strict(&self) -> bool {
        false
    }
}

impl BindContext for () {}

/// A type that can be populated from a [`ConfigNode`].
///
/// The lifecycle hooks default to doing nothing.
pub trait Bindable: Sized + 'static {
    /// Shared state threaded through a whole load.
    type Context: BindContext + 'static;

    /// Static member table of this type.
    fn schema() -> &'static Schema<Self, Self::Context>;

    /// Runs after pre-apply members and before ordinary members.
    ///
    /// # Errors
    ///
    /// An error aborts binding of the enclosing top-level object.
    fn apply(&mut self, _node: &ConfigNode, _ctx: &mut Self::Context) -> Result<(), BindError> {
        Ok(())
    }

    /// Runs after every member, including nested targets, has been bound.
    ///
    /// # Errors
    ///
    /// An error aborts binding of the enclosing top-level object.
    fn post_apply(
        &mut self,
        _node: &ConfigNode,
        _ctx: &mut Self::Context,
    ) -> Result<(), BindError> {
        Ok(())
    }
}

/// Binds `node` onto `target`.
///
/// # Errors
///
/// Returns the first [`BindError`]: a missing required member, a rejected
/// literal, an unexpected entry on a strict target, or a hook failure. Nested
/// failures carry the member path.
pub fn bind<T: Bindable>(
    node: &ConfigNode,
    target: &mut T,
    ctx: &mut T::Context,
) -> Result<(), BindError> {
    let schema = T::schema();
    let strict = schema.strictness().unwrap_or_else(|| ctx.strict());
    if let Some(key) = schema.first_unmatched(node) {
        if strict {
            return Err(BindError::UnknownEntry {
                target: schema.name(),
                key: key.to_owned(),
            });
        }
        tracing::trace!(target_type = schema.name(), key, "ignoring unmatched entry");
    }

    for member in schema.members().iter().filter(|m| m.phase == Phase::PreApply) {
        member.bind(schema.name(), node, target, ctx)?;
    }
    target.apply(node, ctx)?;
    for member in schema.members().iter().filter(|m| m.phase == Phase::Ordinary) {
        member.bind(schema.name(), node, target, ctx)?;
    }
    target.post_apply(node, ctx)
}

/// Constructs a default target and binds `node` onto it.
///
/// # Errors
///
/// Same as [`bind`].
pub fn create<T: Bindable + Default>(
    node: &ConfigNode,
    ctx: &mut T::Context,
) -> Result<T, BindError> {
    let mut target = T::default();
    bind(node, &mut target, ctx)?;
    Ok(target)
}

#[cfg(test)]
#[path = "bind_tests.rs"]
mod tests;
