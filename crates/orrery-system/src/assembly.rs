//! Turns a batch of bound bodies into a [`PlanetarySystem`].
//!
//! Runs once after every body finished binding:
//!
//! 1. register names, aliases and primary identifiers,
//! 2. resolve each orbit's reference body and link children,
//! 3. elect the root (the only body without an orbit) and check that every
//!    body hangs off it,
//! 4. elect the home body,
//! 5. order every child list by apoapsis,
//! 6. make flight indices unique, then pin the root to 0 and home to 1,
//! 7. finalize every orbit.

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::body::{Body, BodyId};
use crate::context::LoadContext;
use crate::error::{AssemblyError, UbiError};
use crate::loader::SystemSettings;
use crate::orbit::Orbit;
use crate::system::PlanetarySystem;
use crate::ubi::{UbiKind, UbiRegistry};

/// Assembles `bodies` and notifies `system assembled` subscribers.
///
/// # Errors
///
/// Returns an [`AssemblyError`] for duplicate primary identifiers, missing or
/// unresolved orbit references, a missing or ambiguous root, bodies cut off
/// from the root, or a missing home body. Nothing is returned on error.
pub fn assemble(
    bodies: Vec<Body>,
    ctx: &mut LoadContext,
) -> Result<PlanetarySystem, AssemblyError> {
    let system = link(bodies, ctx)?;
    ctx.events.system_assembled(&system);
    Ok(system)
}

pub(crate) fn link(
    mut bodies: Vec<Body>,
    ctx: &LoadContext,
) -> Result<PlanetarySystem, AssemblyError> {
    for body in &mut bodies {
        body.children.clear();
        body.is_root = false;
        body.is_home = false;
        if let Some(orbit) = body.orbit.as_mut() {
            orbit.parent = None;
        }
    }

    let registry = register(&bodies)?;
    resolve_parents(&mut bodies, &registry)?;
    let root = elect_root(&bodies)?;
    check_reachable(&bodies, root)?;
    let home = elect_home(&bodies, ctx)?;
    sort_children(&mut bodies);
    assign_flight_indices(&mut bodies, root, home)?;

    bodies[root.0].is_root = true;
    bodies[home.0].is_home = true;

    let mut system = PlanetarySystem {
        bodies,
        root,
        home,
        registry,
        constants: ctx.constants,
        settings: SystemSettings::default(),
        asteroids: Vec::new(),
        discarded: Vec::new(),
    };
    for index in 0..system.len() {
        system.finalize_body(BodyId(index));
    }

    info!(
        bodies = system.len(),
        root = %system.body(root).name,
        home = %system.body(home).name,
        "assembled planetary system"
    );
    Ok(system)
}

fn register(bodies: &[Body]) -> Result<UbiRegistry, AssemblyError> {
    let mut registry = UbiRegistry::new();
    let duplicate = |err: UbiError| match err {
        UbiError::DuplicateIdentifier {
            identifier,
            existing,
            rejected,
        } => AssemblyError::DuplicateIdentifier {
            identifier,
            first: bodies[existing.0].name.clone(),
            second: bodies[rejected.0].name.clone(),
        },
    };

    for (index, body) in bodies.iter().enumerate() {
        let id = BodyId(index);
        registry
            .register(&body.name, id, UbiKind::Name)
            .map_err(duplicate)?;
        for alias in &body.implements {
            registry
                .register(alias, id, UbiKind::Alias)
                .map_err(duplicate)?;
        }
        registry
            .register(body.primary_identifier(), id, UbiKind::Primary)
            .map_err(duplicate)?;
    }
    Ok(registry)
}

fn resolve_parents(bodies: &mut [Body], registry: &UbiRegistry) -> Result<(), AssemblyError> {
    for index in 0..bodies.len() {
        let body = &bodies[index];
        let Some(orbit) = &body.orbit else {
            continue;
        };
        let reference = orbit
            .reference_body
            .as_deref()
            .ok_or_else(|| AssemblyError::MissingReference {
                body: body.name.clone(),
            })?;
        let parent = registry
            .resolve(reference)
            .ok_or_else(|| AssemblyError::UnresolvedReference {
                body: body.name.clone(),
                reference: reference.to_owned(),
            })?;
        if parent.0 == index {
            return Err(AssemblyError::SelfReference {
                body: body.name.clone(),
            });
        }

        if let Some(orbit) = bodies[index].orbit.as_mut() {
            orbit.parent = Some(parent);
        }
        bodies[parent.0].children.push(BodyId(index));
    }
    Ok(())
}

fn elect_root(bodies: &[Body]) -> Result<BodyId, AssemblyError> {
    let candidates: Vec<usize> = bodies
        .iter()
        .enumerate()
        .filter(|(_, b)| b.orbit.is_none())
        .map(|(i, _)| i)
        .collect();
    match candidates.as_slice() {
        [] => Err(AssemblyError::NoRoot),
        [root] => Ok(BodyId(*root)),
        _ => Err(AssemblyError::MultipleRoots {
            bodies: candidates.iter().map(|&i| bodies[i].name.clone()).collect(),
        }),
    }
}

fn check_reachable(bodies: &[Body], root: BodyId) -> Result<(), AssemblyError> {
    let mut reached = vec![false; bodies.len()];
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if std::mem::replace(&mut reached[id.0], true) {
            continue;
        }
        stack.extend(bodies[id.0].children.iter().copied());
    }
    let cut_off: Vec<String> = bodies
        .iter()
        .zip(&reached)
        .filter(|(_, reached)| !**reached)
        .map(|(b, _)| b.name.clone())
        .collect();
    if cut_off.is_empty() {
        Ok(())
    } else {
        Err(AssemblyError::Unreachable { bodies: cut_off })
    }
}

fn elect_home(bodies: &[Body], ctx: &LoadContext) -> Result<BodyId, AssemblyError> {
    let mut matches = bodies
        .iter()
        .enumerate()
        .filter(|(_, b)| ctx.home.matches(b))
        .map(|(i, _)| BodyId(i));
    let home = matches.next().ok_or_else(|| AssemblyError::NoHome {
        expected: ctx.home.to_string(),
    })?;
    let others: Vec<&str> = matches.map(|id| bodies[id.0].name.as_str()).collect();
    if !others.is_empty() {
        warn!(
            home = %bodies[home.0].name,
            ignored = ?others,
            "several bodies match the home predicate, using the first"
        );
    }
    Ok(home)
}

fn sort_children(bodies: &mut [Body]) {
    let apoapsis: Vec<f64> = bodies
        .iter()
        .map(|b| b.orbit.as_ref().map_or(0.0, Orbit::apoapsis))
        .collect();
    for body in bodies.iter_mut() {
        body.children
            .sort_by(|a, b| apoapsis[a.0].total_cmp(&apoapsis[b.0]));
    }
}

fn assign_flight_indices(
    bodies: &mut [Body],
    root: BodyId,
    home: BodyId,
) -> Result<(), AssemblyError> {
    let mut seen: FxHashSet<i32> = FxHashSet::from_iter([0, 1]);
    let mut max = bodies
        .iter()
        .map(|b| b.flight_index)
        .max()
        .unwrap_or(0)
        .max(1);

    let mut stack: Vec<BodyId> = bodies[root.0].children.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let body = &mut bodies[id.0];
        if !seen.insert(body.flight_index) {
            let next = next_free_index(&seen, &mut max).ok_or_else(|| {
                AssemblyError::FlightIndicesExhausted {
                    body: body.name.clone(),
                }
            })?;
            debug!(body = %body.name, from = body.flight_index, to = next, "reassigned flight index");
            body.flight_index = next;
            seen.insert(next);
        }
        stack.extend(body.children.iter().rev().copied());
    }

    bodies[home.0].flight_index = 1;
    bodies[root.0].flight_index = 0;
    Ok(())
}

/// Next index above the running maximum, or the lowest free index from 2 up
/// once the maximum reaches `i32::MAX`.
fn next_free_index(seen: &FxHashSet<i32>, max: &mut i32) -> Option<i32> {
    if let Some(next) = max.checked_add(1) {
        *max = next;
        return Some(next);
    }
    (2..i32::MAX).find(|index| !seen.contains(index))
}

#[cfg(test)]
#[path = "assembly_tests.rs"]
mod tests;
