//! Unique body identifiers.
//!
//! Every body answers to its name, to any number of aliases and to exactly one
//! primary identifier. The registry maps each string to one body, with
//! stronger kinds taking precedence over weaker ones.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::body::BodyId;
use crate::error::UbiError;

/// How strongly an identifier is bound to a body. Later variants win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UbiKind {
    /// The internal body name.
    Name,
    /// An `implements` alias.
    Alias,
    /// The primary identifier.
    Primary,
}

/// Identifier to body lookup for one load batch.
#[derive(Clone, Debug, Default)]
pub struct UbiRegistry {
    entries: FxHashMap<String, (BodyId, UbiKind)>,
}

impl UbiRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `identifier` for `body`.
    ///
    /// A weaker kind never displaces a stronger one, a stronger kind replaces
    /// a weaker one, and an alias replaces an alias.
    ///
    /// # Errors
    ///
    /// Returns [`UbiError::DuplicateIdentifier`] if `identifier` is already the
    /// primary identifier of another body.
    pub fn register(
        &mut self,
        identifier: &str,
        body: BodyId,
        kind: UbiKind,
    ) -> Result<(), UbiError> {
        let Some(&(existing, existing_kind)) = self.entries.get(identifier) else {
            self.entries.insert(identifier.to_owned(), (body, kind));
            return Ok(());
        };
        if existing == body {
            if kind > existing_kind {
                self.entries.insert(identifier.to_owned(), (body, kind));
            }
            return Ok(());
        }
        match (existing_kind, kind) {
            (UbiKind::Primary, UbiKind::Primary) => Err(UbiError::DuplicateIdentifier {
                identifier: identifier.to_owned(),
                existing,
                rejected: body,
            }),
            (stronger, weaker) if weaker < stronger => {
                debug!(identifier, ?existing, ?body, "identifier already taken by a stronger kind");
                Ok(())
            }
            _ => {
                debug!(identifier, ?existing, ?body, ?kind, "identifier reassigned");
                self.entries.insert(identifier.to_owned(), (body, kind));
                Ok(())
            }
        }
    }

    /// Returns the body `identifier` refers to.
    pub fn resolve(&self, identifier: &str) -> Option<BodyId> {
        self.entries.get(identifier).map(|&(body, _)| body)
    }

    /// Returns how `identifier` is bound, if it is.
    pub fn kind_of(&self, identifier: &str) -> Option<UbiKind> {
        self.entries.get(identifier).map(|&(_, kind)| kind)
    }

    /// Every identifier currently resolving to `body`, sorted.
    pub fn identifiers_of(&self, body: BodyId) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, (owner, _))| *owner == body)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: BodyId = BodyId(0);
    const B: BodyId = BodyId(1);

    #[test]
    fn test_primary_collision_fails() {
        let mut registry = UbiRegistry::new();
        registry.register("Squad/Kerbin", A, UbiKind::Primary).unwrap();
        let err = registry
            .register("Squad/Kerbin", B, UbiKind::Primary)
            .unwrap_err();
        assert!(matches!(
            err,
            UbiError::DuplicateIdentifier { existing: A, rejected: B, .. }
        ));
        assert_eq!(registry.resolve("Squad/Kerbin"), Some(A));
    }

    #[test]
    fn test_alias_collision_overwrites() {
        let mut registry = UbiRegistry::new();
        registry.register("Homeworld", A, UbiKind::Alias).unwrap();
        registry.register("Homeworld", B, UbiKind::Alias).unwrap();
        assert_eq!(registry.resolve("Homeworld"), Some(B));
    }

    #[test]
    fn test_stronger_kind_wins_regardless_of_order() {
        let mut registry = UbiRegistry::new();
        registry.register("Mun", A, UbiKind::Primary).unwrap();
        registry.register("Mun", B, UbiKind::Name).unwrap();
        registry.register("Mun", B, UbiKind::Alias).unwrap();
        assert_eq!(registry.resolve("Mun"), Some(A));

        registry.register("Minmus", A, UbiKind::Name).unwrap();
        registry.register("Minmus", B, UbiKind::Primary).unwrap();
        assert_eq!(registry.resolve("Minmus"), Some(B));
        assert_eq!(registry.kind_of("Minmus"), Some(UbiKind::Primary));
    }

    #[test]
    fn test_same_body_upgrades_kind() {
        let mut registry = UbiRegistry::new();
        registry.register("Eve", A, UbiKind::Name).unwrap();
        registry.register("Eve", A, UbiKind::Primary).unwrap();
        registry.register("Eve", A, UbiKind::Alias).unwrap();
        assert_eq!(registry.kind_of("Eve"), Some(UbiKind::Primary));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_identifiers_of() {
        let mut registry = UbiRegistry::new();
        registry.register("Kerbin", A, UbiKind::Name).unwrap();
        registry.register("Squad/Kerbin", A, UbiKind::Primary).unwrap();
        registry.register("Squad/Mun", B, UbiKind::Primary).unwrap();
        assert_eq!(registry.identifiers_of(A), ["Kerbin", "Squad/Kerbin"]);
        assert!(registry.resolve("Duna").is_none());
    }
}
