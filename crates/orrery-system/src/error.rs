//! Error types for templates, identifiers, assembly and whole loads.

use orrery_parser::{BindError, ParseError};

use crate::body::BodyId;

/// Errors raised while cloning a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The catalog has no prototype with this name.
    #[error("template \"{0}\" does not name a known prototype body")]
    NotFound(String),
}

/// Errors raised by the identifier registry.
#[derive(Debug, thiserror::Error)]
pub enum UbiError {
    /// Two bodies claimed the same primary identifier.
    #[error("identifier \"{identifier}\" is already the primary identifier of another body")]
    DuplicateIdentifier {
        /// The contested identifier.
        identifier: String,
        /// Body that registered it first.
        existing: BodyId,
        /// Body that tried to register it again.
        rejected: BodyId,
    },
}

/// Fatal problems with a batch of bound bodies. Any of these aborts the load.
#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    /// Two bodies share a primary identifier.
    #[error("found duplicated body identifier \"{identifier}\" on \"{first}\" and \"{second}\"")]
    DuplicateIdentifier {
        /// The contested identifier.
        identifier: String,
        /// Body that claimed it first.
        first: String,
        /// Body that claimed it second.
        second: String,
    },

    /// An orbit has no `referenceBody`.
    #[error("orbit of \"{body}\" does not name a reference body")]
    MissingReference {
        /// Body owning the orbit.
        body: String,
    },

    /// An orbit names a reference body that is not part of the batch.
    #[error("reference body for \"{body}\" could not be found; missing body name is \"{reference}\"")]
    UnresolvedReference {
        /// Body owning the orbit.
        body: String,
        /// The identifier that did not resolve.
        reference: String,
    },

    /// An orbit names its own body.
    #[error("\"{body}\" cannot orbit itself")]
    SelfReference {
        /// Offending body.
        body: String,
    },

    /// Every body has an orbit.
    #[error("no root body: every body has an orbit")]
    NoRoot,

    /// Several bodies have no orbit.
    #[error("several bodies have no orbit and could be the root: {}", .bodies.join(", "))]
    MultipleRoots {
        /// Names of the orbit-less bodies.
        bodies: Vec<String>,
    },

    /// Some bodies only reach each other, never the root.
    #[error("bodies not connected to the root (circular references): {}", .bodies.join(", "))]
    Unreachable {
        /// Names of the disconnected bodies.
        bodies: Vec<String>,
    },

    /// Every flight index is already taken.
    #[error("no free flight index left for \"{body}\"")]
    FlightIndicesExhausted {
        /// Body that needed a new index.
        body: String,
    },

    /// No body satisfies the home predicate.
    #[error("homeworld body could not be found: no body matches {expected}")]
    NoHome {
        /// Description of the home predicate.
        expected: String,
    },
}

/// Errors that abort a whole load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// A configuration source could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The top-level system settings were rejected.
    #[error("invalid system settings: {0}")]
    Settings(#[source] BindError),

    /// The bound bodies do not form a valid system.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}
