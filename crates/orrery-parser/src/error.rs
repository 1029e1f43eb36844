//! Error types for reading, converting and binding configuration.

use std::path::PathBuf;

/// Errors produced while reading the configuration text format.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The source file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A closing brace appeared with no open node.
    #[error("line {line}: unmatched `}}`")]
    UnmatchedClose {
        /// 1-based line of the brace.
        line: usize,
    },

    /// The input ended while a node was still open.
    #[error("line {line}: node `{name}` is never closed")]
    UnterminatedNode {
        /// Name of the open node.
        name: String,
        /// 1-based line where the node was opened.
        line: usize,
    },

    /// An opening brace was not preceded by a node name.
    #[error("line {line}: `{{` without a node name")]
    MissingNodeName {
        /// 1-based line of the brace.
        line: usize,
    },

    /// A bare word was not followed by `{` or `=`.
    #[error("line {line}: expected `{{` or `=` after `{word}`")]
    DanglingWord {
        /// The stray text.
        word: String,
        /// 1-based line of the text.
        line: usize,
    },

    /// A `= value` line had nothing before the equals sign.
    #[error("line {line}: value without a key")]
    MissingKey {
        /// 1-based line of the value.
        line: usize,
    },
}

/// A leaf literal could not be converted to the requested type.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// The literal does not have the expected shape.
    #[error("expected {expected}, found `{literal}`")]
    Invalid {
        /// Human readable description of the expected type.
        expected: &'static str,
        /// The rejected literal.
        literal: String,
    },

    /// A multi-component literal has the wrong number of components.
    #[error("expected {expected} components, found {found} in `{literal}`")]
    Arity {
        /// Number of components required.
        expected: usize,
        /// Number of components present.
        found: usize,
        /// The rejected literal.
        literal: String,
    },

    /// No variant of an enumeration matches the literal.
    #[error("`{literal}` is not a valid {enumeration}")]
    UnknownVariant {
        /// Name of the enumeration.
        enumeration: &'static str,
        /// The rejected literal.
        literal: String,
    },

    /// A curve key has fewer than the two mandatory numbers.
    #[error("curve key {index} (`{literal}`) needs at least a time and a value")]
    CurveKey {
        /// 0-based index of the key within the curve node.
        index: usize,
        /// The rejected literal.
        literal: String,
    },
}

/// Errors produced while binding a configuration node onto a target.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A required member had no matching entry.
    #[error("missing required entry `{key}` in {target}")]
    MissingRequired {
        /// Schema name of the target.
        target: &'static str,
        /// Primary key of the member.
        key: &'static str,
    },

    /// An entry matched no member of a strict target.
    #[error("unexpected entry `{key}` in {target}")]
    UnknownEntry {
        /// Schema name of the target.
        target: &'static str,
        /// The unmatched key or node name.
        key: String,
    },

    /// A value member found only a node under its key.
    #[error("`{key}` must be a value, found a node")]
    ExpectedValue {
        /// Key that was matched.
        key: String,
    },

    /// A node member found only a value under its key.
    #[error("`{key}` must be a node, found a value")]
    ExpectedNode {
        /// Key that was matched.
        key: String,
    },

    /// A literal was rejected by its converter.
    #[error(transparent)]
    Convert(#[from] ConvertError),

    /// A lifecycle hook rejected the target.
    #[error("{0}")]
    Rejected(String),

    /// A failure raised by a collaborator during binding.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),

    /// A failure inside the member bound under `key`.
    #[error("{key}: {source}")]
    At {
        /// Key (or `Key[index]` for collection elements) where binding failed.
        key: String,
        /// Failure inside that member.
        #[source]
        source: Box<BindError>,
    },
}

impl BindError {
    /// Wraps a collaborator error.
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }

    /// Adds the member key to the error path.
    pub fn at(self, key: impl Into<String>) -> Self {
        Self::At {
            key: key.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping member path wrappers.
    pub fn root_cause(&self) -> &BindError {
        match self {
            Self::At { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
