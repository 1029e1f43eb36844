//! List-valued literals.

use crate::convert::Parsable;
use crate::error::ConvertError;

/// A list of numbers separated by spaces, commas, semicolons or tabs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumericCollection<T>(pub Vec<T>);

impl<T> NumericCollection<T> {
    /// Unwraps the list.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }

    /// The list as a slice.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: Parsable> Parsable for NumericCollection<T> {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        literal
            .split([' ', ',', ';', '\t'])
            .filter(|p| !p.is_empty())
            .map(T::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    fn to_literal(&self) -> String {
        self.0
            .iter()
            .map(Parsable::to_literal)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A comma separated list of trimmed strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringCollection(pub Vec<String>);

impl StringCollection {
    /// Unwraps the list.
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if `entry` is in the list.
    pub fn contains(&self, entry: &str) -> bool {
        self.0.iter().any(|e| e == entry)
    }
}

impl Parsable for StringCollection {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        Ok(Self(
            literal
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }

    fn to_literal(&self) -> String {
        self.0.join(", ")
    }
}
