//! Leaf value converters.
//!
//! [`Parsable`] converts between a single literal and a typed value.
//! [`NodeParsable`] does the same for values spread over a whole node, such as
//! a [`FloatCurve`].

mod collection;
mod color;
mod curve;

pub use collection::{NumericCollection, StringCollection};
pub use color::Color;
pub use curve::{CurveKey, FloatCurve};

use glam::{DVec3, Quat, Vec2, Vec3, Vec4};

use crate::error::ConvertError;
use crate::node::ConfigNode;

/// A value that can be read from and written to a single literal.
pub trait Parsable: Sized {
    /// Converts a literal into a value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] describing why the literal was rejected.
    fn parse(literal: &str) -> Result<Self, ConvertError>;

    /// Converts the value back into a literal accepted by [`parse`](Self::parse).
    fn to_literal(&self) -> String;
}

/// A value that is read from and written to a whole node.
pub trait NodeParsable: Sized {
    /// Converts a node into a value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`] describing the first rejected entry.
    fn from_node(node: &ConfigNode) -> Result<Self, ConvertError>;

    /// Writes the value as a node called `name`.
    fn to_node(&self, name: &str) -> ConfigNode;
}

/// An enumeration with a fixed table of literal names.
pub trait ConfigEnum: Sized + Copy + PartialEq + 'static {
    /// Name used in error messages.
    const NAME: &'static str;
    /// Canonical literal for every variant.
    const VARIANTS: &'static [(&'static str, Self)];
}

/// Parses an enumeration literal, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`ConvertError::UnknownVariant`] if no variant matches.
pub fn parse_enum<E: ConfigEnum>(literal: &str) -> Result<E, ConvertError> {
    let literal = literal.trim();
    E::VARIANTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(literal))
        .map(|(_, value)| *value)
        .ok_or_else(|| ConvertError::UnknownVariant {
            enumeration: E::NAME,
            literal: literal.to_owned(),
        })
}

/// Canonical literal of an enumeration value.
pub fn enum_literal<E: ConfigEnum>(value: &E) -> &'static str {
    E::VARIANTS
        .iter()
        .find(|(_, v)| v == value)
        .map(|(name, _)| *name)
        .unwrap_or_default()
}

impl Parsable for String {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        Ok(literal.to_owned())
    }

    fn to_literal(&self) -> String {
        self.clone()
    }
}

impl Parsable for bool {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        let literal = literal.trim();
        if literal.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if literal.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ConvertError::Invalid {
                expected: "a boolean",
                literal: literal.to_owned(),
            })
        }
    }

    fn to_literal(&self) -> String {
        let literal = if *self { "True" } else { "False" };
        literal.to_owned()
    }
}

macro_rules! impl_numeric {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl Parsable for $ty {
                fn parse(literal: &str) -> Result<Self, ConvertError> {
                    literal.trim().parse().map_err(|_| ConvertError::Invalid {
                        expected: $expected,
                        literal: literal.to_owned(),
                    })
                }

                fn to_literal(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_numeric!(
    i8 => "an integer",
    i16 => "an integer",
    i32 => "an integer",
    i64 => "an integer",
    u8 => "a non-negative integer",
    u16 => "a non-negative integer",
    u32 => "a non-negative integer",
    u64 => "a non-negative integer",
    usize => "a non-negative integer",
    f32 => "a number",
    f64 => "a number",
);

/// Splits a vector literal on commas and whitespace into exactly `N` numbers.
pub(crate) fn components<T: Parsable + Copy + Default, const N: usize>(
    literal: &str,
) -> Result<[T; N], ConvertError> {
    let parts: Vec<&str> = literal
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != N {
        return Err(ConvertError::Arity {
            expected: N,
            found: parts.len(),
            literal: literal.to_owned(),
        });
    }
    let mut out = [T::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = T::parse(part)?;
    }
    Ok(out)
}

fn join_literals<T: Parsable>(values: &[T]) -> String {
    values
        .iter()
        .map(Parsable::to_literal)
        .collect::<Vec<_>>()
        .join(",")
}

impl Parsable for Vec2 {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        components::<f32, 2>(literal).map(Vec2::from_array)
    }

    fn to_literal(&self) -> String {
        join_literals(&self.to_array())
    }
}

impl Parsable for Vec3 {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        components::<f32, 3>(literal).map(Vec3::from_array)
    }

    fn to_literal(&self) -> String {
        join_literals(&self.to_array())
    }
}

impl Parsable for DVec3 {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        components::<f64, 3>(literal).map(DVec3::from_array)
    }

    fn to_literal(&self) -> String {
        join_literals(&self.to_array())
    }
}

impl Parsable for Vec4 {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        components::<f32, 4>(literal).map(Vec4::from_array)
    }

    fn to_literal(&self) -> String {
        join_literals(&self.to_array())
    }
}

impl Parsable for Quat {
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        components::<f32, 4>(literal).map(Quat::from_array)
    }

    fn to_literal(&self) -> String {
        join_literals(&self.to_array())
    }
}
