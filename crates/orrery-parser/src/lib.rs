//! Configuration trees and the declarative binder that maps them onto typed objects.
//!
//! A planetary system is described as nested [`ConfigNode`]s read from the text
//! format in [`text`]. Leaf values are turned into typed values by the
//! converters in [`convert`], and whole nodes are bound onto [`Bindable`]
//! targets by [`bind()`], which drives the pre-apply / apply / post-apply
//! lifecycle.

pub mod bind;
pub mod convert;
mod error;
mod node;
pub mod text;

pub use bind::{BindContext, Bindable, Member, MergePolicy, Phase, Schema, bind, create};
pub use convert::{
    Color, ConfigEnum, CurveKey, FloatCurve, NodeParsable, NumericCollection, Parsable,
    StringCollection,
};
pub use error::{BindError, ConvertError, ParseError};
pub use node::ConfigNode;
pub use text::{parse_file, parse_str};
