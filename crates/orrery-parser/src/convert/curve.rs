//! Keyframed float curves stored as repeated `key` entries.

use crate::convert::{NodeParsable, NumericCollection, Parsable};
use crate::error::ConvertError;
use crate::node::ConfigNode;

/// One keyframe of a [`FloatCurve`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurveKey {
    /// Position on the curve's input axis.
    pub time: f32,
    /// Curve value at `time`.
    pub value: f32,
    /// Slope entering the key.
    pub in_tangent: f32,
    /// Slope leaving the key.
    pub out_tangent: f32,
}

/// A cubic Hermite curve, written as `key = time value [inTangent outTangent]`.
///
/// Keys without tangents get flat ones. Keys are kept sorted by time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FloatCurve {
    keys: Vec<CurveKey>,
}

impl FloatCurve {
    /// Builds a curve from keys in any order.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Adds a key with flat tangents.
    pub fn add(&mut self, time: f32, value: f32) {
        let idx = self.keys.partition_point(|k| k.time <= time);
        self.keys.insert(
            idx,
            CurveKey {
                time,
                value,
                ..CurveKey::default()
            },
        );
    }

    /// Keys in time order.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluates the curve, holding the end values outside the key range.
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let upper = self.keys.partition_point(|k| k.time <= time);
        let k0 = self.keys[upper - 1];
        let k1 = self.keys[upper];
        let dt = k1.time - k0.time;
        if dt <= f32::EPSILON {
            return k1.value;
        }
        let s = (time - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        h00 * k0.value + h10 * k0.out_tangent * dt + h01 * k1.value + h11 * k1.in_tangent * dt
    }
}

impl NodeParsable for FloatCurve {
    fn from_node(node: &ConfigNode) -> Result<Self, ConvertError> {
        let mut keys = Vec::new();
        for (index, literal) in node.values_of("key").enumerate() {
            let numbers = NumericCollection::<f32>::parse(literal)?.into_inner();
            let key = match numbers.as_slice() {
                [time, value, in_tangent, out_tangent] => CurveKey {
                    time: *time,
                    value: *value,
                    in_tangent: *in_tangent,
                    out_tangent: *out_tangent,
                },
                [time, value, ..] => CurveKey {
                    time: *time,
                    value: *value,
                    ..CurveKey::default()
                },
                _ => {
                    return Err(ConvertError::CurveKey {
                        index,
                        literal: literal.to_owned(),
                    });
                }
            };
            keys.push(key);
        }
        Ok(Self::new(keys))
    }

    fn to_node(&self, name: &str) -> ConfigNode {
        let mut node = ConfigNode::new(name);
        for key in &self.keys {
            node.add_value(
                "key",
                format!(
                    "{} {} {} {}",
                    key.time, key.value, key.in_tangent, key.out_tangent
                ),
            );
        }
        node
    }
}
