//! RGBA colors and their literal forms.

use crate::convert::{Parsable, components};
use crate::error::ConvertError;

/// A linear RGBA color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from components in `[0, 1]`.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from hue, saturation, brightness and alpha in `[0, 1]`.
    pub fn from_hsba(h: f32, s: f32, v: f32, a: f32) -> Self {
        if s <= 0.0 {
            return Self::new(v, v, v, a);
        }
        let h6 = (h.rem_euclid(1.0)) * 6.0;
        let sector = h6.floor();
        let f = h6 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::new(r, g, b, a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Returns the argument list of `NAME(...)`, matching the name without case.
fn call_args<'a>(literal: &'a str, name: &str) -> Option<&'a str> {
    let head = literal.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    literal[name.len()..]
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn hex_channel(literal: &str, digits: &str) -> Result<f32, ConvertError> {
    u8::from_str_radix(digits, 16)
        .map(|v| f32::from(v) / 255.0)
        .map_err(|_| ConvertError::Invalid {
            expected: "a hex color",
            literal: literal.to_owned(),
        })
}

fn parse_hex(literal: &str, digits: &str) -> Result<Color, ConvertError> {
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return Err(ConvertError::Invalid {
            expected: "a hex color",
            literal: literal.to_owned(),
        });
    }
    let alpha = if digits.len() == 8 {
        hex_channel(literal, &digits[6..8])?
    } else {
        1.0
    };
    Ok(Color::new(
        hex_channel(literal, &digits[0..2])?,
        hex_channel(literal, &digits[2..4])?,
        hex_channel(literal, &digits[4..6])?,
        alpha,
    ))
}

impl Parsable for Color {
    /// Accepts `RGBA(r,g,b,a)`, `RGB(r,g,b)`, `HSBA(h,s,b,a)` and `HSB(h,s,b)`
    /// with 0-255 components, `#RRGGBB[AA]`, or plain `r,g,b[,a]` in `[0, 1]`.
    fn parse(literal: &str) -> Result<Self, ConvertError> {
        let literal = literal.trim();
        if let Some(args) = call_args(literal, "RGBA") {
            let [r, g, b, a] = components::<f32, 4>(args)?;
            return Ok(Color::new(r / 255.0, g / 255.0, b / 255.0, a / 255.0));
        }
        if let Some(args) = call_args(literal, "RGB") {
            let [r, g, b] = components::<f32, 3>(args)?;
            return Ok(Color::new(r / 255.0, g / 255.0, b / 255.0, 1.0));
        }
        if let Some(args) = call_args(literal, "HSBA") {
            let [h, s, v, a] = components::<f32, 4>(args)?;
            return Ok(Color::from_hsba(h / 255.0, s / 255.0, v / 255.0, a / 255.0));
        }
        if let Some(args) = call_args(literal, "HSB") {
            let [h, s, v] = components::<f32, 3>(args)?;
            return Ok(Color::from_hsba(h / 255.0, s / 255.0, v / 255.0, 1.0));
        }
        if let Some(digits) = literal.strip_prefix('#') {
            return parse_hex(literal, digits);
        }
        match components::<f32, 4>(literal) {
            Ok([r, g, b, a]) => Ok(Color::new(r, g, b, a)),
            Err(ConvertError::Arity { found: 3, .. }) => {
                let [r, g, b] = components::<f32, 3>(literal)?;
                Ok(Color::new(r, g, b, 1.0))
            }
            Err(err) => Err(err),
        }
    }

    fn to_literal(&self) -> String {
        format!("{},{},{},{}", self.r, self.g, self.b, self.a)
    }
}
