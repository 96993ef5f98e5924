//! RGBA color value used for annotation styles.
//!
//! Colors serialize as CSS hex strings (`#RRGGBB` or `#RRGGBBAA`) so that
//! renderers and config files can use them directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An 8-bit-per-channel RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a 0.0-1.0 opacity.
    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// Parse `#RGB`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || ColorParseError(hex.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize, len: usize| -> Result<u8, ColorParseError> {
            let part = &digits[i * len..(i + 1) * len];
            let value = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            // #RGB shorthand expands each nibble (e.g. "f" -> "ff")
            Ok(if len == 1 { value * 17 } else { value })
        };

        match digits.len() {
            3 => Ok(Self::rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Self::rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            8 => Ok(Self::rgba(
                channel(0, 2)?,
                channel(1, 2)?,
                channel(2, 2)?,
                channel(3, 2)?,
            )),
            _ => Err(invalid()),
        }
    }

    /// CSS `rgba(...)` string for canvas renderers.
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            self.opacity()
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

/// A color string that is not valid hex notation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color '{0}', expected #RGB, #RRGGBB or #RRGGBBAA")]
pub struct ColorParseError(pub String);
