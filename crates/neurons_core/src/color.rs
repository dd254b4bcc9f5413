//! Hex color parsing and lightening.
//!
//! Colors travel through the control surface as `#rrggbb` strings and are
//! parsed once into [`Rgb`]. Lightening adds the same amount to every channel
//! and clamps, so `lighten(c, 0)` is the identity and large percentages
//! saturate at white (or black for negative percentages).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::ColorError;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Fallback used when a color string cannot be parsed.
    pub const NEUTRAL: Rgb = Rgb::new(0x80, 0x80, 0x80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`, `rrggbb` or the `#rgb` shorthand.
    pub fn parse_hex(input: &str) -> Result<Self, ColorError> {
        let trimmed = input.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(input.to_string()));
        }

        match digits.len() {
            6 => {
                let value = u32::from_str_radix(digits, 16)
                    .map_err(|_| ColorError::InvalidHex(input.to_string()))?;
                Ok(Self::from_u32(value))
            }
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(digits.chars()) {
                    // to_digit cannot fail after the hexdigit check above
                    let nibble = c.to_digit(16).unwrap_or(0) as u8;
                    *slot = nibble * 0x11;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            _ => Err(ColorError::InvalidHex(input.to_string())),
        }
    }

    /// Parse, falling back to [`Rgb::NEUTRAL`] on malformed input.
    pub fn parse_or_neutral(input: &str) -> Self {
        match Self::parse_hex(input) {
            Ok(color) => color,
            Err(e) => {
                warn!(error = %e, fallback = %Self::NEUTRAL, "Color rejected, using neutral");
                Self::NEUTRAL
            }
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        Self::new(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.to_u32())
    }

    /// Add `round(2.55 * percent)` to every channel, clamped to `[0, 255]`.
    ///
    /// Rounding matches `Math.round`: halves go toward positive infinity,
    /// so `-0.5` rounds to `0` rather than `-1`.
    pub fn lighten(self, percent: f64) -> Self {
        let amount = (2.55 * percent + 0.5).floor();
        let shift = |channel: u8| -> u8 { (channel as f64 + amount).clamp(0.0, 255.0) as u8 };
        Self::new(shift(self.r), shift(self.g), shift(self.b))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_u32())
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_or_neutral(&raw))
    }
}

/// Lighten a hex color string by `percent` (negative darkens).
///
/// Never fails: malformed input is treated as [`Rgb::NEUTRAL`].
pub fn lighten(color: &str, percent: f64) -> String {
    Rgb::parse_or_neutral(color).lighten(percent).to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Rgb::parse_hex("#43B565").unwrap(), Rgb::new(0x43, 0xB5, 0x65));
        assert_eq!(Rgb::parse_hex("43b565").unwrap(), Rgb::new(0x43, 0xB5, 0x65));
        assert_eq!(Rgb::parse_hex("#fa0").unwrap(), Rgb::new(0xFF, 0xAA, 0x00));
        assert!(Rgb::parse_hex("#43B56").is_err());
        assert!(Rgb::parse_hex("#zzzzzz").is_err());
        assert!(Rgb::parse_hex("").is_err());
        assert!(Rgb::parse_hex("#+1b565").is_err());
    }

    #[test]
    fn test_lighten_identity() {
        assert_eq!(lighten("#43b565", 0.0), "#43b565");
        assert_eq!(lighten("#000000", 0.0), "#000000");
        assert_eq!(lighten("#ffffff", 0.0), "#ffffff");
    }

    #[test]
    fn test_default_core_color() {
        // 2.55 * -20 = -51 on every channel
        assert_eq!(lighten("#43B565", -20.0), "#108232");
    }

    #[test]
    fn test_lighten_clamps_instead_of_wrapping() {
        assert_eq!(lighten("#f0f0f0", 50.0), "#ffffff");
        assert_eq!(lighten("#101010", -50.0), "#000000");
        assert_eq!(lighten("#ff0080", 10.0), "#ff1a9a");
    }

    #[test]
    fn test_rounding_matches_math_round() {
        // 2.55 * 0.2 = 0.51 -> 1
        assert_eq!(Rgb::new(10, 10, 10).lighten(0.2), Rgb::new(11, 11, 11));
        // 2.55 * -0.1 = -0.255 -> 0
        assert_eq!(Rgb::new(10, 10, 10).lighten(-0.1), Rgb::new(10, 10, 10));
    }

    #[test]
    fn test_monotonic_for_all_integer_percents() {
        let samples = [
            Rgb::new(0, 0, 0),
            Rgb::new(255, 255, 255),
            Rgb::new(0x43, 0xB5, 0x65),
            Rgb::new(1, 128, 254),
        ];
        for base in samples {
            for percent in -150..=150 {
                let out = base.lighten(percent as f64);
                if percent > 0 {
                    assert!(out.r >= base.r && out.g >= base.g && out.b >= base.b);
                } else if percent < 0 {
                    assert!(out.r <= base.r && out.g <= base.g && out.b <= base.b);
                } else {
                    assert_eq!(out, base);
                }
            }
        }
    }

    #[test]
    fn test_malformed_fails_closed() {
        assert_eq!(lighten("not a color", 0.0), "#808080");
        assert_eq!(lighten("#12", 10.0), Rgb::NEUTRAL.lighten(10.0).to_hex());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(0x43, 0xB5, 0x65)).unwrap();
        assert_eq!(json, "\"#43b565\"");
        let back: Rgb = serde_json::from_str("\"#43B565\"").unwrap();
        assert_eq!(back, Rgb::new(0x43, 0xB5, 0x65));
        let fallback: Rgb = serde_json::from_str("\"oops\"").unwrap();
        assert_eq!(fallback, Rgb::NEUTRAL);
    }
}
