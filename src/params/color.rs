//! Surface coloring parameters and linear RGB colors.

use std::fmt;
use std::str::FromStr;

use crate::error::ColorParseError;

/// Linear RGB color, each channel nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (or `rrggbb`), decoding sRGB to linear
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError::Length(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| srgb_to_linear(v as f32 / 255.0))
                .map_err(|_| ColorParseError::Digit(hex.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Encode back to `#rrggbb` (sRGB)
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_srgb8();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// 8-bit sRGB-encoded channels, clamped to [0, 1] first
    pub fn to_srgb8(self) -> [u8; 3] {
        let encode = |c: f32| (linear_to_srgb(c.clamp(0.0, 1.0)) * 255.0).round() as u8;
        [encode(self.r), encode(self.g), encode(self.b)]
    }

    /// Channel-wise linear interpolation, `t = 0` gives `self`
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Elevation-to-color blend parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorParameters {
    /// Color of wave troughs (mix factor 0)
    pub depth_color: Rgb,

    /// Color of wave crests (mix factor 1)
    pub surface_color: Rgb,

    /// Baseline mix factor for a flat sea
    pub color_offset: f32,

    /// Mix factor gained per unit of elevation (contrast)
    pub color_multiplier: f32,
}

pub const DEFAULT_DEPTH_COLOR: &str = "#151c37";
pub const DEFAULT_SURFACE_COLOR: &str = "#0b3c20";

impl Default for ColorParameters {
    fn default() -> Self {
        Self {
            // Linear values of #151c37 and #0b3c20
            depth_color: Rgb::new(0.007_499, 0.011_612, 0.038_204),
            surface_color: Rgb::new(0.003_347, 0.045_186, 0.014_444),
            color_offset: 0.3,
            color_multiplier: 0.9,
        }
    }
}
