//! Elevation-gated blend between the depth and surface colors.

use crate::params::{ColorParameters, Rgb};

/// Interpolation weight toward the surface color, always in [0, 1]
pub fn mix_factor(elevation: f32, colors: &ColorParameters) -> f32 {
    let raw = colors.color_offset + elevation * colors.color_multiplier;
    // NaN would otherwise slip through clamp
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 1.0)
}

/// Final surface color for an interpolated elevation
pub fn shade(elevation: f32, colors: &ColorParameters) -> Rgb {
    colors
        .depth_color
        .lerp(colors.surface_color, mix_factor(elevation, colors))
}
