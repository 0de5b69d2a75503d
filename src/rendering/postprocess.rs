//! CPU reference for the depth-of-field composite and viewport sizing.
//!
//! `dof.wgsl` evaluates the same circle-of-confusion and tone curve per pixel.

use crate::params::DepthOfFieldConfig;

/// Number of gather taps in the bokeh disk
pub const BOKEH_TAPS: u32 = 32;

/// Golden angle in radians, spacing of successive taps
pub const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Hermite smoothstep, same definition as WGSL `smoothstep`
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// View-space distance mapped to [0, 1] over the camera range
pub fn normalized_depth(view_depth: f32, near: f32, far: f32) -> f32 {
    ((view_depth - near) / (far - near)).clamp(0.0, 1.0)
}

impl DepthOfFieldConfig {
    /// Blur amount in [0, 1] for a normalized depth
    pub fn circle_of_confusion(&self, depth: f32) -> f32 {
        smoothstep(
            0.0,
            self.focal_length.max(1e-6),
            (depth - self.focus_distance).abs(),
        )
    }

    /// Blur radius in pixels for a normalized depth
    pub fn blur_radius(&self, depth: f32) -> f32 {
        self.circle_of_confusion(depth) * self.bokeh_scale
    }
}

/// Offsets of the bokeh gather disk, unit radius
pub fn bokeh_taps() -> impl Iterator<Item = (f32, f32)> {
    (0..BOKEH_TAPS).map(|i| {
        let radius = ((i as f32 + 0.5) / BOKEH_TAPS as f32).sqrt();
        let (sin, cos) = (i as f32 * GOLDEN_ANGLE).sin_cos();
        (cos * radius, sin * radius)
    })
}

/// ACES filmic curve (Narkowicz fit), per channel
pub fn aces_filmic(x: f32) -> f32 {
    let x = x.max(0.0);
    ((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14)).clamp(0.0, 1.0)
}

/// Output and offscreen sizes for a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Swapchain size (physical pixels)
    pub surface: (u32, u32),

    /// Scene render size after the pixel-ratio cap
    pub render: (u32, u32),
}

impl Viewport {
    /// Size buffers for a window of `physical` pixels at `scale_factor` device pixels per
    /// logical pixel, rendering the scene at no more than `max_pixel_ratio`
    pub fn new(physical: (u32, u32), scale_factor: f64, max_pixel_ratio: f64) -> Self {
        let surface = (physical.0.max(1), physical.1.max(1));
        let scale = if scale_factor > max_pixel_ratio && scale_factor > 0.0 {
            max_pixel_ratio / scale_factor
        } else {
            1.0
        };
        let render = (
            ((surface.0 as f64 * scale).round() as u32).max(1),
            ((surface.1 as f64 * scale).round() as u32).max(1),
        );
        Self { surface, render }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface.0 as f32 / self.surface.1 as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_focus_plane_is_sharp() {
        let dof = DepthOfFieldConfig::default();
        assert_eq!(dof.circle_of_confusion(dof.focus_distance), 0.0);
        assert_eq!(dof.blur_radius(dof.focus_distance), 0.0);
    }

    #[test]
    fn test_coc_saturates_at_focal_length() {
        let dof = DepthOfFieldConfig::default();
        let far = dof.focus_distance + dof.focal_length;
        assert!((dof.circle_of_confusion(far) - 1.0).abs() < 1e-5);
        assert_eq!(dof.circle_of_confusion(1.0), 1.0);
        assert_eq!(dof.blur_radius(1.0), dof.bokeh_scale);

        let near = (dof.focus_distance - dof.focal_length * 0.5).max(0.0);
        let half = dof.circle_of_confusion(near);
        assert!(half > 0.0 && half < 1.0);
    }

    #[test]
    fn test_zero_focal_length_does_not_divide_by_zero() {
        let dof = DepthOfFieldConfig {
            focal_length: 0.0,
            ..DepthOfFieldConfig::default()
        };
        assert!(dof.circle_of_confusion(0.5).is_finite());
    }

    #[test]
    fn test_normalized_depth_range() {
        assert_eq!(normalized_depth(0.1, 0.1, 100.0), 0.0);
        assert_eq!(normalized_depth(100.0, 0.1, 100.0), 1.0);
        assert_eq!(normalized_depth(500.0, 0.1, 100.0), 1.0);
        assert!((normalized_depth(7.5925, 0.1, 100.0) - 0.075).abs() < 1e-4);
    }

    #[test]
    fn test_bokeh_taps_inside_unit_disk() {
        let taps: Vec<_> = bokeh_taps().collect();
        assert_eq!(taps.len(), BOKEH_TAPS as usize);
        assert!(taps.iter().all(|(x, y)| x * x + y * y <= 1.0 + 1e-6));
    }

    #[test]
    fn test_aces_monotonic_and_bounded() {
        let mut last = aces_filmic(0.0);
        assert!(last.abs() < 1e-6);
        for i in 1..200 {
            let v = aces_filmic(i as f32 * 0.05);
            assert!(v >= last);
            assert!(v <= 1.0);
            last = v;
        }
    }

    #[test]
    fn test_pixel_ratio_capped_at_two() {
        let retina = Viewport::new((2560, 1440), 2.0, 2.0);
        assert_eq!(retina.render, (2560, 1440));

        let dense = Viewport::new((3000, 1500), 3.0, 2.0);
        assert_eq!(dense.surface, (3000, 1500));
        assert_eq!(dense.render, (2000, 1000));
        assert_eq!(dense.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_minimized_window_keeps_valid_size() {
        let viewport = Viewport::new((0, 0), 1.0, 2.0);
        assert_eq!(viewport.surface, (1, 1));
        assert_eq!(viewport.render, (1, 1));
    }
}
