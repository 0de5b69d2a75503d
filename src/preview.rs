//! Top-down still image of the sea rendered on the CPU with the reference kernels.
//!
//! No window or GPU: the same `WaveField` and `shade` the tests pin down are sampled
//! once per pixel over the mesh extent.

use std::path::Path;

use clap::ValueEnum;
use glam::Vec2;
use image::{GrayImage, Luma, Rgb as Rgb8, RgbImage};
use noise::{NoiseFn, Perlin};

use crate::error::RenderError;
use crate::frame::FrameSnapshot;
use crate::noise::GradientNoise;
use crate::ocean::{shade, SurfacePoint, WaveField};

/// Noise source for the CPU kernels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum NoiseSource {
    /// Built-in gradient noise, identical to the GPU shader
    #[default]
    Gradient,

    /// `noise::Perlin` with its default seed
    Perlin,
}

/// Still image settings
#[derive(Debug, Clone)]
pub struct PreviewConfig {
    /// Output width = height (pixels)
    pub size: u32,

    /// Side length of the square of sea covered (world units)
    pub extent: f32,

    /// Grayscale elevation instead of shaded color
    pub heightmap: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            size: 512,
            extent: 20.0,
            heightmap: false,
        }
    }
}

impl PreviewConfig {
    /// Mesh-local (x, z) at the center of pixel (px, py), origin in the image center
    pub fn surface_point(&self, px: u32, py: u32) -> Vec2 {
        let size = self.size.max(1) as f32;
        let u = (px as f32 + 0.5) / size - 0.5;
        let v = (py as f32 + 0.5) / size - 0.5;
        Vec2::new(u, v) * self.extent
    }

    fn sample_at(&self, px: u32, py: u32, time_s: f32) -> SurfacePoint {
        SurfacePoint {
            position: self.surface_point(px, py),
            time_s,
        }
    }
}

/// Shaded sea seen from above
pub fn render_color<N: NoiseFn<f64, 2>>(
    field: &WaveField<N>,
    snapshot: &FrameSnapshot,
    config: &PreviewConfig,
) -> RgbImage {
    RgbImage::from_fn(config.size, config.size, |x, y| {
        let e = field.sample(config.sample_at(x, y, snapshot.time_s), &snapshot.wave);
        Rgb8(shade(e, &snapshot.color).to_srgb8())
    })
}

/// Elevation mapped to gray, `peak` and `-peak` saturating to white and black
pub fn render_heightmap<N: NoiseFn<f64, 2>>(
    field: &WaveField<N>,
    snapshot: &FrameSnapshot,
    config: &PreviewConfig,
) -> GrayImage {
    let peak = snapshot.wave.peak_elevation().max(f32::EPSILON);
    GrayImage::from_fn(config.size, config.size, |x, y| {
        let e = field.sample(config.sample_at(x, y, snapshot.time_s), &snapshot.wave);
        let gray = ((e / peak + 1.0) * 127.5).clamp(0.0, 255.0) as u8;
        Luma([gray])
    })
}

/// Render with `source` and write a PNG to `path`
pub fn save_preview(
    path: &Path,
    source: NoiseSource,
    snapshot: &FrameSnapshot,
    config: &PreviewConfig,
) -> Result<(), RenderError> {
    match source {
        NoiseSource::Gradient => write(path, &WaveField::new(GradientNoise), snapshot, config),
        NoiseSource::Perlin => write(path, &WaveField::new(Perlin::default()), snapshot, config),
    }
}

fn write<N: NoiseFn<f64, 2>>(
    path: &Path,
    field: &WaveField<N>,
    snapshot: &FrameSnapshot,
    config: &PreviewConfig,
) -> Result<(), RenderError> {
    if config.heightmap {
        render_heightmap(field, snapshot, config).save(path)?;
    } else {
        render_color(field, snapshot, config).save(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ColorParameters, WaveParameters};

    fn snapshot(wave: WaveParameters) -> FrameSnapshot {
        FrameSnapshot::capture(0.0, &wave, &ColorParameters::default())
    }

    fn small_config() -> PreviewConfig {
        PreviewConfig {
            size: 16,
            ..PreviewConfig::default()
        }
    }

    #[test]
    fn test_pixel_centers_cover_extent_symmetrically() {
        let config = PreviewConfig {
            size: 4,
            extent: 20.0,
            heightmap: false,
        };
        assert_eq!(config.surface_point(0, 0), Vec2::new(-7.5, -7.5));
        assert_eq!(config.surface_point(3, 3), Vec2::new(7.5, 7.5));
    }

    #[test]
    fn test_flat_sea_is_uniform_blend() {
        let wave = WaveParameters {
            big_elevation: 0.0,
            small_elevation: 0.0,
            ..WaveParameters::default()
        };
        let snap = snapshot(wave);
        let image = render_color(&WaveField::new(GradientNoise), &snap, &small_config());

        let expected = Rgb8(shade(0.0, &snap.color).to_srgb8());
        assert!(image.pixels().all(|p| *p == expected));
    }

    #[test]
    fn test_color_stays_between_depth_and_surface() {
        let snap = snapshot(WaveParameters::default());
        let image = render_color(&WaveField::new(GradientNoise), &snap, &small_config());

        let depth = snap.color.depth_color.to_srgb8();
        let surface = snap.color.surface_color.to_srgb8();
        for pixel in image.pixels() {
            for c in 0..3 {
                let (lo, hi) = (depth[c].min(surface[c]), depth[c].max(surface[c]));
                assert!(pixel.0[c] >= lo && pixel.0[c] <= hi);
            }
        }
    }

    #[test]
    fn test_heightmap_follows_big_wave() {
        // Swell along x only, no octaves: gray varies across columns, not rows
        let wave = WaveParameters {
            big_frequency: [1.0, 0.0],
            small_iterations: 0,
            ..WaveParameters::default()
        };
        let snap = snapshot(wave);
        let image = render_heightmap(&WaveField::new(GradientNoise), &snap, &small_config());

        for x in 0..16 {
            let column = image.get_pixel(x, 0);
            assert!((0..16).all(|y| image.get_pixel(x, y) == column));
        }
        assert!(image.pixels().any(|p| p.0[0] > 200));
        assert!(image.pixels().any(|p| p.0[0] < 55));
    }

    #[test]
    fn test_perlin_source_renders() {
        let snap = snapshot(WaveParameters::default());
        let image = render_color(&WaveField::new(Perlin::default()), &snap, &small_config());
        assert_eq!(image.dimensions(), (16, 16));
    }
}
