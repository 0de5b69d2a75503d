//! Gradient noise shared by the CPU reference and the WGSL water shader.
//!
//! The lattice hash and gradient table are mirrored operation-for-operation in
//! `shaders/water.wgsl` (`lattice_hash`, `gradient_noise`) so both sides agree to float
//! tolerance. Any `noise::NoiseFn<f64, 2>` can stand in for it on the CPU.

use glam::Vec2;
use noise::NoiseFn;

const DIAGONAL: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Unit gradients indexed by the low three hash bits
const GRADIENTS: [Vec2; 8] = [
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(DIAGONAL, DIAGONAL),
    Vec2::new(-DIAGONAL, DIAGONAL),
    Vec2::new(DIAGONAL, -DIAGONAL),
    Vec2::new(-DIAGONAL, -DIAGONAL),
];

/// Rescales the 2D gradient-noise peak (√2 / 2) to 1
const OUTPUT_SCALE: f32 = std::f32::consts::SQRT_2;

/// Deterministic, unseeded 2D gradient noise
///
/// Continuous with continuous first and second derivatives (quintic fade), zero on
/// every integer lattice point, range approximately [-1, 1].
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientNoise;

impl GradientNoise {
    pub fn new() -> Self {
        Self
    }

    /// Sample noise at `p`
    pub fn sample(&self, p: Vec2) -> f32 {
        let cell = p.floor();
        let f = p - cell;
        let (ix, iy) = (cell.x as i32, cell.y as i32);

        let n00 = corner(ix, iy, f);
        let n10 = corner(ix.wrapping_add(1), iy, f - Vec2::X);
        let n01 = corner(ix, iy.wrapping_add(1), f - Vec2::Y);
        let n11 = corner(ix.wrapping_add(1), iy.wrapping_add(1), f - Vec2::ONE);

        let u = fade(f.x);
        let v = fade(f.y);

        let bottom = n00 + (n10 - n00) * u;
        let top = n01 + (n11 - n01) * u;
        (bottom + (top - bottom) * v) * OUTPUT_SCALE
    }
}

impl NoiseFn<f64, 2> for GradientNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(Vec2::new(point[0] as f32, point[1] as f32)) as f64
    }
}

fn corner(ix: i32, iy: i32, offset: Vec2) -> f32 {
    let gradient = GRADIENTS[(lattice_hash(ix, iy) & 7) as usize];
    gradient.dot(offset)
}

/// Quintic smoothstep 6t^5 - 15t^4 + 10t^3
fn fade(t: f32) -> f32 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Integer hash of a lattice corner (PCG output permutation)
pub fn lattice_hash(ix: i32, iy: i32) -> u32 {
    let seed = (ix as u32).wrapping_mul(0x8da6_b343) ^ (iy as u32).wrapping_mul(0xd816_3841);
    let state = seed.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277_803_737);
    (word >> 22) ^ word
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_on_lattice_points() {
        let noise = GradientNoise::new();
        for x in -5..5 {
            for y in -5..5 {
                let p = Vec2::new(x as f32, y as f32);
                assert_eq!(noise.sample(p), 0.0, "nonzero at {p}");
            }
        }
    }

    #[test]
    fn test_not_constant() {
        let noise = GradientNoise::new();
        let samples: Vec<f32> = (0..64)
            .map(|i| noise.sample(Vec2::new(i as f32 * 0.37 + 0.13, i as f32 * 0.21 + 0.29)))
            .collect();
        let spread = samples.iter().cloned().fold(f32::MIN, f32::max)
            - samples.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread > 0.2, "noise too flat, spread {spread}");
    }

    #[test]
    fn test_continuous_across_cell_edges() {
        let noise = GradientNoise::new();
        let eps = 1e-4;
        for i in -8..8 {
            for j in 0..16 {
                let edge = i as f32;
                let along = j as f32 * 0.0625 + 0.03;

                let left = noise.sample(Vec2::new(edge - eps, along));
                let right = noise.sample(Vec2::new(edge + eps, along));
                assert!((left - right).abs() < 1e-3, "x-edge jump at {edge}");

                let below = noise.sample(Vec2::new(along, edge - eps));
                let above = noise.sample(Vec2::new(along, edge + eps));
                assert!((below - above).abs() < 1e-3, "y-edge jump at {edge}");
            }
        }
    }

    #[test]
    fn test_noise_fn_matches_sample() {
        let noise = GradientNoise::new();
        let p = Vec2::new(3.25, -1.75);
        assert_eq!(noise.get([3.25, -1.75]), noise.sample(p) as f64);
    }

    #[test]
    fn test_hash_spreads_gradients() {
        let mut seen = [false; 8];
        for x in 0..16 {
            for y in 0..16 {
                seen[(lattice_hash(x, y) & 7) as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    proptest! {
        #[test]
        fn prop_bounded(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
            let n = GradientNoise::new().sample(Vec2::new(x, y));
            prop_assert!(n.abs() <= 1.0 + 1e-4, "|noise| = {}", n.abs());
        }

        #[test]
        fn prop_deterministic(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
            let p = Vec2::new(x, y);
            let a = GradientNoise::new().sample(p);
            let b = GradientNoise.sample(p);
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }
    }
}
