//! Analytic wave field: one directional swell plus constant-amplitude noise octaves.

use glam::Vec2;
use noise::NoiseFn;

use crate::noise::GradientNoise;
use crate::params::WaveParameters;

/// One evaluation site of the wave field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// Mesh-local (x, z)
    pub position: Vec2,

    /// Seconds since the frame driver started
    pub time_s: f32,
}

/// Wave field generator over any 2D noise source
///
/// Pure: the result depends only on (position, time, parameters).
#[derive(Debug, Clone, Default)]
pub struct WaveField<N = GradientNoise> {
    noise: N,
}

impl<N: NoiseFn<f64, 2>> WaveField<N> {
    pub fn new(noise: N) -> Self {
        Self { noise }
    }

    /// Dominant swell: `sin(dot(p, big_frequency) + t * big_speed) * big_elevation`
    pub fn big_wave(&self, p: Vec2, time_s: f32, params: &WaveParameters) -> f32 {
        let frequency = Vec2::from_array(params.big_frequency);
        (p.dot(frequency) + time_s * params.big_speed).sin() * params.big_elevation
    }

    /// Sum of `small_iterations` noise octaves
    ///
    /// Octave `i` samples at `small_frequency * (i + 1)`; amplitude stays `small_elevation`
    /// for every octave.
    pub fn small_waves(&self, p: Vec2, time_s: f32, params: &WaveParameters) -> f32 {
        let drift = Vec2::splat(time_s * params.small_speed);
        let mut elevation = 0.0;

        for i in 0..params.clamped_iterations() {
            let q = p * (params.small_frequency * (i + 1) as f32) + drift;
            elevation += self.noise.get([q.x as f64, q.y as f64]) as f32 * params.small_elevation;
        }

        elevation
    }

    /// Surface elevation at `p` (mesh-local x, z) and `time_s`
    pub fn elevation(&self, p: Vec2, time_s: f32, params: &WaveParameters) -> f32 {
        self.big_wave(p, time_s, params) + self.small_waves(p, time_s, params)
    }

    pub fn sample(&self, point: SurfacePoint, params: &WaveParameters) -> f32 {
        self.elevation(point.position, point.time_s, params)
    }
}

/// Elevation using the built-in gradient noise (the kernel the GPU runs)
pub fn elevation(p: Vec2, time_s: f32, params: &WaveParameters) -> f32 {
    WaveField::new(GradientNoise).elevation(p, time_s, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    fn swell_only() -> WaveParameters {
        WaveParameters {
            big_elevation: 0.15,
            big_frequency: [3.5, 2.0],
            big_speed: 0.95,
            small_iterations: 0,
            ..WaveParameters::default()
        }
    }

    #[test]
    fn test_origin_at_time_zero_is_flat() {
        assert_eq!(elevation(Vec2::ZERO, 0.0, &swell_only()), 0.0);
    }

    #[test]
    fn test_swell_crest_at_quarter_period() {
        let t = FRAC_PI_2 / 0.95;
        let e = elevation(Vec2::ZERO, t, &swell_only());
        assert!((e - 0.15).abs() < 1e-6, "expected crest 0.15, got {e}");
    }

    #[test]
    fn test_zero_iterations_is_big_wave_only() {
        let field = WaveField::new(GradientNoise);
        let params = swell_only();
        for i in 0..50 {
            let p = Vec2::new(i as f32 * 0.31 - 7.0, i as f32 * -0.17 + 3.0);
            let t = i as f32 * 0.4;
            assert_eq!(field.small_waves(p, t, &params), 0.0);
            assert_eq!(field.elevation(p, t, &params), field.big_wave(p, t, &params));
        }
    }

    #[test]
    fn test_big_elevation_scales_linearly() {
        let base = swell_only();
        let doubled = WaveParameters {
            big_elevation: base.big_elevation * 2.0,
            ..base
        };
        for i in 0..50 {
            let p = Vec2::new(i as f32 * 0.13, i as f32 * 0.07 - 2.0);
            let t = i as f32 * 0.21;
            let single = elevation(p, t, &base);
            let double = elevation(p, t, &doubled);
            assert_eq!(double, 2.0 * single);
        }
    }

    #[test]
    fn test_iterations_clamped_to_five() {
        let five = WaveParameters {
            small_iterations: 5,
            ..WaveParameters::default()
        };
        let many = WaveParameters {
            small_iterations: 500,
            ..WaveParameters::default()
        };
        let p = Vec2::new(1.3, -0.4);
        assert_eq!(elevation(p, 2.0, &five), elevation(p, 2.0, &many));
    }

    #[test]
    fn test_octaves_keep_constant_amplitude() {
        // Each octave contributes noise * small_elevation, never scaled down
        let field = WaveField::new(GradientNoise);
        let one = WaveParameters {
            small_iterations: 1,
            ..WaveParameters::default()
        };
        let two = WaveParameters {
            small_iterations: 2,
            ..one
        };
        let p = Vec2::new(0.37, 0.81);
        let t = 1.5;
        let second_octave = field.small_waves(p, t, &two) - field.small_waves(p, t, &one);

        let q = p * (one.small_frequency * 2.0) + Vec2::splat(t * one.small_speed);
        let expected = GradientNoise.sample(q) * one.small_elevation;
        assert!((second_octave - expected).abs() < 1e-6);
    }

    #[test]
    fn test_negative_speed_reverses_time() {
        let forward = swell_only();
        let backward = WaveParameters {
            big_speed: -forward.big_speed,
            ..forward
        };
        let p = Vec2::new(0.4, 0.9);
        assert_eq!(elevation(p, -3.0, &forward), elevation(p, 3.0, &backward));
    }

    #[test]
    fn test_accepts_perlin_source() {
        let field = WaveField::new(noise::Perlin::new(7));
        let params = WaveParameters::default();
        let e = field.elevation(Vec2::new(0.25, 0.5), 1.0, &params);
        assert!(e.is_finite());
        // Swell plus at most five unit-bounded octaves
        assert!(e.abs() <= params.big_elevation + 5.0 * params.small_elevation + 1e-3);
    }

    #[test]
    fn test_sample_matches_elevation() {
        let field = WaveField::new(GradientNoise);
        let params = WaveParameters::default();
        let point = SurfacePoint {
            position: Vec2::new(-3.2, 4.75),
            time_s: 12.5,
        };
        assert_eq!(
            field.sample(point, &params),
            field.elevation(point.position, point.time_s, &params)
        );
    }

    /// Upper bound on |∇e| over (x, z, t), gradient noise slope is below 3
    fn lipschitz_bound(params: &WaveParameters) -> f32 {
        const NOISE_SLOPE: f32 = 3.0;
        let [fx, fz] = params.big_frequency;
        let big = params.big_elevation * (fx.abs() + fz.abs() + params.big_speed.abs());
        let small: f32 = (1..=params.clamped_iterations())
            .map(|i| {
                let spatial = params.small_frequency.abs() * i as f32;
                params.small_elevation
                    * NOISE_SLOPE
                    * (spatial + 2.0 * params.small_speed.abs())
            })
            .sum();
        big + small
    }

    fn panel_params() -> impl Strategy<Value = WaveParameters> {
        (
            0.001f32..1.0,
            0.001f32..10.0,
            0.001f32..10.0,
            0.0f32..4.0,
            0.0f32..1.0,
            0.0f32..30.0,
            0.0f32..4.0,
            0u32..=5,
        )
            .prop_map(|(be, fx, fz, bs, se, sf, ss, n)| WaveParameters {
                big_elevation: be,
                big_frequency: [fx, fz],
                big_speed: bs,
                small_elevation: se,
                small_frequency: sf,
                small_speed: ss,
                small_iterations: n,
            })
    }

    proptest! {
        #[test]
        fn prop_deterministic(
            params in panel_params(),
            x in -10.0f32..10.0,
            z in -10.0f32..10.0,
            t in 0.0f32..600.0,
        ) {
            let p = Vec2::new(x, z);
            let a = elevation(p, t, &params);
            let b = elevation(p, t, &params);
            prop_assert_eq!(a.to_bits(), b.to_bits());
        }

        #[test]
        fn prop_continuous(
            params in panel_params(),
            x in -2.0f32..2.0,
            z in -2.0f32..2.0,
            t in 0.0f32..10.0,
            dx in -1e-3f32..1e-3,
            dz in -1e-3f32..1e-3,
            dt in -1e-3f32..1e-3,
        ) {
            let e0 = elevation(Vec2::new(x, z), t, &params);
            let e1 = elevation(Vec2::new(x + dx, z + dz), t + dt, &params);
            let step = dx.abs() + dz.abs() + dt.abs();
            // Slack covers f32 rounding of the octave sample points
            let allowed = lipschitz_bound(&params) * step + 2e-3;
            prop_assert!(
                (e1 - e0).abs() <= allowed,
                "jump {} exceeds {}", (e1 - e0).abs(), allowed
            );
        }
    }

    #[test]
    fn test_dense_grid_finite_differences() {
        let params = WaveParameters::default();
        let bound = lipschitz_bound(&params);
        let h = 0.01;
        for i in 0..200 {
            for j in 0..200 {
                let p = Vec2::new(i as f32 * h - 1.0, j as f32 * h - 1.0);
                let e = elevation(p, 3.0, &params);
                let ex = elevation(p + Vec2::new(h, 0.0), 3.0, &params);
                let ez = elevation(p + Vec2::new(0.0, h), 3.0, &params);
                assert!((ex - e).abs() <= bound * h + 1e-5);
                assert!((ez - e).abs() <= bound * h + 1e-5);
            }
        }
    }
}
