//! Wave field parameters and ocean mesh layout.

/// Upper bound for `small_iterations` (panel range is 0..=5)
pub const MAX_SMALL_ITERATIONS: u32 = 5;

/// Parameters of the analytic wave field
///
/// Copied by value into every frame snapshot; never mutated while a frame is evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParameters {
    /// Amplitude of the dominant swell (world units)
    pub big_elevation: f32,

    /// Spatial frequency of the swell along x and z (radians per world unit)
    /// Direction and wavelength are tuned per axis.
    pub big_frequency: [f32; 2],

    /// Swell phase speed (radians per second)
    pub big_speed: f32,

    /// Amplitude of every small-wave octave (held constant across octaves)
    pub small_elevation: f32,

    /// Base spatial frequency of the first small-wave octave
    pub small_frequency: f32,

    /// Drift speed of the small-wave noise
    pub small_speed: f32,

    /// Number of noise octaves, 0 disables the small-wave term
    pub small_iterations: u32,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            big_elevation: 0.15,
            big_frequency: [3.5, 2.0],
            big_speed: 0.95,

            small_elevation: 0.05,
            small_frequency: 5.0,
            small_speed: 0.2,
            small_iterations: 4,
        }
    }
}

impl WaveParameters {
    /// Iteration count actually evaluated by the kernels
    pub fn clamped_iterations(&self) -> u32 {
        self.small_iterations.min(MAX_SMALL_ITERATIONS)
    }

    /// Upper bound on |elevation|, taking noise as bounded by 1
    pub fn peak_elevation(&self) -> f32 {
        self.big_elevation.abs() + self.small_elevation.abs() * self.clamped_iterations() as f32
    }
}

/// Flat tessellated plane that carries the displaced surface
#[derive(Debug, Clone)]
pub struct OceanMesh {
    /// Side length of the plane (world units)
    pub size: f32,

    /// Subdivisions per side ((subdivisions + 1)^2 vertices)
    pub subdivisions: usize,
}

impl Default for OceanMesh {
    fn default() -> Self {
        Self {
            size: 20.0,
            subdivisions: 1024,
        }
    }
}

impl OceanMesh {
    /// Distance between neighbouring vertices
    pub fn spacing(&self) -> f32 {
        self.size / self.subdivisions as f32
    }
}
