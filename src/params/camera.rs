//! Orbit camera configuration.

/// Orbit camera parameters
#[derive(Debug, Clone)]
pub struct OrbitConfig {
    /// Initial eye position (world units)
    pub position: [f32; 3],

    /// Point the camera orbits around and looks at
    pub target: [f32; 3],

    /// Whether mouse input moves the camera
    pub enabled: bool,

    /// Fraction of the pending motion applied per frame (1.0 = no damping)
    pub damping_factor: f32,

    /// Rotation gain (a drag across the full viewport height turns by 2π × this)
    pub rotate_speed: f32,

    /// Dolly gain per wheel line
    pub zoom_speed: f32,

    /// Closest allowed distance to the target
    pub min_distance: f32,

    /// Farthest allowed distance to the target
    pub max_distance: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            position: [5.0, 0.75, 5.0],
            target: [0.0, 0.0, 0.0],
            enabled: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 40.0,
        }
    }
}
