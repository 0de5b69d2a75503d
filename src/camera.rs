//! Orbit camera with damped rotation and dolly.

use glam::{Mat4, Vec3};

use crate::params::{OrbitConfig, RenderConfig};

/// Keeps the polar angle off the poles so `look_at` never degenerates
const POLAR_EPSILON: f32 = 1e-4;

/// Dolly factor per wheel line at zoom speed 1
const DOLLY_BASE: f32 = 0.95;

/// Camera orbiting a fixed target on a sphere
pub struct OrbitCamera {
    config: OrbitConfig,
    target: Vec3,

    /// Azimuth around +y, measured from +z toward +x
    theta: f32,
    /// Polar angle from +y
    phi: f32,
    radius: f32,

    pending_theta: f32,
    pending_phi: f32,
    pending_scale: f32,
}

impl OrbitCamera {
    pub fn new(config: OrbitConfig) -> Self {
        let target = Vec3::from_array(config.target);
        let offset = Vec3::from_array(config.position) - target;
        let radius = offset.length().max(f32::EPSILON);

        Self {
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
            target,
            config,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Queue a rotation from a pointer drag of (dx, dy) pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if !self.config.enabled || viewport_height <= 0.0 {
            return;
        }
        let gain = std::f32::consts::TAU * self.config.rotate_speed / viewport_height;
        self.pending_theta -= dx * gain;
        self.pending_phi -= dy * gain;
    }

    /// Queue a dolly; positive lines move toward the target
    pub fn dolly(&mut self, lines: f32) {
        if !self.config.enabled {
            return;
        }
        self.pending_scale *= DOLLY_BASE.powf(self.config.zoom_speed * lines);
    }

    /// Apply queued motion; call once per frame
    pub fn update(&mut self) {
        let damping = self.config.damping_factor.clamp(0.0, 1.0);

        self.theta += self.pending_theta * damping;
        self.phi = (self.phi + self.pending_phi * damping)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);
        self.radius = (self.radius * self.pending_scale)
            .clamp(self.config.min_distance, self.config.max_distance);

        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        self.pending_scale = 1.0;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        self.target
            + Vec3::new(
                self.radius * sin_phi * sin_theta,
                self.radius * cos_phi,
                self.radius * sin_phi * cos_theta,
            )
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    /// View-projection matrix for the given output aspect ratio
    pub fn view_proj(&self, render_config: &RenderConfig, aspect: f32) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let proj = Mat4::perspective_rh(
            render_config.fov_degrees.to_radians(),
            aspect,
            render_config.near_plane,
            render_config.far_plane,
        );
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_eye_matches_config() {
        let config = OrbitConfig::default();
        let camera = OrbitCamera::new(config.clone());
        let eye = camera.eye();
        let expected = Vec3::from_array(config.position);
        assert!(eye.distance(expected) < 1e-4, "eye {eye} != {expected}");
    }

    #[test]
    fn test_damping_converges_to_full_rotation() {
        let mut camera = OrbitCamera::new(OrbitConfig::default());
        let start = camera.theta;
        camera.rotate(100.0, 0.0, 1000.0);

        camera.update();
        let first_step = (camera.theta - start).abs();

        for _ in 0..500 {
            camera.update();
        }
        let total = (camera.theta - start).abs();
        let expected = std::f32::consts::TAU * 0.1;

        // Damped: the first frame moves only a fraction of the drag
        assert!(first_step < total * 0.1);
        assert!((total - expected).abs() < 1e-3);
    }

    #[test]
    fn test_polar_angle_clamped() {
        let mut camera = OrbitCamera::new(OrbitConfig {
            damping_factor: 1.0,
            ..OrbitConfig::default()
        });
        camera.rotate(0.0, 1e6, 100.0);
        camera.update();
        assert!(camera.polar_angle() >= POLAR_EPSILON);
        camera.rotate(0.0, -1e6, 100.0);
        camera.update();
        assert!(camera.polar_angle() <= std::f32::consts::PI - POLAR_EPSILON);
        assert!(camera.eye().is_finite());
    }

    #[test]
    fn test_dolly_respects_limits() {
        let config = OrbitConfig::default();
        let mut camera = OrbitCamera::new(config.clone());
        camera.dolly(1000.0);
        camera.update();
        assert_eq!(camera.distance(), config.min_distance);
        camera.dolly(-1000.0);
        camera.update();
        assert_eq!(camera.distance(), config.max_distance);
    }

    #[test]
    fn test_disabled_ignores_input() {
        let mut camera = OrbitCamera::new(OrbitConfig {
            enabled: false,
            ..OrbitConfig::default()
        });
        let eye = camera.eye();
        camera.rotate(300.0, 200.0, 720.0);
        camera.dolly(5.0);
        for _ in 0..10 {
            camera.update();
        }
        assert_eq!(camera.eye(), eye);
    }

    #[test]
    fn test_enabled_follows_preset() {
        use crate::params::Preset;
        assert!(OrbitCamera::new(Preset::Interactive.settings().orbit).enabled());
        assert!(!OrbitCamera::new(Preset::Still.settings().orbit).enabled());
    }

    #[test]
    fn test_view_proj_matrix_generation() {
        let camera = OrbitCamera::new(OrbitConfig::default());
        let render_config = RenderConfig::default();
        let view_proj = camera.view_proj(&render_config, render_config.aspect_ratio());

        assert_ne!(view_proj, Mat4::IDENTITY);
        assert!(view_proj.is_finite());

        // The orbit target projects to the centre of the screen
        let clip = view_proj * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
