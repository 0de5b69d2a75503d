//! Rendering, post-processing and recording configuration.

use super::color::Rgb;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (logical pixels)
    pub window_width: u32,

    /// Initial window height (logical pixels)
    pub window_height: u32,

    /// Vertical field of view (degrees)
    pub fov_degrees: f32,

    /// Near clipping plane (world units)
    pub near_plane: f32,

    /// Far clipping plane (world units)
    /// Also the depth range the depth-of-field pass normalizes against.
    pub far_plane: f32,

    /// Background color behind the sea (linear)
    pub clear_color: Rgb,

    /// MSAA sample count for the water pass (1 disables antialiasing)
    pub msaa_samples: u32,

    /// Upper bound on device pixels per logical pixel
    pub max_pixel_ratio: f64,

    /// Apply ACES filmic tone mapping in the composite pass
    pub tone_mapping: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            fov_degrees: 75.0,
            near_plane: 0.1,
            far_plane: 100.0,
            // #010206
            clear_color: Rgb::new(0.000_304, 0.000_607, 0.001_821),
            msaa_samples: 1,
            max_pixel_ratio: 2.0,
            tone_mapping: true,
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height as f32
    }
}

/// Depth-of-field composite parameters
///
/// Distances are normalized to the camera depth range: 0 is the near plane, 1 the far plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthOfFieldConfig {
    /// Normalized depth that is perfectly sharp
    pub focus_distance: f32,

    /// Normalized distance from focus at which blur reaches its maximum
    pub focal_length: f32,

    /// Blur radius in pixels at maximum circle of confusion
    pub bokeh_scale: f32,
}

impl Default for DepthOfFieldConfig {
    fn default() -> Self {
        Self {
            focus_distance: 0.075,
            focal_length: 0.02,
            bokeh_scale: 5.0,
        }
    }
}

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Duration to record (seconds)
    pub duration_secs: f32,

    /// Output directory for frames
    pub output_dir: String,

    /// Frame rate (FPS), also the fixed time step of recorded frames
    pub fps: u32,
}

impl RecordingConfig {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            output_dir: "recording".to_string(),
            fps: 60,
        }
    }

    /// Total number of frames to capture
    pub fn total_frames(&self) -> usize {
        (self.duration_secs * self.fps as f32).ceil() as usize
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Path of one captured frame
    pub fn frame_path(&self, frame_num: usize) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), frame_num)
    }
}
