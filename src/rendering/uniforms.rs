//! GPU uniform blocks. Layouts mirror the structs in `shaders/*.wgsl` byte for byte.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::frame::FrameSnapshot;
use crate::params::{DepthOfFieldConfig, RenderConfig};

/// Uniform buffer for the water shader (`WaterUniforms` in water.wgsl, 144 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WaterUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub big_frequency: [f32; 2],
    pub big_elevation: f32,
    pub big_speed: f32,
    pub small_elevation: f32,
    pub small_frequency: f32,
    pub small_speed: f32,
    pub small_iterations: u32,
    pub depth_color: [f32; 3],
    pub color_offset: f32,
    pub surface_color: [f32; 3],
    pub color_multiplier: f32,
    pub time: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub _padding: f32,
}

impl WaterUniforms {
    /// Pack one frame's snapshot and camera
    pub fn new(snapshot: &FrameSnapshot, view_proj: Mat4, render_config: &RenderConfig) -> Self {
        let wave = &snapshot.wave;
        let color = &snapshot.color;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            big_frequency: wave.big_frequency,
            big_elevation: wave.big_elevation,
            big_speed: wave.big_speed,
            small_elevation: wave.small_elevation,
            small_frequency: wave.small_frequency,
            small_speed: wave.small_speed,
            small_iterations: wave.clamped_iterations(),
            depth_color: color.depth_color.to_array(),
            color_offset: color.color_offset,
            surface_color: color.surface_color.to_array(),
            color_multiplier: color.color_multiplier,
            time: snapshot.time_s,
            near_plane: render_config.near_plane,
            far_plane: render_config.far_plane,
            _padding: 0.0,
        }
    }
}

/// Uniform buffer for the depth-of-field composite (`DofUniforms` in dof.wgsl, 32 bytes)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DofUniforms {
    pub focus_distance: f32,
    pub focal_length: f32,
    pub bokeh_scale: f32,
    /// 1 = apply ACES filmic tone mapping
    pub tone_mapping: u32,
    /// Size of one scene texel in UV units
    pub texel_size: [f32; 2],
    pub _padding: [f32; 2],
}

impl DofUniforms {
    pub fn new(dof: &DepthOfFieldConfig, tone_mapping: bool, scene_size: (u32, u32)) -> Self {
        Self {
            focus_distance: dof.focus_distance,
            focal_length: dof.focal_length,
            bokeh_scale: dof.bokeh_scale,
            tone_mapping: tone_mapping as u32,
            texel_size: [
                1.0 / scene_size.0.max(1) as f32,
                1.0 / scene_size.1.max(1) as f32,
            ],
            _padding: [0.0; 2],
        }
    }
}
