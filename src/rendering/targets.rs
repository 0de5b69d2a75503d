//! Offscreen render targets for the water pass.

/// Scene color (HDR)
pub const SCENE_COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Normalized linear depth written by the water shader, resolvable under MSAA
pub const SCENE_DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Hardware depth buffer for the water pass
pub const DEPTH_STENCIL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Textures the water pass draws into and the composite samples from
pub struct SceneTargets {
    /// Resolved scene color, sampled by the depth-of-field pass
    pub color: wgpu::TextureView,
    /// Resolved normalized depth, sampled by the depth-of-field pass
    pub depth: wgpu::TextureView,
    /// Multisampled attachments, present when MSAA is on
    msaa: Option<(wgpu::TextureView, wgpu::TextureView)>,
    pub depth_stencil: wgpu::TextureView,
    pub size: (u32, u32),
}

impl SceneTargets {
    pub fn new(device: &wgpu::Device, size: (u32, u32), sample_count: u32) -> Self {
        let create = |label: &str, format, samples, sampled: bool| {
            let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
            if sampled {
                usage |= wgpu::TextureUsages::TEXTURE_BINDING;
            }
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: wgpu::Extent3d {
                        width: size.0,
                        height: size.1,
                        depth_or_array_layers: 1,
                    },
                    mip_level_count: 1,
                    sample_count: samples,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let msaa = (sample_count > 1).then(|| {
            (
                create("Scene Color MSAA", SCENE_COLOR_FORMAT, sample_count, false),
                create("Scene Depth MSAA", SCENE_DEPTH_FORMAT, sample_count, false),
            )
        });

        Self {
            color: create("Scene Color", SCENE_COLOR_FORMAT, 1, true),
            depth: create("Scene Depth", SCENE_DEPTH_FORMAT, 1, true),
            msaa,
            depth_stencil: create("Depth Buffer", DEPTH_STENCIL_FORMAT, sample_count, false),
            size,
        }
    }

    /// (render target, resolve target) for the color attachment
    pub fn color_attachment(&self) -> (&wgpu::TextureView, Option<&wgpu::TextureView>) {
        match &self.msaa {
            Some((color, _)) => (color, Some(&self.color)),
            None => (&self.color, None),
        }
    }

    /// (render target, resolve target) for the linear depth attachment
    pub fn depth_attachment(&self) -> (&wgpu::TextureView, Option<&wgpu::TextureView>) {
        match &self.msaa {
            Some((_, depth)) => (depth, Some(&self.depth)),
            None => (&self.depth, None),
        }
    }
}
