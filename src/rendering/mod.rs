//! Rendering system with wgpu pipelines for the water pass and the depth-of-field composite.

mod postprocess;
mod targets;
mod uniforms;

use std::path::Path;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::error::RenderError;
use crate::ocean::{OceanGrid, Vertex};
use crate::params::{DepthOfFieldConfig, RenderConfig};

pub use postprocess::{
    aces_filmic, bokeh_taps, normalized_depth, smoothstep, Viewport, BOKEH_TAPS, GOLDEN_ANGLE,
};
pub use targets::{SceneTargets, DEPTH_STENCIL_FORMAT, SCENE_COLOR_FORMAT, SCENE_DEPTH_FORMAT};
pub use uniforms::{DofUniforms, WaterUniforms};

pub const WATER_SHADER: &str = include_str!("../shaders/water.wgsl");
pub const DOF_SHADER: &str = include_str!("../shaders/dof.wgsl");

/// Rendering system managing wgpu device, pipelines, and buffers
pub struct RenderSystem {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    water_pipeline: wgpu::RenderPipeline,
    dof_pipeline: wgpu::RenderPipeline,

    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,

    water_uniform_buffer: wgpu::Buffer,
    water_bind_group: wgpu::BindGroup,

    dof_uniform_buffer: wgpu::Buffer,
    dof_bind_group_layout: wgpu::BindGroupLayout,
    dof_bind_group: wgpu::BindGroup,
    scene_sampler: wgpu::Sampler,

    targets: SceneTargets,
    viewport: Viewport,
    sample_count: u32,
    clear_color: wgpu::Color,
    depth_of_field: DepthOfFieldConfig,
    tone_mapping: bool,
    max_pixel_ratio: f64,
    can_capture: bool,
}

impl RenderSystem {
    /// Create new rendering system
    ///
    /// `capture` adds COPY_SRC to the swapchain so presented frames can be read back
    /// (recording and screenshots).
    pub async fn new(
        window: Arc<Window>,
        grid: &OceanGrid,
        render_config: &RenderConfig,
        depth_of_field: DepthOfFieldConfig,
        capture: bool,
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let viewport = Viewport::new(
            (size.width, size.height),
            window.scale_factor(),
            render_config.max_pixel_ratio,
        );

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Create surface (window must have 'static lifetime via Arc)
        let surface = instance
            .create_surface(window)
            .map_err(RenderError::surface)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::Adapter)?;

        let info = adapter.get_info();
        log::info!("Adapter: {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(RenderError::device)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| RenderError::surface("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let mut usage = wgpu::TextureUsages::RENDER_ATTACHMENT;
        let can_capture = capture && surface_caps.usages.contains(wgpu::TextureUsages::COPY_SRC);
        if can_capture {
            usage |= wgpu::TextureUsages::COPY_SRC;
        } else if capture {
            log::warn!("Surface cannot be copied from, frame capture disabled");
        }

        let config = wgpu::SurfaceConfiguration {
            usage,
            format: surface_format,
            width: viewport.surface.0,
            height: viewport.surface.1,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "Surface {:?} {}x{}, scene {}x{}",
            surface_format,
            viewport.surface.0,
            viewport.surface.1,
            viewport.render.0,
            viewport.render.1
        );

        let sample_count = supported_sample_count(&adapter, render_config.msaa_samples);

        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Water Shader"),
            source: wgpu::ShaderSource::Wgsl(WATER_SHADER.into()),
        });

        let dof_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Depth of Field Shader"),
            source: wgpu::ShaderSource::Wgsl(DOF_SHADER.into()),
        });

        // The grid stays flat on the GPU; the vertex stage displaces it
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&grid.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&grid.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let water_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Water Uniform Buffer"),
            size: std::mem::size_of::<WaterUniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let water_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Water Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let water_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Bind Group"),
            layout: &water_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: water_uniform_buffer.as_entire_binding(),
            }],
        });

        let water_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Water Pipeline Layout"),
                bind_group_layouts: &[&water_bind_group_layout],
                push_constant_ranges: &[],
            });

        let water_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Water Render Pipeline"),
            layout: Some(&water_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &water_shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3,
                    }],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &water_shader,
                entry_point: Some("fs_main"),
                targets: &[
                    Some(wgpu::ColorTargetState {
                        format: SCENE_COLOR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                    Some(wgpu::ColorTargetState {
                        format: SCENE_DEPTH_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                ],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_STENCIL_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let dof_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Depth of Field Uniform Buffer"),
            contents: bytemuck::cast_slice(&[DofUniforms::new(
                &depth_of_field,
                render_config.tone_mapping,
                viewport.render,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Scene Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let scene_texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let dof_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Depth of Field Bind Group Layout"),
                entries: &[
                    scene_texture_entry(0),
                    scene_texture_entry(1),
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
            });

        let dof_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Depth of Field Pipeline Layout"),
            bind_group_layouts: &[&dof_bind_group_layout],
            push_constant_ranges: &[],
        });

        let dof_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Depth of Field Pipeline"),
            layout: Some(&dof_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &dof_shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &dof_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let targets = SceneTargets::new(&device, viewport.render, sample_count);
        let dof_bind_group = create_dof_bind_group(
            &device,
            &dof_bind_group_layout,
            &targets,
            &scene_sampler,
            &dof_uniform_buffer,
        );

        let clear = render_config.clear_color;
        Ok(Self {
            surface,
            device,
            queue,
            config,
            water_pipeline,
            dof_pipeline,
            vertex_buffer,
            index_buffer,
            index_count: grid.indices.len() as u32,
            water_uniform_buffer,
            water_bind_group,
            dof_uniform_buffer,
            dof_bind_group_layout,
            dof_bind_group,
            scene_sampler,
            targets,
            viewport,
            sample_count,
            clear_color: wgpu::Color {
                r: clear.r as f64,
                g: clear.g as f64,
                b: clear.b as f64,
                a: 1.0,
            },
            depth_of_field,
            tone_mapping: render_config.tone_mapping,
            max_pixel_ratio: render_config.max_pixel_ratio,
            can_capture,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn can_capture(&self) -> bool {
        self.can_capture
    }

    /// Resize the swapchain and offscreen targets; the mesh is untouched
    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) {
        if size.width == 0 || size.height == 0 {
            return;
        }

        let viewport = Viewport::new((size.width, size.height), scale_factor, self.max_pixel_ratio);
        log::debug!(
            "Resize to {}x{} (scene {}x{})",
            viewport.surface.0,
            viewport.surface.1,
            viewport.render.0,
            viewport.render.1
        );

        self.config.width = viewport.surface.0;
        self.config.height = viewport.surface.1;
        self.surface.configure(&self.device, &self.config);

        if viewport.render != self.targets.size {
            self.targets = SceneTargets::new(&self.device, viewport.render, self.sample_count);
            self.dof_bind_group = create_dof_bind_group(
                &self.device,
                &self.dof_bind_group_layout,
                &self.targets,
                &self.scene_sampler,
                &self.dof_uniform_buffer,
            );
            let dof = DofUniforms::new(&self.depth_of_field, self.tone_mapping, viewport.render);
            self.queue
                .write_buffer(&self.dof_uniform_buffer, 0, bytemuck::cast_slice(&[dof]));
        }

        self.viewport = viewport;
    }

    /// Reconfigure after the surface was lost or outdated
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload one frame's parameters in a single write
    pub fn update_water_uniforms(&self, uniforms: &WaterUniforms) {
        self.queue.write_buffer(
            &self.water_uniform_buffer,
            0,
            bytemuck::cast_slice(&[*uniforms]),
        );
    }

    /// Render a frame, saving it to `capture` as PNG when given
    ///
    /// The frame is presented even when the capture fails; the capture error is
    /// returned afterwards so the caller can decide whether the run is still valid.
    pub fn render(&self, capture: Option<&Path>) -> Result<(), RenderError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let (color_view, color_resolve) = self.targets.color_attachment();
            let (depth_view, depth_resolve) = self.targets.depth_attachment();

            let mut water_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Water Pass"),
                color_attachments: &[
                    Some(wgpu::RenderPassColorAttachment {
                        view: color_view,
                        resolve_target: color_resolve,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.clear_color),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                    // Background counts as far plane
                    Some(wgpu::RenderPassColorAttachment {
                        view: depth_view,
                        resolve_target: depth_resolve,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 1.0,
                                g: 0.0,
                                b: 0.0,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    }),
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_stencil,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            water_pass.set_pipeline(&self.water_pipeline);
            water_pass.set_bind_group(0, &self.water_bind_group, &[]);
            water_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            water_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            water_pass.draw_indexed(0..self.index_count, 0, 0..1);
        }

        {
            let mut dof_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Depth of Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            dof_pass.set_pipeline(&self.dof_pipeline);
            dof_pass.set_bind_group(0, &self.dof_bind_group, &[]);
            dof_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        let saved = match capture {
            Some(path) => self.capture_frame(path, &output),
            None => Ok(()),
        };

        output.present();

        saved
    }

    /// Read back the presented frame and save it as PNG
    fn capture_frame(&self, path: &Path, texture: &wgpu::SurfaceTexture) -> Result<(), RenderError> {
        if !self.can_capture {
            return Err(RenderError::capture("surface was not created with COPY_SRC"));
        }
        create_parent_dir(path)?;

        let (width, height) = self.viewport.surface;
        let bytes_per_pixel = 4; // RGBA8 / BGRA8
        let unpadded_bytes_per_row = width * bytes_per_pixel;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Capture Buffer"),
            size: (padded_bytes_per_row * height) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Capture Encoder"),
            });

        encoder.copy_texture_to_buffer(
            wgpu::ImageCopyTexture {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::ImageCopyBuffer {
                buffer: &buffer,
                layout: wgpu::ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = buffer.slice(..);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(RenderError::capture)?
            .map_err(RenderError::capture)?;

        let data = buffer_slice.get_mapped_range();
        let bgra = matches!(
            self.config.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        );
        let image_data = unpad_rows(
            &data,
            padded_bytes_per_row as usize,
            unpadded_bytes_per_row as usize,
            height as usize,
            bgra,
        );

        drop(data);
        buffer.unmap();

        image::save_buffer(path, &image_data, width, height, image::ColorType::Rgba8)?;
        Ok(())
    }
}

fn create_parent_dir(path: &Path) -> Result<(), RenderError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => Ok(std::fs::create_dir_all(dir)?),
        _ => Ok(()),
    }
}

fn create_dof_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    targets: &SceneTargets,
    sampler: &wgpu::Sampler,
    uniforms: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Depth of Field Bind Group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&targets.color),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&targets.depth),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: uniforms.as_entire_binding(),
            },
        ],
    })
}

/// Highest sample count up to `requested` that every scene attachment supports
fn supported_sample_count(adapter: &wgpu::Adapter, requested: u32) -> u32 {
    if requested <= 1 {
        return 1;
    }

    let supported = |count| {
        [SCENE_COLOR_FORMAT, SCENE_DEPTH_FORMAT, DEPTH_STENCIL_FORMAT]
            .iter()
            .all(|format| {
                adapter
                    .get_texture_format_features(*format)
                    .flags
                    .sample_count_supported(count)
            })
    };

    let count = [16, 8, 4, 2]
        .into_iter()
        .filter(|c| *c <= requested)
        .find(|c| supported(*c))
        .unwrap_or(1);
    if count != requested {
        log::warn!("MSAA {}x not supported, using {}x", requested, count);
    }
    count
}

/// Strip row padding from a readback and reorder BGRA to RGBA when needed
fn unpad_rows(data: &[u8], padded: usize, unpadded: usize, height: usize, bgra: bool) -> Vec<u8> {
    let mut image_data = Vec::with_capacity(unpadded * height);
    for row in data.chunks(padded).take(height) {
        image_data.extend_from_slice(&row[..unpadded]);
    }
    if bgra {
        for pixel in image_data.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
    }
    image_data
}
