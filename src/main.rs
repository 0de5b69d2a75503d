//! Raging Sea - an animated procedural ocean
//!
//! A swell and a few octaves of noise move a dense grid every frame; crests and troughs
//! take their color from the elevation, and a depth-of-field pass softens the distance.

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::{Window, WindowId},
};

use cli::Args;
use raging_sea::camera::OrbitCamera;
use raging_sea::error::RenderError;
use raging_sea::frame::{FpsTracker, FrameClock};
use raging_sea::ocean::OceanGrid;
use raging_sea::panel::ParameterPanel;
use raging_sea::params::{OceanMesh, PresetSettings, RecordingConfig};
use raging_sea::preview::save_preview;
use raging_sea::rendering::{RenderSystem, WaterUniforms};

/// Wheel pixels that count as one line on touchpads
const PIXELS_PER_LINE: f32 = 40.0;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Scene
    settings: PresetSettings,
    mesh: OceanMesh,
    panel: ParameterPanel,
    camera: OrbitCamera,

    // Time tracking
    clock: FrameClock,
    fps: FpsTracker,

    // Recording and screenshots
    recording: Option<RecordingConfig>,
    frame_num: usize,
    screenshot_pending: bool,
    screenshots_taken: usize,

    // Input
    modifiers: ModifiersState,
    dragging: bool,
    cursor: Option<PhysicalPosition<f64>>,

    error: Option<anyhow::Error>,
}

impl App {
    fn new(
        settings: PresetSettings,
        panel: ParameterPanel,
        recording: Option<RecordingConfig>,
    ) -> Self {
        let clock = match &recording {
            Some(config) => FrameClock::fixed(config.fps),
            None => FrameClock::wall_clock(),
        };

        Self {
            window: None,
            render_system: None,
            camera: OrbitCamera::new(settings.orbit.clone()),
            settings,
            mesh: OceanMesh::default(),
            panel,
            clock,
            fps: FpsTracker::new(),
            recording,
            frame_num: 0,
            screenshot_pending: false,
            screenshots_taken: 0,
            modifiers: ModifiersState::empty(),
            dragging: false,
            cursor: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let render_config = &self.settings.render;
        let window_attributes = Window::default_attributes()
            .with_title("Raging Sea")
            .with_inner_size(winit::dpi::LogicalSize::new(
                render_config.window_width,
                render_config.window_height,
            ));

        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let grid = OceanGrid::new(&self.mesh);
        log::info!(
            "Ocean grid: {} vertices, {} triangles",
            grid.vertices.len(),
            grid.indices.len() / 3
        );

        let capture = self.recording.is_some() || self.settings.preserve_buffer;
        let render_system = pollster::block_on(RenderSystem::new(
            Arc::clone(&window),
            &grid,
            render_config,
            self.settings.depth_of_field,
            capture,
        ))
        .context("Failed to initialize renderer")?;

        if self.recording.is_some() && !render_system.can_capture() {
            anyhow::bail!("Recording needs a surface that supports frame readback (COPY_SRC)");
        }

        window.set_title(&self.title());
        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }

    fn title(&self) -> String {
        format!("Raging Sea - {}", self.panel.status_line())
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&self.title());
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        println!("\nRaging Sea is running!");
        println!("Tab/Shift+Tab select, Up/Down adjust (Shift = fine), Backspace resets");
        println!("R resets all, P prints the panel, S saves a screenshot, ESC quits\n");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                let scale_factor = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size, scale_factor);
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed && self.camera.enabled();
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last), Some(render_system)) =
                    (self.dragging, self.cursor, &self.render_system)
                {
                    let height = render_system.viewport().surface.1 as f32;
                    self.camera.rotate(
                        (position.x - last.x) as f32,
                        (position.y - last.y) as f32,
                        height,
                    );
                }
                self.cursor = Some(position);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.camera.dolly(lines);
            }
            WindowEvent::RedrawRequested => self.render_frame(event_loop),
            _ => {}
        }
    }
}

impl App {
    /// Panel, screenshot and quit keys
    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let shift = self.modifiers.shift_key();

        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            PhysicalKey::Code(KeyCode::Tab) if shift => self.panel.select_previous(),
            PhysicalKey::Code(KeyCode::Tab) => self.panel.select_next(),
            PhysicalKey::Code(KeyCode::ArrowUp) => self.panel.nudge(1, shift),
            PhysicalKey::Code(KeyCode::ArrowDown) => self.panel.nudge(-1, shift),
            PhysicalKey::Code(KeyCode::Backspace) => {
                if !self.panel.backspace_text() {
                    self.panel.reset_selected();
                }
            }
            PhysicalKey::Code(KeyCode::Enter) => self.panel.commit_text(),
            PhysicalKey::Code(KeyCode::KeyR) => self.panel.reset_all(),
            PhysicalKey::Code(KeyCode::KeyP) => println!("{}", self.panel.describe()),
            PhysicalKey::Code(KeyCode::KeyS) => self.request_screenshot(),
            _ => {
                if let Some(text) = &event.text {
                    self.panel.type_text(text);
                }
            }
        }

        self.refresh_title();
    }

    fn request_screenshot(&mut self) {
        match &self.render_system {
            Some(render_system) if render_system.can_capture() => self.screenshot_pending = true,
            _ => log::warn!("Screenshots need a preserved frame buffer (--preset still)"),
        }
    }

    /// Render a single frame
    fn render_frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(render_system) = &self.render_system else {
            return;
        };

        let time_s = self.clock.now();
        let snapshot = self.panel.snapshot(time_s);

        self.camera.update();
        let viewport = render_system.viewport();
        let view_proj = self
            .camera
            .view_proj(&self.settings.render, viewport.aspect_ratio());

        render_system.update_water_uniforms(&WaterUniforms::new(
            &snapshot,
            view_proj,
            &self.settings.render,
        ));

        let capture = self.capture_path();
        match render_system.render(capture.as_deref()) {
            Ok(()) => {}
            Err(RenderError::Frame(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                render_system.reconfigure();
                return;
            }
            Err(RenderError::Frame(wgpu::SurfaceError::OutOfMemory)) => {
                self.fail(event_loop, anyhow::anyhow!("GPU out of memory"));
                return;
            }
            Err(RenderError::Frame(e)) => {
                log::warn!("Skipped frame: {:?}", e);
                return;
            }
            Err(e) => {
                // The frame was presented but not saved
                self.clock.advance();
                self.fps.record_frame();
                self.capture_failed(capture, e, event_loop);
                return;
            }
        }

        self.clock.advance();
        self.fps.record_frame();
        self.finish_capture(capture, event_loop);
    }

    /// Where this frame goes on disk, if anywhere
    fn capture_path(&self) -> Option<PathBuf> {
        if let Some(config) = &self.recording {
            return Some(PathBuf::from(config.frame_path(self.frame_num)));
        }
        self.screenshot_pending
            .then(|| PathBuf::from(format!("raging-sea-{:03}.png", self.screenshots_taken)))
    }

    fn capture_failed(
        &mut self,
        capture: Option<PathBuf>,
        error: RenderError,
        event_loop: &ActiveEventLoop,
    ) {
        let path = capture.unwrap_or_default();
        if self.recording.is_some() {
            let error = anyhow::Error::new(error)
                .context(format!("Failed to record frame {}", path.display()));
            self.fail(event_loop, error);
        } else {
            self.screenshot_pending = false;
            log::warn!("Screenshot {} not saved: {}", path.display(), error);
        }
    }

    fn finish_capture(&mut self, capture: Option<PathBuf>, event_loop: &ActiveEventLoop) {
        let Some(path) = capture else {
            return;
        };

        if let Some(config) = &self.recording {
            self.frame_num += 1;
            let total = config.total_frames();
            if self.frame_num % config.fps.max(1) as usize == 0 {
                log::info!("Recorded {}/{} frames", self.frame_num, total);
            }
            if self.frame_num >= total {
                println!("Recording complete: {} frames in {}", total, config.frames_dir());
                event_loop.exit();
            }
        } else {
            self.screenshot_pending = false;
            self.screenshots_taken += 1;
            log::info!("Saved screenshot {}", path.display());
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.preset.settings();
    log::info!("Preset: {:?}", args.preset);

    let mut panel = ParameterPanel::new(settings.wave, settings.color);
    args.apply_overrides(&mut panel);

    if let Some(path) = &args.preview {
        let snapshot = panel.snapshot(args.time);
        save_preview(path, args.noise, &snapshot, &args.preview_config())
            .with_context(|| format!("Failed to write preview {}", path.display()))?;
        println!("Preview written to {}", path.display());
        return Ok(());
    }

    let recording = args
        .create_recording_config()
        .context("Failed to create recording directories")?;
    if let Some(config) = &recording {
        println!(
            "Recording {:.1}s at {} fps to {}",
            config.duration_secs,
            config.fps,
            config.frames_dir()
        );
    }

    println!("Raging Sea - procedural ocean");
    println!("Initializing systems...\n");

    let mut app = App::new(settings, panel, recording);
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
