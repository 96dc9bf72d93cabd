//! Platform layer: windowing, event loop and the demo scene.
//!
//! Assets are loaded before the window opens so a bad model path fails fast.
//! The GPU state is created on the first `resumed`, as winit requires.

pub mod scene;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use asset::{MeshData, obj, texture::TextureData};
use corelib::Camera;
use renderer::GpuState;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::scene::DemoScene;

/// Everything the app collects from the command line.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub backends: wgpu::Backends,
    pub show_fps: bool,
    pub width: u32,
    pub height: u32,
    /// OBJ file drawn between the two solids.
    pub model: Option<PathBuf>,
    /// Image applied to the model.
    pub texture: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            show_fps: false,
            width: 1280,
            height: 720,
            model: None,
            texture: None,
        }
    }
}

/// Open the window and run the demo until it is closed.
pub fn run(config: RunConfig) -> Result<()> {
    let model = config
        .model
        .as_deref()
        .map(obj::load_obj_from_path)
        .transpose()?;
    let texture = match (&config.texture, &model) {
        (Some(path), Some(_)) => Some(TextureData::load(path)?),
        (Some(path), None) => {
            log::warn!("Ignoring texture {}: no model given", path.display());
            None
        }
        (None, Some(_)) => Some(TextureData::checkerboard(64)),
        (None, None) => None,
    };

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    // Animation is driven by redraws.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        model,
        texture,
        window: None,
        gpu: None,
        scene: None,
        fps: FpsCounter::new(),
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .map_err(|e| anyhow::anyhow!("Event loop error: {e:?}"))?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct App {
    config: RunConfig,
    model: Option<MeshData>,
    texture: Option<TextureData>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    scene: Option<DemoScene>,
    fps: FpsCounter,
    /// First fatal error; the loop exits and `run` returns it.
    error: Option<anyhow::Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Obsidian3D")
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("Failed to create window")?,
        );
        log::info!(
            "Window created: {}x{}",
            window.inner_size().width,
            window.inner_size().height
        );

        let mut gpu = pollster::block_on(GpuState::new(
            window.clone(),
            self.config.backends,
            Camera::default(),
        ))?;
        let scene = DemoScene::new(&mut gpu, self.model.as_ref(), self.texture.as_ref())?;

        window.request_redraw();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.scene = Some(scene);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(gpu), Some(scene)) = (self.gpu.as_mut(), self.scene.as_mut()) else {
            return;
        };
        let commands = scene.advance();
        match gpu.render(&commands) {
            Ok(()) => {}
            Err(e) if GpuState::is_surface_lost(&e) => {
                log::warn!("Surface lost ({e:?}), reconfiguring");
                gpu.recreate_surface();
            }
            Err(wgpu::SurfaceError::Timeout) => log::warn!("Frame timed out"),
            Err(e) => {
                self.fail(event_loop, anyhow::anyhow!("Render failed: {e:?}"));
                return;
            }
        }

        if self.config.show_fps {
            if let Some(fps) = self.fps.tick() {
                log::info!("FPS: {:.1}", fps);
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting event loop.");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                log::debug!("Resized: {}x{}", new_size.width, new_size.height);
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::info!("Scale factor changed: {:.3}", scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Frames per second, reported about once a second.
struct FpsCounter {
    frames: u32,
    since: Instant,
}

impl FpsCounter {
    const PERIOD: Duration = Duration::from_secs(1);

    fn new() -> Self {
        Self {
            frames: 0,
            since: Instant::now(),
        }
    }

    fn tick(&mut self) -> Option<f64> {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed < Self::PERIOD {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.since = Instant::now();
        Some(fps)
    }
}
