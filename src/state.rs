use std::path::Path;
use std::sync::Arc;

use cgmath::Vector2;
use web_time::Instant;
use wgpu::{
    Backends, DeviceDescriptor, ExperimentalFeatures, Instance, InstanceDescriptor, Limits,
    PowerPreference, RequestAdapterOptions, SurfaceConfiguration, TextureUsages, Trace,
};
use winit::{event_loop::ActiveEventLoop, keyboard::KeyCode, window::Window};

use crate::{
    config::RendererConfig,
    demo::DemoScene,
    graphics::{
        gpu::GpuContext,
        render::renderer::{RenderError, Renderer},
    },
};

/// Everything the demo window needs between events.
pub struct State<'a> {
    pub window: Arc<Window>,
    renderer: Renderer<'a>,
    demo: DemoScene,
    started: Instant,
}

impl<'a> State<'a> {
    pub async fn new(
        window: Arc<Window>,
        config: RendererConfig,
        image: Option<&Path>,
    ) -> anyhow::Result<State<'a>> {
        let size = window.inner_size();

        let instance = Instance::new(&InstanceDescriptor {
            backends: Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (required_features, required_limits) =
            GpuContext::sprite_requirements(&adapter, Limits::default());
        let (device, queue) = adapter
            .request_device(&DeviceDescriptor {
                label: Some("sprite_device"),
                required_features,
                experimental_features: ExperimentalFeatures::disabled(),
                required_limits,
                memory_hints: Default::default(),
                trace: Trace::Off,
            })
            .await?;
        let gpu = GpuContext::new(device, queue);

        let surface_caps = surface.get_capabilities(&adapter);
        // sprite colors are blended as stored, so prefer a non-srgb target
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);
        let surface_config = SurfaceConfiguration {
            usage: TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let mut renderer = Renderer::new(gpu, surface, surface_config, config);
        renderer.resize(size.width, size.height);
        let demo = DemoScene::new(&mut renderer, image)?;

        Ok(Self {
            window,
            renderer,
            demo,
            started: Instant::now(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }

    /// Draw one frame of the demo.
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.window.request_redraw();

        let (width, height) = self.renderer.size();
        let viewport = Vector2::new(width as f32, height as f32);
        let frame = self
            .demo
            .frame(viewport, self.started.elapsed().as_secs_f32());

        self.renderer.begin_frame()?;
        self.renderer.render(&frame)?;
        self.renderer.end_frame()
    }

    /// Recover from a failed frame where possible. Returns false if the app should exit.
    pub fn handle_render_error(&mut self, error: RenderError) -> bool {
        match error {
            RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.renderer.size();
                self.renderer.resize(width, height);
                true
            }
            RenderError::Surface(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory!");
                false
            }
            error => {
                log::warn!("Failed to render frame: {error}");
                true
            }
        }
    }

    pub fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode, is_pressed: bool) {
        if (code, is_pressed) == (KeyCode::Escape, true) {
            event_loop.exit();
        }
    }
}
