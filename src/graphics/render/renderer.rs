use thiserror::Error;
use wgpu::{SurfaceTexture, TextureView};

use crate::{
    config::RendererConfig,
    graphics::{
        gpu::GpuContext,
        render::{
            assets::{SpriteTextureId, SpriteTextureStore},
            batch::BatchPipeline,
            commands::SpriteRenderCommand,
            frame::{FrameItem, SpriteFrame},
            single::SinglePipeline,
        },
        sprite::quad::QuadMesh,
        textures::{set::SpriteTextureSet, slots::TextureSetError},
    },
};

/// Data for a currently rendering frame.
struct CurrentFrameData {
    output: SurfaceTexture,
    view: TextureView,
}

/// The batched program and the textures bound to it.
struct BatchState {
    pipeline: BatchPipeline,
    texture_set: SpriteTextureSet,
}

/// Draws sprite frames to a surface.
pub struct Renderer<'a> {
    gpu: GpuContext,
    surface: wgpu::Surface<'a>,
    surface_config: wgpu::SurfaceConfiguration,
    surface_is_configured: bool,
    config: RendererConfig,
    quad: QuadMesh,
    assets: SpriteTextureStore,
    single: SinglePipeline,
    batch: Option<BatchState>,
    current_frame: Option<CurrentFrameData>,
}

impl<'a> Renderer<'a> {
    /// Initialize the renderer.
    ///
    /// The batched pipeline is only created when enabled and the device supports it.
    pub fn new(
        gpu: GpuContext,
        surface: wgpu::Surface<'a>,
        surface_config: wgpu::SurfaceConfiguration,
        config: RendererConfig,
    ) -> Self {
        let assets = SpriteTextureStore::new(gpu.clone());
        let quad = QuadMesh::new(&gpu);
        let single = SinglePipeline::new(
            gpu.clone(),
            surface_config.format,
            assets.layout(),
            config.initial_uniform_capacity,
        );
        let batch = if !config.batch_enabled {
            None
        } else if gpu.supports_sprite_batches() {
            let texture_set = SpriteTextureSet::new(&gpu);
            let pipeline = BatchPipeline::new(
                gpu.clone(),
                surface_config.format,
                texture_set.layout(),
                config.initial_instance_capacity,
            );
            Some(BatchState {
                pipeline,
                texture_set,
            })
        } else {
            log::warn!("Device doesn't support texture binding arrays, only single sprites will draw");
            None
        };

        Self {
            gpu,
            surface,
            surface_config,
            surface_is_configured: false,
            config,
            quad,
            assets,
            single,
            batch,
            current_frame: None,
        }
    }

    /// Handle resizing of the surface.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.surface_config.width = width;
            self.surface_config.height = height;
            self.surface.configure(self.gpu.device(), &self.surface_config);
            self.surface_is_configured = true;
        }
    }

    /// The current surface size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    /// Get the texture store.
    pub fn assets(&self) -> &SpriteTextureStore {
        &self.assets
    }

    /// Get the texture store mutably, to add textures. Use
    /// [`Renderer::remove_texture`] to remove them.
    pub fn assets_mut(&mut self) -> &mut SpriteTextureStore {
        &mut self.assets
    }

    /// Whether batches can be drawn.
    pub fn supports_batches(&self) -> bool {
        self.batch.is_some()
    }

    /// Bind a stored texture into the batched program's set, returning its slot.
    pub fn bind_batch_texture(&mut self, id: SpriteTextureId) -> RenderResult<u32> {
        if self.assets.get(id).is_none() {
            return Err(RenderError::TextureNotFound(id));
        }
        let batch = self.batch.as_mut().ok_or(RenderError::UnsupportedAdapter)?;
        Ok(batch.texture_set.bind(id)?)
    }

    /// Free a texture's slot in the batched program's set.
    pub fn unbind_batch_texture(&mut self, id: SpriteTextureId) -> Option<u32> {
        self.batch.as_mut()?.texture_set.unbind(id)
    }

    /// Remove a texture from the store and from the batched set.
    pub fn remove_texture(&mut self, id: SpriteTextureId) -> bool {
        self.unbind_batch_texture(id);
        self.assets.remove(id).is_some()
    }

    /// Begin a frame for rendering.
    pub fn begin_frame(&mut self) -> RenderResult<()> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.current_frame = Some(CurrentFrameData { output, view });
        Ok(())
    }

    /// End a frame for rendering by displaying it.
    pub fn end_frame(&mut self) -> RenderResult<()> {
        if let Some(frame) = self.current_frame.take() {
            frame.output.present();
            return Ok(());
        }
        Err(RenderError::NoFrameInProgress)
    }

    /// Stage every item of the frame and turn it into draw commands.
    ///
    /// Fails without drawing anything if any item references a missing texture or an
    /// invalid slot.
    fn prepare(&mut self, frame: &SpriteFrame) -> RenderResult<Vec<SpriteRenderCommand>> {
        self.single.clear();
        if let Some(batch) = &mut self.batch {
            batch.pipeline.clear();
        }

        let mut commands = Vec::with_capacity(frame.items().len());
        for item in frame.items() {
            let command = match item {
                FrameItem::Single(sprite) => {
                    if self.assets.bind_group(sprite.texture).is_none() {
                        return Err(RenderError::TextureNotFound(sprite.texture));
                    }
                    SpriteRenderCommand::Single {
                        texture: sprite.texture,
                        uniform_offset: self.single.push(&sprite.to_uniform()),
                    }
                }
                FrameItem::Batch(sprites) => {
                    let batch = self.batch.as_mut().ok_or(RenderError::UnsupportedAdapter)?;
                    let range = batch
                        .pipeline
                        .prepare(sprites, &batch.texture_set, &self.assets)?;
                    SpriteRenderCommand::Batch { range }
                }
            };
            commands.push(command);
        }

        self.single.write();
        if let Some(batch) = &self.batch {
            batch.pipeline.write();
        }
        Ok(commands)
    }

    /// Render the given sprites into the current frame, in order.
    ///
    /// If any item is invalid nothing is drawn and this returns a `RenderError`.
    pub fn render(&mut self, frame: &SpriteFrame) -> RenderResult<()> {
        if !self.surface_is_configured {
            return Err(RenderError::UnconfiguredSurface);
        }
        if self.current_frame.is_none() {
            return Err(RenderError::NoFrameInProgress);
        }

        let commands = self.prepare(frame)?;
        let has_batches = commands
            .iter()
            .any(|c| matches!(c, SpriteRenderCommand::Batch { .. }));
        let texture_set = match &mut self.batch {
            Some(batch) if has_batches => Some(
                batch
                    .texture_set
                    .bind_group(&self.gpu, self.assets.textures())
                    .clone(),
            ),
            _ => None,
        };

        let Some(current_frame) = &self.current_frame else {
            return Err(RenderError::NoFrameInProgress);
        };
        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("sprite_encoder"),
            });
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("sprite_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &current_frame.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.config.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        self.quad.bind(&mut render_pass);
        let num_indices = self.quad.num_indices();
        for command in commands {
            match command {
                SpriteRenderCommand::Single {
                    texture,
                    uniform_offset,
                } => {
                    let texture = self
                        .assets
                        .bind_group(texture)
                        .ok_or(RenderError::TextureNotFound(texture))?;
                    self.single
                        .draw(&mut render_pass, texture, uniform_offset, num_indices);
                }
                SpriteRenderCommand::Batch { range } => {
                    let (Some(batch), Some(texture_set)) = (&self.batch, &texture_set) else {
                        return Err(RenderError::UnsupportedAdapter);
                    };
                    batch
                        .pipeline
                        .draw(&mut render_pass, texture_set, range, num_indices);
                }
            }
        }
        drop(render_pass);

        self.gpu.queue().submit([encoder.finish()]);
        Ok(())
    }
}

/// An error from rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No frame in progress (call begin_frame first)")]
    NoFrameInProgress,
    #[error("The surface is not configured yet")]
    UnconfiguredSurface,
    #[error("Sprite texture {0:?} is not in the store")]
    TextureNotFound(SpriteTextureId),
    #[error("Sprite batches need texture binding arrays, which this device doesn't have")]
    UnsupportedAdapter,
    #[error("{0}")]
    TextureSet(#[from] TextureSetError),
    #[error("{0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// A result from the renderer.
pub type RenderResult<T> = Result<T, RenderError>;
