use crate::graphics::{
    constants::{SPRITE_TEXTURE_BIND_GROUP_SLOT, SPRITE_UNIFORM_BIND_GROUP_SLOT},
    gpu::{
        GpuContext, bind_group::GpuBindGroup, buffer::GpuBuffer, pipeline::GpuPipeline,
        shader::GpuShader,
    },
    sprite::{quad::QuadVertex, uniform::SpriteUniform},
};

const SPRITE_WGSL: &str = include_str!("../shaders/sprite.wgsl");

/// The single sprite program: one draw per sprite, its record bound as a uniform.
///
/// Every sprite of a frame gets its own slot in one uniform buffer, selected per draw with a
/// dynamic offset.
pub struct SinglePipeline {
    gpu: GpuContext,
    pipeline: GpuPipeline,
    uniforms: GpuBuffer,
    uniform_bind_group: GpuBindGroup,
    uniform_data: Vec<u8>,
    stride: u64,
    capacity: u64,
}

impl SinglePipeline {
    pub fn new(
        gpu: GpuContext,
        target_format: wgpu::TextureFormat,
        texture_layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> Self {
        let stride = aligned_stride(
            SpriteUniform::SIZE,
            gpu.device().limits().min_uniform_buffer_offset_alignment as u64,
        );
        let capacity = capacity.max(1);
        let uniform_layout = GpuBindGroup::create_layout(
            "sprite_uniform",
            &gpu,
            &[SpriteUniform::BIND_GROUP_LAYOUT_ENTRY],
        );
        let (uniforms, uniform_bind_group) =
            Self::create_uniforms(&gpu, &uniform_layout, capacity * stride);

        let shader = GpuShader::create_sprite(&gpu, "sprite_shader", SPRITE_WGSL);
        let pipeline = GpuPipeline::create_sprite(
            "sprite_pipeline",
            &gpu,
            target_format,
            &[texture_layout, &uniform_layout],
            &[QuadVertex::desc()],
            &shader,
        );
        log::info!("Created single sprite pipeline (uniform stride {stride} bytes)");

        Self {
            gpu,
            pipeline,
            uniforms,
            uniform_bind_group,
            uniform_data: Vec::with_capacity((capacity * stride) as usize),
            stride,
            capacity,
        }
    }

    fn create_uniforms(
        gpu: &GpuContext,
        layout: &wgpu::BindGroupLayout,
        size: u64,
    ) -> (GpuBuffer, GpuBindGroup) {
        let buffer = GpuBuffer::create_writeable_uniform_uninit("sprite_uniforms", gpu, size);
        let bind_group = GpuBindGroup::create_with_layout(
            "sprite_uniform",
            gpu,
            layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: buffer.handle(),
                    offset: 0,
                    size: wgpu::BufferSize::new(SpriteUniform::SIZE),
                }),
            }],
        );
        (buffer, bind_group)
    }

    /// Drop the staged records (ie for a new frame).
    pub fn clear(&mut self) {
        self.uniform_data.clear();
    }

    /// Stage a sprite's record and return the dynamic offset to draw it with.
    pub fn push(&mut self, uniform: &SpriteUniform) -> u32 {
        let offset = self.uniform_data.len();
        self.uniform_data.extend_from_slice(bytemuck::bytes_of(uniform));
        self.uniform_data.resize(offset + self.stride as usize, 0);
        offset as u32
    }

    /// Number of records staged this frame.
    pub fn staged(&self) -> u64 {
        self.uniform_data.len() as u64 / self.stride
    }

    /// Write the staged records, growing the buffer first if they won't fit.
    pub fn write(&mut self) {
        let required = self.staged();
        if required == 0 {
            return;
        }
        if required > self.capacity {
            let capacity = super::instance_buffer::grown_capacity(self.capacity, required);
            log::debug!(
                "Growing sprite uniform buffer from {} to {} slots",
                self.capacity,
                capacity
            );
            self.uniforms.handle().destroy();
            let layout = self.uniform_bind_group.layout().clone();
            let (uniforms, bind_group) =
                Self::create_uniforms(&self.gpu, &layout, capacity * self.stride);
            self.uniforms = uniforms;
            self.uniform_bind_group = bind_group;
            self.capacity = capacity;
        }
        self.gpu
            .queue()
            .write_buffer(self.uniforms.handle(), 0, &self.uniform_data);
    }

    /// Record one sprite's draw. The quad buffers must already be bound.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        texture: &GpuBindGroup,
        uniform_offset: u32,
        num_indices: u32,
    ) {
        render_pass.set_pipeline(self.pipeline.handle());
        render_pass.set_bind_group(SPRITE_TEXTURE_BIND_GROUP_SLOT, texture.handle(), &[]);
        render_pass.set_bind_group(
            SPRITE_UNIFORM_BIND_GROUP_SLOT,
            self.uniform_bind_group.handle(),
            &[uniform_offset],
        );
        render_pass.draw_indexed(0..num_indices, 0, 0..1);
    }
}

/// Round `size` up to a multiple of `alignment`.
pub fn aligned_stride(size: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment) * alignment
}
