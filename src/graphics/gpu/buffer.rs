use crate::graphics::gpu::GpuContext;
use wgpu::{BufferDescriptor, util::{BufferInitDescriptor, DeviceExt}};

#[derive(Clone, Debug)]
pub struct GpuBuffer {
    buffer: wgpu::Buffer,
}

impl GpuBuffer {
    /// Create a vertex buffer.
    pub fn create_vertex(label: &str, gpu: &GpuContext, contents: &[u8]) -> Self {
        let buffer = gpu.device().create_buffer_init(&BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self { buffer }
    }

    /// Creates a writeable vertex buffer (usually for instances) with a fixed capacity of `size` bytes.
    pub fn create_writeable_vertex_uninit(label: &str, gpu: &GpuContext, size: u64) -> Self {
        let buffer = gpu.device().create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    /// Create an index buffer.
    pub fn create_index(label: &str, gpu: &GpuContext, contents: &[u8]) -> Self {
        let buffer = gpu.device().create_buffer_init(&BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::INDEX,
        });
        Self { buffer }
    }

    /// Creates a writeable uniform buffer with a fixed capacity of `size` bytes.
    pub fn create_writeable_uniform_uninit(label: &str, gpu: &GpuContext, size: u64) -> Self {
        let buffer = gpu.device().create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { buffer }
    }

    /// Get the actual buffer.
    pub fn handle(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Capacity in bytes.
    pub fn size(&self) -> u64 {
        self.buffer.size()
    }
}
