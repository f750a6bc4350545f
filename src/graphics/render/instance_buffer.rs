use bytemuck::Pod;
use wgpu::BufferSlice;

use crate::graphics::gpu::{GpuContext, buffer::GpuBuffer};

/// Describes the range of one batch's records within the entire buffer.
///
/// ## Note
/// This is in terms of records, not bytes. Thus the number of instances is `end - start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstanceBufferRange {
    pub start: u64,
    pub end: u64,
}

impl InstanceBufferRange {
    pub fn len(&self) -> u32 {
        (self.end - self.start) as u32
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// One big vertex buffer holding the instance records of every batch in a frame.
///
/// Records are staged on the CPU during the frame, then written in one go before drawing.
/// The GPU buffer is re-created at double size whenever a frame outgrows it.
pub struct InstanceBuffer<T: Pod> {
    gpu: GpuContext,
    buffer: GpuBuffer,
    buffer_label: String,
    buffer_data: Vec<T>,
    buffer_size: u64,
}

impl<T: Pod> InstanceBuffer<T> {
    /// Instantiate the buffer with room for `capacity` records.
    pub fn new(gpu: GpuContext, label: String, capacity: u64) -> Self {
        let capacity = capacity.max(1);
        let buffer =
            GpuBuffer::create_writeable_vertex_uninit(&label, &gpu, capacity * Self::stride());
        Self {
            gpu,
            buffer,
            buffer_label: label,
            buffer_data: Vec::with_capacity(capacity as usize),
            buffer_size: capacity,
        }
    }

    fn stride() -> u64 {
        size_of::<T>() as u64
    }

    /// Get the actual buffer.
    pub fn handle(&self) -> &GpuBuffer {
        &self.buffer
    }

    /// Capacity of the GPU buffer, in records.
    pub fn capacity(&self) -> u64 {
        self.buffer_size
    }

    /// Records staged so far this frame.
    pub fn staged(&self) -> &[T] {
        &self.buffer_data
    }

    /// Drop the staged records (ie for a new frame).
    pub fn clear(&mut self) {
        self.buffer_data.clear();
    }

    /// Stage a batch of records, growing the GPU buffer if they won't fit.
    pub fn add(&mut self, data: &[T]) -> InstanceBufferRange {
        let required_size = (self.buffer_data.len() + data.len()) as u64;
        if required_size > self.buffer_size {
            let new_size = grown_capacity(self.buffer_size, required_size);
            log::debug!(
                "Growing instance buffer {} from {} to {} records",
                self.buffer_label,
                self.buffer_size,
                new_size
            );
            self.buffer.handle().destroy();
            self.buffer = GpuBuffer::create_writeable_vertex_uninit(
                &self.buffer_label,
                &self.gpu,
                new_size * Self::stride(),
            );
            self.buffer_size = new_size;
        }

        let range = InstanceBufferRange {
            start: self.buffer_data.len() as u64,
            end: required_size,
        };
        self.buffer_data.extend_from_slice(data);
        range
    }

    /// Writes the staged records to the GPU buffer.
    ///
    /// Do this once every batch of the frame has been added, before recording draws.
    pub fn write(&self) {
        if self.buffer_data.is_empty() {
            return;
        }
        self.gpu.queue().write_buffer(
            self.buffer.handle(),
            0,
            bytemuck::cast_slice(&self.buffer_data),
        );
    }

    /// Get the buffer slice for a range handed out by [`InstanceBuffer::add`].
    ///
    /// ## Note
    /// This becomes invalid when the instance buffer is cleared.
    pub fn slice(&self, range: InstanceBufferRange) -> BufferSlice<'_> {
        self.buffer
            .handle()
            .slice(range.start * Self::stride()..range.end * Self::stride())
    }
}

/// Double `current` until it holds `required`.
pub fn grown_capacity(current: u64, required: u64) -> u64 {
    let mut size = current.max(1);
    while size < required {
        size *= 2;
    }
    size
}
