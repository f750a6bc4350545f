use crate::graphics::{
    constants::{INDEX_BUFFER_FORMAT, VERTEX_BUFFER_SLOT},
    gpu::{GpuContext, buffer::GpuBuffer},
    sprite::corner::Corner,
};

/// The data for a quad vertex.
///
/// The position is only geometry; which texel the vertex shows comes from the
/// sprite's corner table, looked up with `corner`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub corner: u32,
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Uint32];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A 1x1, origin-centred, y-up square. One vertex per corner, in corner index order.
///
/// Any sprite rectangle is this quad under the sprite's matrix.
pub const QUAD: [QuadVertex; 4] = [
    QuadVertex {
        position: [-0.5, 0.5],
        corner: Corner::TopLeft as u32,
    },
    QuadVertex {
        position: [0.5, 0.5],
        corner: Corner::TopRight as u32,
    },
    QuadVertex {
        position: [-0.5, -0.5],
        corner: Corner::BottomLeft as u32,
    },
    QuadVertex {
        position: [0.5, -0.5],
        corner: Corner::BottomRight as u32,
    },
];

/// Two counter-clockwise triangles over [`QUAD`].
pub const QUAD_INDICES: [u32; 6] = [1, 2, 3, 0, 2, 1];

/// The quad's vertex + index buffers, shared by every sprite draw.
#[derive(Clone, Debug)]
pub struct QuadMesh {
    vertex_buffer: GpuBuffer,
    index_buffer: GpuBuffer,
}

impl QuadMesh {
    pub fn new(gpu: &GpuContext) -> Self {
        let vertex_buffer =
            GpuBuffer::create_vertex("QuadMesh::vertices", gpu, bytemuck::cast_slice(&QUAD));
        let index_buffer =
            GpuBuffer::create_index("QuadMesh::indices", gpu, bytemuck::cast_slice(&QUAD_INDICES));
        Self {
            vertex_buffer,
            index_buffer,
        }
    }

    pub fn vertex_buffer(&self) -> &GpuBuffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &GpuBuffer {
        &self.index_buffer
    }

    pub fn num_indices(&self) -> u32 {
        QUAD_INDICES.len() as u32
    }

    /// Bind the quad for every following sprite draw.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(VERTEX_BUFFER_SLOT, self.vertex_buffer.handle().slice(..));
        render_pass.set_index_buffer(self.index_buffer.handle().slice(..), INDEX_BUFFER_FORMAT);
    }
}
