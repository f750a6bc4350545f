use bytemuck::{Pod, Zeroable};

/// The per-draw record of the single sprite program.
///
/// Mirrors `SpriteInfo` in `sprite.wgsl` field for field. Each corner UV sits in the
/// `xy` of a 16 byte slot because uniform arrays need a 16 byte stride.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteUniform {
    pub matrix: [[f32; 4]; 4],
    pub tex_coords: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub is_ycbcr: u32,
    pub _padding: [u32; 3],
}

impl SpriteUniform {
    /// The size of the record in bytes.
    pub const SIZE: wgpu::BufferAddress = size_of::<Self>() as wgpu::BufferAddress;

    /// The layout entry for the uniform, bound with a dynamic offset per sprite.
    pub const BIND_GROUP_LAYOUT_ENTRY: wgpu::BindGroupLayoutEntry = wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: true,
            min_binding_size: wgpu::BufferSize::new(Self::SIZE),
        },
        count: None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn layout_matches_wgsl_struct() {
        assert_eq!(size_of::<SpriteUniform>(), 160);
        assert_eq!(offset_of!(SpriteUniform, matrix), 0);
        assert_eq!(offset_of!(SpriteUniform, tex_coords), 64);
        assert_eq!(offset_of!(SpriteUniform, color), 128);
        assert_eq!(offset_of!(SpriteUniform, is_ycbcr), 144);
        assert_eq!(SpriteUniform::SIZE % 16, 0);
    }
}
