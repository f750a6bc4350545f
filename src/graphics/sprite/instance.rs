use bytemuck::{Pod, Zeroable};
use wgpu::{VertexAttribute, VertexBufferLayout, VertexStepMode};

use crate::graphics::sprite::corner::{Corner, CornerUvs};

/// The per-instance record of the batched sprite program.
///
/// The matrix goes in as four column attributes; the corner table as four named UVs.
/// Field order and widths must match `InstanceInput` in `sprite_batch.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub matrix: [[f32; 4]; 4],
    pub uv_top_left: [f32; 2],
    pub uv_top_right: [f32; 2],
    pub uv_bottom_left: [f32; 2],
    pub uv_bottom_right: [f32; 2],
    pub color: [f32; 4],
    pub texture_index: u32,
    pub is_ycbcr: u32,
}

impl SpriteInstance {
    // Locations 0 and 1 belong to the quad vertex.
    const ATTRIBUTES: [VertexAttribute; 11] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x2,
        7 => Float32x2,
        8 => Float32x2,
        9 => Float32x2,
        10 => Float32x4,
        11 => Uint32,
        12 => Uint32,
    ];

    /// Get the vertex buffer description of an instance.
    pub fn desc() -> VertexBufferLayout<'static> {
        VertexBufferLayout {
            array_stride: size_of::<SpriteInstance>() as wgpu::BufferAddress,
            step_mode: VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// The corner table as laid out in the record.
    pub fn corner_uvs(&self) -> CornerUvs {
        CornerUvs([
            self.uv_top_left,
            self.uv_top_right,
            self.uv_bottom_left,
            self.uv_bottom_right,
        ])
    }

    /// Write a corner table into the record.
    pub fn set_corner_uvs(&mut self, uvs: &CornerUvs) {
        self.uv_top_left = uvs[Corner::TopLeft];
        self.uv_top_right = uvs[Corner::TopRight];
        self.uv_bottom_left = uvs[Corner::BottomLeft];
        self.uv_bottom_right = uvs[Corner::BottomRight];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn attributes_line_up_with_fields() {
        let desc = SpriteInstance::desc();
        assert_eq!(desc.array_stride, 120);
        assert_eq!(desc.step_mode, VertexStepMode::Instance);

        let offset = |location: u32| {
            desc.attributes
                .iter()
                .find(|a| a.shader_location == location)
                .map(|a| a.offset as usize)
                .unwrap()
        };
        assert_eq!(offset(2), offset_of!(SpriteInstance, matrix));
        assert_eq!(offset(5), offset_of!(SpriteInstance, matrix) + 48);
        assert_eq!(offset(6), offset_of!(SpriteInstance, uv_top_left));
        assert_eq!(offset(7), offset_of!(SpriteInstance, uv_top_right));
        assert_eq!(offset(8), offset_of!(SpriteInstance, uv_bottom_left));
        assert_eq!(offset(9), offset_of!(SpriteInstance, uv_bottom_right));
        assert_eq!(offset(10), offset_of!(SpriteInstance, color));
        assert_eq!(offset(11), offset_of!(SpriteInstance, texture_index));
        assert_eq!(offset(12), offset_of!(SpriteInstance, is_ycbcr));
    }

    #[test]
    fn corner_table_round_trips_through_named_fields() {
        let uvs = CornerUvs::from_rect([0.1, 0.2], [0.3, 0.4]).flipped_horizontal();
        let mut instance = SpriteInstance::zeroed();
        instance.set_corner_uvs(&uvs);
        assert_eq!(instance.uv_top_left, [0.3, 0.2]);
        assert_eq!(instance.corner_uvs(), uvs);
    }
}
