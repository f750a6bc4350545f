use cgmath::Matrix4;

use crate::graphics::{
    render::assets::SpriteTextureId,
    sprite::{corner::CornerUvs, instance::SpriteInstance, uniform::SpriteUniform},
    textures::sprite::SpriteTexture,
};

/// Everything needed to draw one sprite for one frame.
///
/// Built by the host every frame and thrown away after the frame is rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Local quad space -> clip space.
    pub transform: Matrix4<f32>,
    pub corner_uvs: CornerUvs,
    /// Multiplied into the final color, alpha included.
    pub tint: [f32; 4],
    pub texture: SpriteTextureId,
    pub is_planar_ycbcr: bool,
}

impl Sprite {
    /// An untinted sprite showing the whole of an RGBA texture.
    pub fn new(texture: SpriteTextureId, transform: Matrix4<f32>) -> Self {
        Self {
            transform,
            corner_uvs: CornerUvs::full(),
            tint: [1.0; 4],
            texture,
            is_planar_ycbcr: false,
        }
    }

    /// Like [`Sprite::new`], taking the decode path from the texture itself.
    pub fn for_texture(
        id: SpriteTextureId,
        texture: &SpriteTexture,
        transform: Matrix4<f32>,
    ) -> Self {
        Self {
            is_planar_ycbcr: texture.is_planar(),
            ..Self::new(id, transform)
        }
    }

    pub fn with_corner_uvs(mut self, corner_uvs: CornerUvs) -> Self {
        self.corner_uvs = corner_uvs;
        self
    }

    pub fn with_tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    pub fn with_planar_ycbcr(mut self, is_planar_ycbcr: bool) -> Self {
        self.is_planar_ycbcr = is_planar_ycbcr;
        self
    }

    /// The record for the single sprite program.
    pub fn to_uniform(&self) -> SpriteUniform {
        SpriteUniform {
            matrix: self.transform.into(),
            tex_coords: self.corner_uvs.padded(),
            color: self.tint,
            is_ycbcr: self.is_planar_ycbcr as u32,
            _padding: [0; 3],
        }
    }

    /// The record for the batched program, given the texture's slot in the bound set.
    pub fn to_instance(&self, texture_index: u32) -> SpriteInstance {
        let mut instance = SpriteInstance {
            matrix: self.transform.into(),
            uv_top_left: [0.0; 2],
            uv_top_right: [0.0; 2],
            uv_bottom_left: [0.0; 2],
            uv_bottom_right: [0.0; 2],
            color: self.tint,
            texture_index,
            is_ycbcr: self.is_planar_ycbcr as u32,
        };
        instance.set_corner_uvs(&self.corner_uvs);
        instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::sprite::corner::Corner;
    use cgmath::{SquareMatrix, Vector3};
    use slotmap::KeyData;

    fn texture_id() -> SpriteTextureId {
        SpriteTextureId::from(KeyData::from_ffi(1))
    }

    #[test]
    fn records_carry_matrix_columns() {
        let transform = Matrix4::from_translation(Vector3::new(3.0, 4.0, 0.0));
        let sprite = Sprite::new(texture_id(), transform);
        let uniform = sprite.to_uniform();
        let instance = sprite.to_instance(7);
        // cgmath is column-major: the translation is the last column
        assert_eq!(uniform.matrix[3], [3.0, 4.0, 0.0, 1.0]);
        assert_eq!(instance.matrix, uniform.matrix);
        assert_eq!(instance.texture_index, 7);
    }

    #[test]
    fn both_records_carry_the_same_sprite() {
        let uvs = CornerUvs::from_rect([0.0, 0.5], [0.5, 1.0]).flipped_vertical();
        let sprite = Sprite::new(texture_id(), Matrix4::identity())
            .with_corner_uvs(uvs)
            .with_tint([0.5, 0.25, 1.0, 0.75])
            .with_planar_ycbcr(true);
        let uniform = sprite.to_uniform();
        let instance = sprite.to_instance(0);

        assert_eq!(uniform.is_ycbcr, 1);
        assert_eq!(instance.is_ycbcr, 1);
        assert_eq!(uniform.color, instance.color);
        for corner in Corner::ALL {
            let [u, v, _, _] = uniform.tex_coords[corner as usize];
            assert_eq!([u, v], uvs[corner]);
        }
        assert_eq!(instance.corner_uvs(), uvs);
    }
}
