//! CPU reference of the two sprite programs.
//!
//! Both WGSL programs run the same three stages: transform, corner UV lookup, and
//! sample + decode. This module runs those stages on the CPU, generic over where the
//! sprite's record comes from ([`SpriteSource`]) and how its texture is bound
//! ([`TextureBinding`]). It backs the tests of the shader math and can render
//! single texels for debugging without a GPU.

use cgmath::{Matrix4, Vector4};
use image::RgbaImage;

use crate::graphics::{
    color::{planar::PlanarImage, ycbcr::decode_planar},
    sprite::{
        corner::Corner,
        instance::SpriteInstance,
        quad::{QUAD, QuadVertex},
        uniform::SpriteUniform,
    },
};

/// Where a sprite's per-draw data comes from.
pub trait SpriteSource {
    fn clip_matrix(&self) -> Matrix4<f32>;
    fn corner_uv(&self, corner: Corner) -> [f32; 2];
    fn tint(&self) -> [f32; 4];
    /// Slot in the bound texture set. Single-texture sources always report 0.
    fn texture_index(&self) -> u32;
    fn is_ycbcr(&self) -> bool;
}

impl SpriteSource for SpriteUniform {
    fn clip_matrix(&self) -> Matrix4<f32> {
        self.matrix.into()
    }

    fn corner_uv(&self, corner: Corner) -> [f32; 2] {
        let [u, v, _, _] = self.tex_coords[corner as usize];
        [u, v]
    }

    fn tint(&self) -> [f32; 4] {
        self.color
    }

    fn texture_index(&self) -> u32 {
        0
    }

    fn is_ycbcr(&self) -> bool {
        self.is_ycbcr != 0
    }
}

impl SpriteSource for SpriteInstance {
    fn clip_matrix(&self) -> Matrix4<f32> {
        self.matrix.into()
    }

    fn corner_uv(&self, corner: Corner) -> [f32; 2] {
        self.corner_uvs()[corner]
    }

    fn tint(&self) -> [f32; 4] {
        self.color
    }

    fn texture_index(&self) -> u32 {
        self.texture_index
    }

    fn is_ycbcr(&self) -> bool {
        self.is_ycbcr != 0
    }
}

/// A texture that can be sampled at an explicit mip level.
pub trait SampleLevel {
    fn sample_level(&self, uv: [f32; 2], level: u32) -> [f32; 4];
}

/// How the sampled texture is picked for a sprite.
pub trait TextureBinding {
    type Texture: SampleLevel;

    fn select(&self, texture_index: u32) -> &Self::Texture;
}

/// One bound texture; the index is ignored.
#[derive(Clone, Copy, Debug)]
pub struct SingleTexture<'a, T>(pub &'a T);

impl<T: SampleLevel> TextureBinding for SingleTexture<'_, T> {
    type Texture = T;

    fn select(&self, _texture_index: u32) -> &T {
        self.0
    }
}

/// An indexed set of bound textures.
///
/// Like the GPU binding array this performs no validation of its own.
///
/// ## Panic
/// Panics when the index is outside the set; validate batches before shading them.
#[derive(Clone, Copy, Debug)]
pub struct IndexedTextures<'a, T>(pub &'a [T]);

impl<T: SampleLevel> TextureBinding for IndexedTextures<'_, T> {
    type Texture = T;

    fn select(&self, texture_index: u32) -> &T {
        &self.0[texture_index as usize]
    }
}

/// The vertex stage output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadedVertex {
    pub clip_position: Vector4<f32>,
    pub uv: [f32; 2],
}

/// `M * (p.x, p.y, 0, 1)`.
pub fn transform_vertex<S: SpriteSource>(source: &S, vertex: &QuadVertex) -> Vector4<f32> {
    let [x, y] = vertex.position;
    source.clip_matrix() * Vector4::new(x, y, 0.0, 1.0)
}

/// Look up the UV for a vertex corner index.
///
/// ## Panic
/// Panics when `corner_index` is not 0..=3.
pub fn resolve_uv<S: SpriteSource>(source: &S, corner_index: u32) -> [f32; 2] {
    let corner = Corner::from_index(corner_index)
        .unwrap_or_else(|| panic!("corner index {corner_index} is out of range"));
    source.corner_uv(corner)
}

/// The full vertex stage.
pub fn shade_vertex<S: SpriteSource>(source: &S, vertex: &QuadVertex) -> ShadedVertex {
    ShadedVertex {
        clip_position: transform_vertex(source, vertex),
        uv: resolve_uv(source, vertex.corner),
    }
}

/// The fragment stage at an interpolated UV.
pub fn shade_fragment<S, B>(source: &S, binding: &B, uv: [f32; 2]) -> [f32; 4]
where
    S: SpriteSource,
    B: TextureBinding,
{
    let texture = binding.select(source.texture_index());
    let color = if source.is_ycbcr() {
        decode_planar(texture.sample_level(uv, 0), texture.sample_level(uv, 1))
    } else {
        texture.sample_level(uv, 0)
    };
    let tint = source.tint();
    [
        color[0] * tint[0],
        color[1] * tint[1],
        color[2] * tint[2],
        color[3] * tint[3],
    ]
}

/// Run both stages for the quad vertex at `corner`.
///
/// Returns where the corner lands and the color shown there.
pub fn shade_corner<S, B>(source: &S, binding: &B, corner: Corner) -> (Vector4<f32>, [f32; 4])
where
    S: SpriteSource,
    B: TextureBinding,
{
    let vertex = shade_vertex(source, &QUAD[corner as usize]);
    (vertex.clip_position, shade_fragment(source, binding, vertex.uv))
}

/// One mip level of a [`TexelTexture`].
#[derive(Clone, Debug, PartialEq)]
pub struct TexelLevel {
    pub width: u32,
    pub height: u32,
    pub texels: Vec<[f32; 4]>,
}

impl TexelLevel {
    pub fn solid(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            texels: vec![color; (width * height) as usize],
        }
    }

    /// Nearest texel, clamped to the edge.
    fn sample(&self, uv: [f32; 2]) -> [f32; 4] {
        let coord = |t: f32, size: u32| ((t * size as f32).floor() as i64).clamp(0, size as i64 - 1) as u32;
        let x = coord(uv[0], self.width);
        let y = coord(uv[1], self.height);
        self.texels[(y * self.width + x) as usize]
    }
}

/// A CPU-side texture with explicit mip levels, nearest filtered.
#[derive(Clone, Debug, PartialEq)]
pub struct TexelTexture {
    levels: Vec<TexelLevel>,
}

impl TexelTexture {
    /// ## Panic
    /// Panics when `levels` is empty.
    pub fn from_levels(levels: Vec<TexelLevel>) -> Self {
        assert!(!levels.is_empty(), "a texture needs at least one level");
        Self { levels }
    }

    pub fn solid(color: [f32; 4]) -> Self {
        Self::from_levels(vec![TexelLevel::solid(1, 1, color)])
    }

    /// Straight RGBA, one level.
    pub fn from_rgba(image: &RgbaImage) -> Self {
        let texels = image
            .pixels()
            .map(|p| p.0.map(|c| c as f32 / 255.0))
            .collect();
        Self::from_levels(vec![TexelLevel {
            width: image.width(),
            height: image.height(),
            texels,
        }])
    }

    /// The same two levels the GPU texture for a planar image has.
    pub fn from_planar(image: &PlanarImage) -> Self {
        let to_texels = |plane: &[u8]| {
            plane
                .chunks_exact(2)
                .map(|c| [c[0] as f32 / 255.0, c[1] as f32 / 255.0, 0.0, 1.0])
                .collect()
        };
        let (cw, ch) = PlanarImage::chroma_size(image.width(), image.height());
        Self::from_levels(vec![
            TexelLevel {
                width: image.width(),
                height: image.height(),
                texels: to_texels(image.luma_alpha()),
            },
            TexelLevel {
                width: cw,
                height: ch,
                texels: to_texels(image.chroma()),
            },
        ])
    }

    pub fn level_mut(&mut self, level: usize) -> Option<&mut TexelLevel> {
        self.levels.get_mut(level)
    }
}

impl SampleLevel for TexelTexture {
    /// Levels past the last one clamp to it, as GPU sampling does.
    fn sample_level(&self, uv: [f32; 2], level: u32) -> [f32; 4] {
        let level = (level as usize).min(self.levels.len() - 1);
        self.levels[level].sample(uv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::sprite::corner::CornerUvs;
    use bytemuck::Zeroable;
    use cgmath::SquareMatrix;
    use image::Rgba;

    const EPS: f32 = 1e-5;

    fn assert_rgba(actual: [f32; 4], expected: [f32; 4]) {
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPS, "{actual:?} != {expected:?}");
        }
    }

    fn uniform(uvs: CornerUvs, tint: [f32; 4], is_ycbcr: bool) -> SpriteUniform {
        SpriteUniform {
            matrix: Matrix4::identity().into(),
            tex_coords: uvs.padded(),
            color: tint,
            is_ycbcr: is_ycbcr as u32,
            _padding: [0; 3],
        }
    }

    fn instance(texture_index: u32) -> SpriteInstance {
        let mut instance = SpriteInstance::zeroed();
        instance.matrix = Matrix4::identity().into();
        instance.set_corner_uvs(&CornerUvs::full());
        instance.color = [1.0; 4];
        instance.texture_index = texture_index;
        instance
    }

    /// Four texels, one per texture quadrant.
    fn quadrant_texture() -> TexelTexture {
        TexelTexture::from_levels(vec![TexelLevel {
            width: 2,
            height: 2,
            texels: vec![
                [1.0, 0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0, 1.0],
                [0.0, 0.0, 1.0, 1.0],
                [1.0, 1.0, 1.0, 1.0],
            ],
        }])
    }

    #[test]
    fn vertex_stage_applies_the_matrix() {
        let mut sprite = uniform(CornerUvs::full(), [1.0; 4], false);
        sprite.matrix = Matrix4::from_nonuniform_scale(2.0, 4.0, 1.0).into();
        let v = shade_vertex(&sprite, &QUAD[Corner::TopRight as usize]);
        assert_eq!(v.clip_position, Vector4::new(1.0, 2.0, 0.0, 1.0));
        assert_eq!(v.uv, [1.0, 0.0]);
    }

    #[test]
    fn swapping_table_entries_swaps_corner_colors_not_positions() {
        let texture = quadrant_texture();
        let binding = SingleTexture(&texture);
        // sample texel centres so nearest filtering is unambiguous
        let uvs = CornerUvs::from_rect([0.25, 0.25], [0.75, 0.75]);
        let mut swapped = uvs;
        swapped.0.swap(0, 1);

        let plain = uniform(uvs, [1.0; 4], false);
        let flipped = uniform(swapped, [1.0; 4], false);

        let (tl_pos, tl) = shade_corner(&plain, &binding, Corner::TopLeft);
        let (tr_pos, tr) = shade_corner(&plain, &binding, Corner::TopRight);
        let (tl_pos_f, tl_f) = shade_corner(&flipped, &binding, Corner::TopLeft);
        let (tr_pos_f, tr_f) = shade_corner(&flipped, &binding, Corner::TopRight);

        assert_eq!(tl_pos, tl_pos_f);
        assert_eq!(tr_pos, tr_pos_f);
        assert_rgba(tl, [1.0, 0.0, 0.0, 1.0]);
        assert_rgba(tr, [0.0, 1.0, 0.0, 1.0]);
        assert_rgba(tl_f, tr);
        assert_rgba(tr_f, tl);
    }

    #[test]
    fn horizontal_flip_mirrors_every_corner() {
        let texture = quadrant_texture();
        let binding = SingleTexture(&texture);
        let uvs = CornerUvs::from_rect([0.25, 0.25], [0.75, 0.75]);
        let plain = uniform(uvs, [1.0; 4], false);
        let flipped = uniform(uvs.flipped_horizontal(), [1.0; 4], false);
        let mirror = [
            (Corner::TopLeft, Corner::TopRight),
            (Corner::BottomLeft, Corner::BottomRight),
        ];
        for (a, b) in mirror {
            assert_rgba(
                shade_corner(&flipped, &binding, a).1,
                shade_corner(&plain, &binding, b).1,
            );
        }
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn corner_index_past_three_panics() {
        let sprite = uniform(CornerUvs::full(), [1.0; 4], false);
        resolve_uv(&sprite, 4);
    }

    #[test]
    fn instances_sample_their_own_texture() {
        let textures = [
            TexelTexture::solid([1.0, 0.0, 0.0, 1.0]),
            TexelTexture::solid([0.0, 0.0, 1.0, 1.0]),
        ];
        let binding = IndexedTextures(&textures);
        let a = instance(0);
        let b = instance(1);
        for corner in Corner::ALL {
            let (pos_a, color_a) = shade_corner(&a, &binding, corner);
            let (pos_b, color_b) = shade_corner(&b, &binding, corner);
            assert_eq!(pos_a, pos_b);
            assert_rgba(color_a, [1.0, 0.0, 0.0, 1.0]);
            assert_rgba(color_b, [0.0, 0.0, 1.0, 1.0]);
        }
    }

    #[test]
    fn planar_instance_uses_one_texture_for_both_levels() {
        let neutral = 128.0 / 255.0;
        let textures = [
            TexelTexture::solid([0.0, 0.0, 0.0, 1.0]),
            TexelTexture::from_levels(vec![
                TexelLevel::solid(2, 2, [0.5, 1.0, 0.0, 0.0]),
                TexelLevel::solid(1, 1, [neutral, neutral, 0.0, 0.0]),
            ]),
        ];
        let mut sprite = instance(1);
        sprite.is_ycbcr = 1;
        let color = shade_fragment(&sprite, &IndexedTextures(&textures), [0.5, 0.5]);
        assert_rgba(color, [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn passthrough_ignores_the_second_level() {
        let mut texture = TexelTexture::from_levels(vec![
            TexelLevel::solid(2, 2, [0.2, 0.4, 0.6, 0.8]),
            TexelLevel::solid(1, 1, [0.0; 4]),
        ]);
        let sprite = uniform(CornerUvs::full(), [0.5, 1.0, 1.0, 0.5], false);
        let before = shade_fragment(&sprite, &SingleTexture(&texture), [0.3, 0.7]);
        assert_rgba(before, [0.1, 0.4, 0.6, 0.4]);

        if let Some(level) = texture.level_mut(1) {
            level.texels = vec![[1.0, 0.0, 1.0, 0.0]];
        }
        let after = shade_fragment(&sprite, &SingleTexture(&texture), [0.3, 0.7]);
        assert_eq!(before, after);
    }

    #[test]
    fn half_gray_tint_on_opaque_white_decode() {
        let neutral = 128.0 / 255.0;
        let texture = TexelTexture::from_levels(vec![
            TexelLevel::solid(2, 2, [1.0, 1.0, 0.0, 0.0]),
            TexelLevel::solid(1, 1, [neutral, neutral, 0.0, 0.0]),
        ]);
        let sprite = uniform(CornerUvs::full(), [0.5, 0.5, 0.5, 1.0], true);
        let color = shade_fragment(&sprite, &SingleTexture(&texture), [0.5, 0.5]);
        assert_rgba(color, [0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn planar_upload_decodes_like_the_source_image() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([200, 120, 40, 255]));
        let planar = PlanarImage::encode(&image).unwrap();
        let texture = TexelTexture::from_planar(&planar);
        let sprite = uniform(CornerUvs::full(), [1.0; 4], true);
        let color = shade_fragment(&sprite, &SingleTexture(&texture), [0.6, 0.1]);
        let expected = [200.0 / 255.0, 120.0 / 255.0, 40.0 / 255.0, 1.0];
        for (a, e) in color.iter().zip(expected) {
            assert!((a - e).abs() < 0.015, "{color:?} != {expected:?}");
        }
    }
}
