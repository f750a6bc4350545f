use std::path::Path;

use cgmath::{Deg, Rad, Vector2};
use image::{Rgba, RgbaImage};

use crate::{
    graphics::{
        color::planar::PlanarImage,
        render::{
            assets::SpriteTextureId,
            frame::{SpriteBatch, SpriteFrame},
            renderer::Renderer,
        },
        sprite::{corner::CornerUvs, descriptor::Sprite, transform::SpriteTransform},
    },
};

const GRID_COLUMNS: u32 = 12;
const GRID_ROWS: u32 = 6;
const BOB_SPEED: f32 = 2.0;
const MAX_VERTICAL_OFFSET: f32 = 6.0;
const ROTATION_SPEED: f32 = 0.5;

/// A texture the demo draws, with the slot it got in the batched set.
#[derive(Clone, Copy, Debug)]
struct DemoTexture {
    id: SpriteTextureId,
    size: [u32; 2],
    is_planar: bool,
    batch_slot: Option<u32>,
}

impl DemoTexture {
    fn sprite(&self, transform: &SpriteTransform, viewport: Vector2<f32>) -> Sprite {
        Sprite::new(self.id, transform.to_clip_matrix(viewport)).with_planar_ycbcr(self.is_planar)
    }
}

/// A few single sprites over a grid of batched ones.
pub struct DemoScene {
    textures: Vec<DemoTexture>,
}

impl DemoScene {
    /// Upload the demo textures, plus `image` (as planar YCbCr) if given.
    pub fn new(renderer: &mut Renderer<'_>, image: Option<&Path>) -> anyhow::Result<Self> {
        let checker = checkerboard(64, 8, [240, 240, 240, 255], [40, 40, 60, 255]);
        let checker_id = renderer.assets_mut().add_rgba(&checker, "demo_checkerboard");
        let gradient = PlanarImage::encode(&gradient(128))?;
        let gradient_id = renderer.assets_mut().add_planar(&gradient, "demo_gradient");

        let mut textures = vec![
            DemoTexture {
                id: checker_id,
                size: [64, 64],
                is_planar: false,
                batch_slot: None,
            },
            DemoTexture {
                id: gradient_id,
                size: [128, 128],
                is_planar: true,
                batch_slot: None,
            },
        ];
        if let Some(path) = image {
            let id = renderer.assets_mut().load(path, true)?;
            let size = renderer
                .assets()
                .get(id)
                .map(|t| t.size())
                .unwrap_or([1, 1]);
            textures.push(DemoTexture {
                id,
                size,
                is_planar: true,
                batch_slot: None,
            });
        }

        if renderer.supports_batches() {
            for texture in &mut textures {
                texture.batch_slot = Some(renderer.bind_batch_texture(texture.id)?);
            }
        }

        Ok(Self { textures })
    }

    /// Build the frame shown `seconds` after start.
    pub fn frame(&self, viewport: Vector2<f32>, seconds: f32) -> SpriteFrame {
        let mut frame = SpriteFrame::new();

        // batched grid behind everything, each sprite showing one quadrant of its texture
        let batched: Vec<&DemoTexture> = self
            .textures
            .iter()
            .filter(|t| t.batch_slot.is_some())
            .collect();
        if !batched.is_empty() {
            let mut batch = SpriteBatch::with_capacity((GRID_COLUMNS * GRID_ROWS) as usize);
            for (i, transform) in grid_transforms(GRID_COLUMNS, GRID_ROWS, viewport, seconds)
                .iter()
                .enumerate()
            {
                let texture = batched[i % batched.len()];
                let Some(slot) = texture.batch_slot else {
                    continue;
                };
                let [w, h] = texture.size;
                let quadrant = (i / batched.len()) % 4;
                let origin = [
                    (quadrant % 2) as f32 * w as f32 / 2.0,
                    (quadrant / 2) as f32 * h as f32 / 2.0,
                ];
                let uvs = CornerUvs::from_pixel_rect(
                    origin,
                    [w as f32 / 2.0, h as f32 / 2.0],
                    texture.size,
                );
                let sprite = texture
                    .sprite(transform, viewport)
                    .with_corner_uvs(uvs)
                    .with_tint([1.0, 1.0, 1.0, 0.85]);
                batch.push_sprite(&sprite, slot);
            }
            frame.draw_batch(batch);
        }

        // single sprites in front
        let centre = viewport / 2.0;
        let side = viewport.x.min(viewport.y) / 3.0;
        for (i, texture) in self.textures.iter().enumerate() {
            let offset = (i as f32 - (self.textures.len() as f32 - 1.0) / 2.0) * side * 1.1;
            let transform =
                SpriteTransform::centred(centre + Vector2::new(offset, 0.0), Vector2::new(side, side))
                    .with_rotation(Rad(seconds * ROTATION_SPEED * if i % 2 == 0 { 1.0 } else { -1.0 }));
            let mut uvs = CornerUvs::full();
            if i % 2 == 1 {
                uvs = uvs.flipped_horizontal();
            }
            let pulse = 0.75 + 0.25 * (seconds * BOB_SPEED).sin();
            frame.draw_sprite(
                texture
                    .sprite(&transform, viewport)
                    .with_corner_uvs(uvs)
                    .with_tint([pulse, pulse, 1.0, 1.0]),
            );
        }

        frame
    }
}

/// Evenly spaced grid cells filling the viewport, bobbing over time.
pub fn grid_transforms(
    columns: u32,
    rows: u32,
    viewport: Vector2<f32>,
    seconds: f32,
) -> Vec<SpriteTransform> {
    let cell = Vector2::new(viewport.x / columns as f32, viewport.y / rows as f32);
    let size = cell * 0.8;
    (0..rows)
        .flat_map(|row| {
            (0..columns).map(move |column| {
                let phase = (row * columns + column) as f32 * 0.3;
                let bob = (seconds * BOB_SPEED + phase).sin() * MAX_VERTICAL_OFFSET;
                let position = Vector2::new(
                    (column as f32 + 0.5) * cell.x,
                    (row as f32 + 0.5) * cell.y + bob,
                );
                SpriteTransform::centred(position, size).with_rotation(Deg(phase * 10.0).into())
            })
        })
        .collect()
}

/// A `size` x `size` checkerboard of `cells` x `cells` squares.
pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> RgbaImage {
    let cell = (size / cells.max(1)).max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba(a)
        } else {
            Rgba(b)
        }
    })
}

/// A colorful, opaque test image: red across, green down, blue along the diagonal.
pub fn gradient(size: u32) -> RgbaImage {
    let max = (size.max(2) - 1) as f32;
    RgbaImage::from_fn(size, size, |x, y| {
        let (u, v) = (x as f32 / max, y as f32 / max);
        Rgba([
            (u * 255.0) as u8,
            (v * 255.0) as u8,
            ((1.0 - (u + v) / 2.0) * 255.0) as u8,
            255,
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_alternates_cells() {
        let image = checkerboard(16, 4, [255; 4], [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [255; 4]);
        assert_eq!(image.get_pixel(4, 0).0, [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(4, 4).0, [255; 4]);
        assert_eq!(image.get_pixel(15, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn gradient_spans_the_channels() {
        let image = gradient(32);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);
        assert_eq!(image.get_pixel(31, 31).0, [255, 255, 0, 255]);
    }

    #[test]
    fn grid_covers_the_viewport() {
        let viewport = Vector2::new(1200.0, 600.0);
        let cells = grid_transforms(12, 6, viewport, 0.0);
        assert_eq!(cells.len(), 72);
        for cell in &cells {
            assert!(cell.position.x > 0.0 && cell.position.x < viewport.x);
            assert!(cell.size.x > 0.0 && cell.size.x < 100.0);
        }
        assert!((cells[0].position.x - 50.0).abs() < 1e-4);
        assert!((cells[1].position.x - 150.0).abs() < 1e-4);
    }
}
