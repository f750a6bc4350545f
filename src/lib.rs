//! 2D sprites on wgpu, with planar YCbCr textures decoded in the shader.
//!
//! Sprites draw one at a time through a per-draw uniform, or many at once through
//! per-instance attributes and a bound array of up to 256 textures.

pub mod app;
pub mod config;
pub mod demo;
pub mod graphics;
pub mod state;

pub use config::RendererConfig;
pub use graphics::{
    color::planar::PlanarImage,
    render::{
        assets::{SpriteTextureId, SpriteTextureStore},
        frame::{SpriteBatch, SpriteFrame},
        renderer::{RenderError, RenderResult, Renderer},
    },
    sprite::{corner::CornerUvs, descriptor::Sprite, transform::SpriteTransform},
};
