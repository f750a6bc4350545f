pub mod color;
pub mod constants;
pub mod gpu;
pub mod render;
pub mod sprite;
pub mod textures;
