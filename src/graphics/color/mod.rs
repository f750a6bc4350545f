//! Color-space math for planar YCbCr sprite textures.

pub mod planar;
pub mod ycbcr;
