//! Sprite data as the two sprite programs consume it.
//!
//! [`descriptor::Sprite`] is what the host builds each frame. It lowers into a
//! [`uniform::SpriteUniform`] for single draws or a [`instance::SpriteInstance`] for
//! batched draws; [`shading`] runs the programs' math on the CPU.

pub mod corner;
pub mod descriptor;
pub mod instance;
pub mod quad;
pub mod shading;
pub mod transform;
pub mod uniform;
