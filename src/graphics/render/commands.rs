use crate::graphics::render::{assets::SpriteTextureId, instance_buffer::InstanceBufferRange};

/// A prepared draw: everything it needs is already staged for upload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpriteRenderCommand {
    /// One sprite with the single program, its record at `uniform_offset`.
    Single {
        texture: SpriteTextureId,
        uniform_offset: u32,
    },
    /// A batch with the batched program, its instances in `range`.
    Batch { range: InstanceBufferRange },
}
