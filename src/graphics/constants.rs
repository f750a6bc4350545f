/// Capacity of the batched program's texture binding array.
pub const MAX_SPRITE_TEXTURES: u32 = 256;

pub const SPRITE_TEXTURE_BIND_GROUP_SLOT: u32 = 0;
pub const SPRITE_UNIFORM_BIND_GROUP_SLOT: u32 = 1;

pub const BATCH_TEXTURES_BIND_GROUP_SLOT: u32 = 0;

pub const VERTEX_BUFFER_SLOT: u32 = 0;
pub const INSTANCE_BUFFER_SLOT: u32 = 1;
pub const INDEX_BUFFER_FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;
