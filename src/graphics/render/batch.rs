use crate::graphics::{
    constants::{BATCH_TEXTURES_BIND_GROUP_SLOT, INSTANCE_BUFFER_SLOT},
    gpu::{GpuContext, bind_group::GpuBindGroup, pipeline::GpuPipeline, shader::GpuShader},
    render::{
        assets::SpriteTextureStore,
        frame::SpriteBatch,
        instance_buffer::{InstanceBuffer, InstanceBufferRange},
    },
    sprite::{instance::SpriteInstance, quad::QuadVertex},
    textures::{
        set::SpriteTextureSet,
        slots::{TextureSetError, TextureSlots},
    },
};

const SPRITE_BATCH_WGSL: &str = include_str!("../shaders/sprite_batch.wgsl");

/// The batched sprite program: one instanced draw per batch, each instance picking its
/// texture from the bound set.
pub struct BatchPipeline {
    pipeline: GpuPipeline,
    instances: InstanceBuffer<SpriteInstance>,
}

impl BatchPipeline {
    pub fn new(
        gpu: GpuContext,
        target_format: wgpu::TextureFormat,
        texture_set_layout: &wgpu::BindGroupLayout,
        capacity: u64,
    ) -> Self {
        let shader = GpuShader::create_sprite(&gpu, "sprite_batch_shader", SPRITE_BATCH_WGSL);
        let pipeline = GpuPipeline::create_sprite(
            "sprite_batch_pipeline",
            &gpu,
            target_format,
            &[texture_set_layout],
            &[QuadVertex::desc(), SpriteInstance::desc()],
            &shader,
        );
        let instances = InstanceBuffer::new(gpu, "sprite_instances".into(), capacity);
        log::info!("Created batched sprite pipeline");
        Self {
            pipeline,
            instances,
        }
    }

    /// Drop the staged instances (ie for a new frame).
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Validate a batch against the bound set and stage its instances.
    ///
    /// Nothing is staged if any instance names a slot outside the set or an empty one.
    pub fn prepare(
        &mut self,
        batch: &SpriteBatch,
        set: &SpriteTextureSet,
        store: &SpriteTextureStore,
    ) -> Result<InstanceBufferRange, TextureSetError> {
        set.slots().validate_instances(batch.instances())?;
        let mismatched = decode_path_mismatches(batch.instances(), set.slots(), |id| {
            store.get(*id).map(|texture| texture.is_planar())
        });
        if mismatched > 0 {
            log::warn!(
                "{mismatched} of {} batched sprites have a YCbCr flag that doesn't match their texture",
                batch.len()
            );
        }
        Ok(self.instances.add(batch.instances()))
    }

    /// Write every staged instance to the GPU.
    pub fn write(&self) {
        self.instances.write();
    }

    /// Record a batch's draw. The quad buffers must already be bound.
    pub fn draw(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        texture_set: &GpuBindGroup,
        range: InstanceBufferRange,
        num_indices: u32,
    ) {
        render_pass.set_pipeline(self.pipeline.handle());
        render_pass.set_bind_group(BATCH_TEXTURES_BIND_GROUP_SLOT, texture_set.handle(), &[]);
        render_pass.set_vertex_buffer(INSTANCE_BUFFER_SLOT, self.instances.slice(range));
        render_pass.draw_indexed(0..num_indices, 0, 0..range.len());
    }
}

/// Count instances whose decode flag disagrees with the texture in their slot.
///
/// `is_planar` looks up whether a slot's texture is planar; slots it can't resolve are
/// not counted.
pub fn decode_path_mismatches<T>(
    instances: &[SpriteInstance],
    slots: &TextureSlots<T>,
    is_planar: impl Fn(&T) -> Option<bool>,
) -> usize {
    instances
        .iter()
        .filter(|instance| {
            slots
                .get(instance.texture_index)
                .and_then(&is_planar)
                .is_some_and(|planar| planar != (instance.is_ycbcr != 0))
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{constants::MAX_SPRITE_TEXTURES, gpu::shader::validate_wgsl};

    fn instance(texture_index: u32, is_ycbcr: u32) -> SpriteInstance {
        SpriteInstance {
            matrix: [[0.0; 4]; 4],
            uv_top_left: [0.0; 2],
            uv_top_right: [0.0; 2],
            uv_bottom_left: [0.0; 2],
            uv_bottom_right: [0.0; 2],
            color: [1.0; 4],
            texture_index,
            is_ycbcr,
        }
    }

    #[test]
    fn counts_flags_that_disagree_with_the_texture() {
        let mut slots = TextureSlots::new();
        slots.insert(false).unwrap();
        slots.insert(true).unwrap();
        let instances = [
            instance(0, 0),
            instance(1, 1),
            instance(0, 1),
            instance(1, 0),
            instance(9, 1),
        ];
        assert_eq!(decode_path_mismatches(&instances, &slots, |p| Some(*p)), 2);
    }

    #[test]
    fn assembled_shader_validates() {
        validate_wgsl(&GpuShader::sprite_source(SPRITE_BATCH_WGSL));
    }

    #[test]
    fn shader_binds_every_slot() {
        let source = GpuShader::sprite_source(SPRITE_BATCH_WGSL);
        assert!(source.contains(&format!(
            "const MAX_SPRITE_TEXTURES: u32 = {MAX_SPRITE_TEXTURES}u;"
        )));
        assert!(source.contains("binding_array<texture_2d<f32>, MAX_SPRITE_TEXTURES>"));
    }

    #[test]
    fn shader_instance_locations_match_the_record() {
        let source = GpuShader::sprite_source(SPRITE_BATCH_WGSL);
        for attribute in SpriteInstance::desc().attributes {
            assert!(
                source.contains(&format!("@location({})", attribute.shader_location)),
                "location {} is not declared",
                attribute.shader_location
            );
        }
        assert!(source.contains("@location(11) texture_index: u32"));
        assert!(source.contains("@location(12) is_ycbcr: u32"));
    }
}
