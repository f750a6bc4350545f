use crate::graphics::sprite::{descriptor::Sprite, instance::SpriteInstance};

/// Sprites drawn together by the batched program, in draw order.
#[derive(Clone, Debug, Default)]
pub struct SpriteBatch {
    instances: Vec<SpriteInstance>,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    /// Add an already built instance record.
    pub fn push(&mut self, instance: SpriteInstance) {
        self.instances.push(instance);
    }

    /// Add a sprite whose texture sits at `texture_index` in the bound set.
    pub fn push_sprite(&mut self, sprite: &Sprite, texture_index: u32) {
        self.instances.push(sprite.to_instance(texture_index));
    }

    pub fn instances(&self) -> &[SpriteInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }
}

impl FromIterator<SpriteInstance> for SpriteBatch {
    fn from_iter<I: IntoIterator<Item = SpriteInstance>>(iter: I) -> Self {
        Self {
            instances: iter.into_iter().collect(),
        }
    }
}

/// One draw of a frame.
#[derive(Clone, Debug)]
pub enum FrameItem {
    /// Drawn with the single sprite program.
    Single(Sprite),
    /// Drawn with the batched program.
    Batch(SpriteBatch),
}

/// Everything to draw in one frame, in order. Later items are drawn over earlier ones.
#[derive(Clone, Debug, Default)]
pub struct SpriteFrame {
    items: Vec<FrameItem>,
}

impl SpriteFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw_sprite(&mut self, sprite: Sprite) {
        self.items.push(FrameItem::Single(sprite));
    }

    /// Queue a batch. Empty batches are skipped.
    pub fn draw_batch(&mut self, batch: SpriteBatch) {
        if !batch.is_empty() {
            self.items.push(FrameItem::Batch(batch));
        }
    }

    pub fn items(&self) -> &[FrameItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::render::assets::SpriteTextureId;
    use cgmath::{Matrix4, SquareMatrix};
    use slotmap::KeyData;

    fn sprite() -> Sprite {
        Sprite::new(SpriteTextureId::from(KeyData::from_ffi(1)), Matrix4::identity())
    }

    #[test]
    fn batch_keeps_insertion_order() {
        let mut batch = SpriteBatch::new();
        batch.push_sprite(&sprite(), 3);
        batch.push_sprite(&sprite().with_tint([0.0, 0.0, 0.0, 1.0]), 1);
        let indices: Vec<u32> = batch.instances().iter().map(|i| i.texture_index).collect();
        assert_eq!(indices, vec![3, 1]);
    }

    #[test]
    fn frame_skips_empty_batches() {
        let mut frame = SpriteFrame::new();
        frame.draw_batch(SpriteBatch::new());
        frame.draw_sprite(sprite());
        frame.draw_batch(SpriteBatch::from_iter([sprite().to_instance(0)]));
        assert_eq!(frame.items().len(), 2);
        assert!(matches!(frame.items()[0], FrameItem::Single(_)));
        assert!(matches!(frame.items()[1], FrameItem::Batch(ref b) if b.len() == 1));
    }
}
