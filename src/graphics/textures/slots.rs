use thiserror::Error;

use crate::graphics::{constants::MAX_SPRITE_TEXTURES, sprite::instance::SpriteInstance};

/// A fixed-capacity table mapping small integer slots to textures.
///
/// Slot numbers are what batched sprite instances carry in `texture_index`. Freed slots are
/// reused lowest first, so indices stay dense.
#[derive(Clone, Debug)]
pub struct TextureSlots<T> {
    slots: Vec<Option<T>>,
    len: usize,
    capacity: u32,
}

impl<T> TextureSlots<T> {
    /// A table with room for every texture the batched program can bind.
    pub fn new() -> Self {
        Self::with_capacity(MAX_SPRITE_TEXTURES)
    }

    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            slots: Vec::new(),
            len: 0,
            capacity,
        }
    }

    /// Put `value` into the lowest free slot and return that slot.
    pub fn insert(&mut self, value: T) -> Result<u32, TextureSetError> {
        if let Some(slot) = self.slots.iter().position(Option::is_none) {
            self.slots[slot] = Some(value);
            self.len += 1;
            return Ok(slot as u32);
        }
        if self.slots.len() as u32 >= self.capacity {
            return Err(TextureSetError::Full {
                capacity: self.capacity,
            });
        }
        self.slots.push(Some(value));
        self.len += 1;
        Ok(self.slots.len() as u32 - 1)
    }

    /// Empty a slot, returning what was in it.
    pub fn remove(&mut self, slot: u32) -> Option<T> {
        let removed = self.slots.get_mut(slot as usize)?.take();
        if removed.is_some() {
            self.len -= 1;
            while matches!(self.slots.last(), Some(None)) {
                self.slots.pop();
            }
        }
        removed
    }

    /// Empty whichever slot holds `value`, returning that slot.
    pub fn remove_value(&mut self, value: &T) -> Option<u32>
    where
        T: PartialEq,
    {
        let slot = self.slot_of(value)?;
        self.remove(slot);
        Some(slot)
    }

    pub fn get(&self, slot: u32) -> Option<&T> {
        self.slots.get(slot as usize)?.as_ref()
    }

    /// The slot holding `value`, if any.
    pub fn slot_of(&self, value: &T) -> Option<u32>
    where
        T: PartialEq,
    {
        self.slots
            .iter()
            .position(|s| s.as_ref() == Some(value))
            .map(|slot| slot as u32)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Occupied slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.as_ref().map(|v| (slot as u32, v)))
    }

    /// Check that the instance at position `instance` may sample slot `index`.
    pub fn check_index(&self, instance: usize, index: u32) -> Result<(), TextureSetError> {
        if index >= self.capacity {
            return Err(TextureSetError::IndexOutOfRange {
                instance,
                index,
                capacity: self.capacity,
            });
        }
        if self.get(index).is_none() {
            return Err(TextureSetError::EmptySlot { instance, index });
        }
        Ok(())
    }

    /// Check every instance of a batch before it is uploaded.
    pub fn validate_instances(&self, instances: &[SpriteInstance]) -> Result<(), TextureSetError> {
        instances
            .iter()
            .enumerate()
            .try_for_each(|(i, instance)| self.check_index(i, instance.texture_index))
    }
}

impl<T> Default for TextureSlots<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// An error from the bound texture set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureSetError {
    #[error("The texture set is full (capacity {capacity})")]
    Full { capacity: u32 },
    #[error("Instance {instance} uses texture index {index}, but the set only has {capacity} slots")]
    IndexOutOfRange {
        instance: usize,
        index: u32,
        capacity: u32,
    },
    #[error("Instance {instance} uses texture index {index}, which holds no texture")]
    EmptySlot { instance: usize, index: u32 },
}
