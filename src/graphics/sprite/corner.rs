use std::ops::{Index, IndexMut};

/// One of the four logical corners of a sprite quad.
///
/// The discriminant is the corner index carried by each quad vertex and the slot
/// in a [`CornerUvs`] table. This numbering is shared with the WGSL programs.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The corner for a vertex corner index, if it is in range.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u32 {
        self as u32
    }
}

/// A per-sprite texture coordinate for each quad corner.
///
/// The table is independent of geometry: flipping or rotating what a sprite shows
/// only permutes entries, the quad itself never changes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerUvs(pub [[f32; 2]; 4]);

impl CornerUvs {
    /// The whole texture, upright.
    pub fn full() -> Self {
        Self::from_rect([0.0, 0.0], [1.0, 1.0])
    }

    /// An upright axis-aligned rectangle in normalized texture space (top-left origin).
    pub fn from_rect(min: [f32; 2], max: [f32; 2]) -> Self {
        Self([
            [min[0], min[1]],
            [max[0], min[1]],
            [min[0], max[1]],
            [max[0], max[1]],
        ])
    }

    /// An atlas sub-rectangle given in texels.
    ///
    /// `origin` is the texel position of the rectangle's top-left corner.
    pub fn from_pixel_rect(origin: [f32; 2], size: [f32; 2], texture_size: [u32; 2]) -> Self {
        let (tw, th) = (texture_size[0] as f32, texture_size[1] as f32);
        Self::from_rect(
            [origin[0] / tw, origin[1] / th],
            [(origin[0] + size[0]) / tw, (origin[1] + size[1]) / th],
        )
    }

    /// Mirror left/right.
    pub fn flipped_horizontal(self) -> Self {
        let [tl, tr, bl, br] = self.0;
        Self([tr, tl, br, bl])
    }

    /// Mirror top/bottom.
    pub fn flipped_vertical(self) -> Self {
        let [tl, tr, bl, br] = self.0;
        Self([bl, br, tl, tr])
    }

    /// Rotate the shown image a quarter turn clockwise.
    pub fn rotated_cw(self) -> Self {
        let [tl, tr, bl, br] = self.0;
        Self([bl, tl, br, tr])
    }

    /// The table with each entry padded to a 16 byte stride, for uniform buffers.
    pub fn padded(&self) -> [[f32; 4]; 4] {
        self.0.map(|[u, v]| [u, v, 0.0, 0.0])
    }
}

impl Default for CornerUvs {
    fn default() -> Self {
        Self::full()
    }
}

impl Index<Corner> for CornerUvs {
    type Output = [f32; 2];

    fn index(&self, corner: Corner) -> &[f32; 2] {
        &self.0[corner as usize]
    }
}

impl IndexMut<Corner> for CornerUvs {
    fn index_mut(&mut self, corner: Corner) -> &mut [f32; 2] {
        &mut self.0[corner as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_indices_are_stable() {
        for (i, corner) in Corner::ALL.iter().enumerate() {
            assert_eq!(corner.index(), i as u32);
            assert_eq!(Corner::from_index(i as u32), Some(*corner));
        }
        assert_eq!(Corner::from_index(4), None);
    }

    #[test]
    fn full_table_maps_corners_to_texture_corners() {
        let uvs = CornerUvs::full();
        assert_eq!(uvs[Corner::TopLeft], [0.0, 0.0]);
        assert_eq!(uvs[Corner::TopRight], [1.0, 0.0]);
        assert_eq!(uvs[Corner::BottomLeft], [0.0, 1.0]);
        assert_eq!(uvs[Corner::BottomRight], [1.0, 1.0]);
    }

    #[test]
    fn pixel_rect_normalizes_by_texture_size() {
        let uvs = CornerUvs::from_pixel_rect([64.0, 32.0], [64.0, 96.0], [256, 128]);
        assert_eq!(uvs[Corner::TopLeft], [0.25, 0.25]);
        assert_eq!(uvs[Corner::BottomRight], [0.5, 1.0]);
    }

    #[test]
    fn flips_swap_entries() {
        let uvs = CornerUvs::full();
        let h = uvs.flipped_horizontal();
        assert_eq!(h[Corner::TopLeft], uvs[Corner::TopRight]);
        assert_eq!(h[Corner::BottomRight], uvs[Corner::BottomLeft]);
        let v = uvs.flipped_vertical();
        assert_eq!(v[Corner::TopLeft], uvs[Corner::BottomLeft]);
        assert_eq!(v[Corner::BottomRight], uvs[Corner::TopRight]);
        assert_eq!(uvs.flipped_horizontal().flipped_horizontal(), uvs);
    }

    #[test]
    fn four_quarter_turns_are_identity() {
        let uvs = CornerUvs::from_rect([0.1, 0.2], [0.3, 0.4]);
        let turned = uvs.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
        assert_eq!(turned, uvs);
        // two quarter turns are a flip on both axes
        assert_eq!(
            uvs.rotated_cw().rotated_cw(),
            uvs.flipped_horizontal().flipped_vertical()
        );
    }

    #[test]
    fn padded_keeps_uv_in_xy() {
        let padded = CornerUvs::from_rect([0.1, 0.2], [0.3, 0.4]).padded();
        assert_eq!(padded[3], [0.3, 0.4, 0.0, 0.0]);
    }
}
