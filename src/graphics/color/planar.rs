use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::graphics::color::ycbcr::{decode_planar, rgb_to_ycbcr, unscale_chroma};

/// A planar YCbCr image as it is laid out in a sprite texture.
///
/// The luma plane is full resolution with two 8-bit channels (Y, A) and becomes mip
/// level 0. The chroma plane is half resolution with two 8-bit channels (Cb, Cr) and
/// becomes mip level 1, so its size is always the level 1 size of the luma plane. An
/// image needs at least two texels along one axis for that level to exist.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanarImage {
    width: u32,
    height: u32,
    luma_alpha: Vec<u8>,
    chroma: Vec<u8>,
}

impl PlanarImage {
    /// Bytes per texel in either plane.
    pub const BYTES_PER_TEXEL: u32 = 2;
    /// Mip levels of the sprite texture a planar image is uploaded to.
    pub const MIP_LEVELS: u32 = 2;

    /// The size of the chroma plane for a luma plane of the given size.
    pub fn chroma_size(width: u32, height: u32) -> (u32, u32) {
        ((width >> 1).max(1), (height >> 1).max(1))
    }

    /// Byte length of a plane of the given size, or `None` if it does not fit in memory.
    pub fn plane_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(Self::BYTES_PER_TEXEL as usize)
    }

    /// Check that a luma plane of this size can carry a chroma mip level, returning the
    /// byte lengths of both planes.
    fn check_size(width: u32, height: u32) -> Result<(usize, usize), PlanarError> {
        if width == 0 || height == 0 {
            return Err(PlanarError::EmptyImage);
        }
        if width.max(height) < 2 {
            return Err(PlanarError::TooSmall { width, height });
        }
        let (cw, ch) = Self::chroma_size(width, height);
        match (Self::plane_len(width, height), Self::plane_len(cw, ch)) {
            (Some(luma), Some(chroma)) => Ok((luma, chroma)),
            _ => Err(PlanarError::TooLarge { width, height }),
        }
    }

    /// Wrap already encoded planes, checking their sizes.
    pub fn from_planes(
        width: u32,
        height: u32,
        luma_alpha: Vec<u8>,
        chroma: Vec<u8>,
    ) -> Result<Self, PlanarError> {
        let (expected, expected_chroma) = Self::check_size(width, height)?;
        if luma_alpha.len() != expected {
            return Err(PlanarError::PlaneSizeMismatch {
                plane: "luma_alpha",
                expected,
                actual: luma_alpha.len(),
            });
        }
        if chroma.len() != expected_chroma {
            return Err(PlanarError::PlaneSizeMismatch {
                plane: "chroma",
                expected: expected_chroma,
                actual: chroma.len(),
            });
        }
        Ok(Self {
            width,
            height,
            luma_alpha,
            chroma,
        })
    }

    /// Encode a straight RGBA image.
    ///
    /// Chroma is averaged over each 2x2 block of source pixels.
    pub fn encode(rgba: &RgbaImage) -> Result<Self, PlanarError> {
        let (width, height) = rgba.dimensions();
        let (luma_len, chroma_len) = Self::check_size(width, height)?;

        let mut luma_alpha = Vec::with_capacity(luma_len);
        for pixel in rgba.pixels() {
            let [y, _, _] = rgb_to_ycbcr(normalized_rgb(pixel));
            luma_alpha.push(to_unorm8(y));
            luma_alpha.push(pixel[3]);
        }

        let (cw, ch) = Self::chroma_size(width, height);
        let mut chroma = Vec::with_capacity(chroma_len);
        for cy in 0..ch {
            for cx in 0..cw {
                let mut sum = [0.0f32; 2];
                let mut count = 0.0;
                for y in (cy * 2)..(cy * 2 + 2).min(height) {
                    for x in (cx * 2)..(cx * 2 + 2).min(width) {
                        let [_, cb, cr] = rgb_to_ycbcr(normalized_rgb(rgba.get_pixel(x, y)));
                        sum[0] += cb;
                        sum[1] += cr;
                        count += 1.0;
                    }
                }
                let [cb, cr] = unscale_chroma([sum[0] / count, sum[1] / count]);
                chroma.push(to_unorm8(cb));
                chroma.push(to_unorm8(cr));
            }
        }

        Ok(Self {
            width,
            height,
            luma_alpha,
            chroma,
        })
    }

    /// Decode back into straight RGBA, nearest-sampling the chroma plane.
    pub fn decode(&self) -> RgbaImage {
        let (cw, ch) = Self::chroma_size(self.width, self.height);
        let texel = Self::BYTES_PER_TEXEL as usize;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let li = (y as usize * self.width as usize + x as usize) * texel;
            let ci = ((y / 2).min(ch - 1) as usize * cw as usize + (x / 2).min(cw - 1) as usize)
                * texel;
            let luma_alpha = [
                from_unorm8(self.luma_alpha[li]),
                from_unorm8(self.luma_alpha[li + 1]),
                0.0,
                0.0,
            ];
            let chroma = [
                from_unorm8(self.chroma[ci]),
                from_unorm8(self.chroma[ci + 1]),
                0.0,
                0.0,
            ];
            let rgba = decode_planar(luma_alpha, chroma);
            Rgba(rgba.map(to_unorm8))
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The level 0 plane, (Y, A) per texel.
    pub fn luma_alpha(&self) -> &[u8] {
        &self.luma_alpha
    }

    /// The level 1 plane, (Cb, Cr) per texel.
    pub fn chroma(&self) -> &[u8] {
        &self.chroma
    }
}

fn normalized_rgb(pixel: &Rgba<u8>) -> [f32; 3] {
    [
        from_unorm8(pixel[0]),
        from_unorm8(pixel[1]),
        from_unorm8(pixel[2]),
    ]
}

fn from_unorm8(value: u8) -> f32 {
    value as f32 / 255.0
}

fn to_unorm8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// An error from building planar images.
#[derive(Debug, Error, PartialEq)]
pub enum PlanarError {
    #[error("Planar images must be at least 1x1")]
    EmptyImage,
    #[error("A {width}x{height} planar image has no room for a chroma level, it needs at least 2x1 or 1x2")]
    TooSmall { width: u32, height: u32 },
    #[error("A {width}x{height} planar image is too large to address")]
    TooLarge { width: u32, height: u32 },
    #[error("The {plane} plane has {actual} bytes, expected {expected}")]
    PlaneSizeMismatch {
        plane: &'static str,
        expected: usize,
        actual: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_diff(a: u8, b: u8) -> u8 {
        a.abs_diff(b)
    }

    #[test]
    fn chroma_plane_is_the_next_mip_level() {
        assert_eq!(PlanarImage::chroma_size(64, 32), (32, 16));
        assert_eq!(PlanarImage::chroma_size(5, 3), (2, 1));
        assert_eq!(PlanarImage::chroma_size(1, 1), (1, 1));
    }

    #[test]
    fn encode_produces_planes_of_the_right_size() {
        let img = RgbaImage::from_pixel(6, 4, Rgba([10, 20, 30, 40]));
        let planar = PlanarImage::encode(&img).unwrap();
        assert_eq!(planar.luma_alpha().len(), 6 * 4 * 2);
        assert_eq!(planar.chroma().len(), 3 * 2 * 2);
    }

    #[test]
    fn gray_encodes_to_neutral_chroma() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([77, 77, 77, 255]));
        let planar = PlanarImage::encode(&img).unwrap();
        assert!(planar.chroma().iter().all(|&c| c == 128));
        assert!(planar.luma_alpha().chunks(2).all(|la| la == [77, 255]));
    }

    #[test]
    fn flat_color_round_trips_within_quantization() {
        let colors = [[255, 0, 0, 255], [12, 200, 90, 128], [40, 40, 220, 7]];
        for color in colors {
            let img = RgbaImage::from_pixel(4, 2, Rgba(color));
            let back = PlanarImage::encode(&img).unwrap().decode();
            for (src, dst) in img.pixels().zip(back.pixels()) {
                for c in 0..4 {
                    assert!(
                        channel_diff(src[c], dst[c]) <= 3,
                        "{color:?}: {src:?} -> {dst:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn from_planes_checks_sizes() {
        assert_eq!(
            PlanarImage::from_planes(4, 4, vec![0; 32], vec![0; 7]),
            Err(PlanarError::PlaneSizeMismatch {
                plane: "chroma",
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(
            PlanarImage::from_planes(0, 4, vec![], vec![]),
            Err(PlanarError::EmptyImage)
        );
        assert!(PlanarImage::from_planes(4, 4, vec![0; 32], vec![0; 8]).is_ok());
    }

    #[test]
    fn single_texel_images_have_no_chroma_level() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([200, 10, 10, 255]));
        assert_eq!(
            PlanarImage::encode(&img),
            Err(PlanarError::TooSmall {
                width: 1,
                height: 1
            })
        );
        assert_eq!(
            PlanarImage::from_planes(1, 1, vec![0; 2], vec![0; 2]),
            Err(PlanarError::TooSmall {
                width: 1,
                height: 1
            })
        );

        for (w, h) in [(2, 1), (1, 2)] {
            let img = RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255]));
            let planar = PlanarImage::encode(&img).unwrap();
            assert_eq!(PlanarImage::chroma_size(w, h), (1, 1));
            assert_eq!(planar.luma_alpha().len(), 4);
            assert_eq!(planar.chroma().len(), 2);
        }
    }

    #[test]
    fn accepted_sizes_fit_both_mip_levels() {
        // wgpu allows floor(log2(max(w, h))) + 1 levels
        let max_levels = |w: u32, h: u32| 32 - w.max(h).leading_zeros();
        for (w, h) in [(2, 1), (1, 2), (3, 3), (5, 1), (64, 32)] {
            let img = RgbaImage::from_pixel(w, h, Rgba([0, 0, 0, 255]));
            assert!(PlanarImage::encode(&img).is_ok());
            assert!(max_levels(w, h) >= PlanarImage::MIP_LEVELS, "{w}x{h}");
        }
        assert!(max_levels(1, 1) < PlanarImage::MIP_LEVELS);
    }

    #[test]
    fn huge_dimensions_are_rejected_without_overflow() {
        assert_eq!(PlanarImage::plane_len(u32::MAX, u32::MAX), None);
        assert_eq!(
            PlanarImage::from_planes(u32::MAX, u32::MAX, vec![], vec![]),
            Err(PlanarError::TooLarge {
                width: u32::MAX,
                height: u32::MAX
            })
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn plane_sizes_past_u32_are_computed_exactly() {
        assert_eq!(
            PlanarImage::plane_len(1 << 16, 1 << 15),
            Some((1usize << 31) * 2)
        );
        assert!(matches!(
            PlanarImage::from_planes(1 << 16, 1 << 15, vec![], vec![]),
            Err(PlanarError::PlaneSizeMismatch {
                plane: "luma_alpha",
                actual: 0,
                ..
            })
        ));
    }
}
