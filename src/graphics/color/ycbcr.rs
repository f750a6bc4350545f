//! BT.709 YCbCr constants and the conversion math shared by the CPU reference
//! and the WGSL programs.
//!
//! The WGSL side never hardcodes these numbers; [`wgsl_prelude`] formats them
//! into the shader source so both sides always agree.

/// BT.709 red luma weight.
pub const KR: f32 = 0.2126;
/// BT.709 blue luma weight.
pub const KB: f32 = 0.0722;
/// BT.709 green luma weight.
pub const KG: f32 = 1.0 - KR - KB;

/// Multiplier applied to raw chroma texels before the bias is removed.
pub const CBCR_MULT: f32 = 256.0 / 255.0;
/// Bias removed from rescaled chroma texels.
///
/// An 8-bit chroma value of 128 lands exactly on this after scaling by [`CBCR_MULT`],
/// which makes it the neutral (zero) chroma point.
pub const CBCR_SUB: f32 = 128.50196 / 255.0;

/// The YCbCr -> RGB matrix, stored as columns.
///
/// Column `i` holds the weights of output channel `i`, so a row vector
/// `(Y, Cb, Cr)` times this matrix gives `(R, G, B)`. This is the same memory
/// layout as a WGSL `mat3x3<f32>`, which is what `ycbcr * YCBCR_TO_RGB` expects.
pub const YCBCR_TO_RGB: [[f32; 3]; 3] = [
    [1.0, 0.0, 2.0 * (1.0 - KR)],
    [
        1.0,
        -2.0 * KB * (1.0 - KB) / KG,
        -2.0 * KR * (1.0 - KR) / KG,
    ],
    [1.0, 2.0 * (1.0 - KB), 0.0],
];

/// Rescale a raw chroma pair sampled from the texture into signed chroma differences.
pub fn rescale_chroma(raw: [f32; 2]) -> [f32; 2] {
    [raw[0] * CBCR_MULT - CBCR_SUB, raw[1] * CBCR_MULT - CBCR_SUB]
}

/// Inverse of [`rescale_chroma`], used when encoding planes.
pub fn unscale_chroma(cbcr: [f32; 2]) -> [f32; 2] {
    [(cbcr[0] + CBCR_SUB) / CBCR_MULT, (cbcr[1] + CBCR_SUB) / CBCR_MULT]
}

/// `(Y, Cb, Cr) * YCBCR_TO_RGB`.
pub fn ycbcr_to_rgb(ycbcr: [f32; 3]) -> [f32; 3] {
    let dot = |col: &[f32; 3]| col[0] * ycbcr[0] + col[1] * ycbcr[1] + col[2] * ycbcr[2];
    [
        dot(&YCBCR_TO_RGB[0]),
        dot(&YCBCR_TO_RGB[1]),
        dot(&YCBCR_TO_RGB[2]),
    ]
}

/// Forward BT.709 encode with signed, zero-centred chroma.
pub fn rgb_to_ycbcr(rgb: [f32; 3]) -> [f32; 3] {
    let y = KR * rgb[0] + KG * rgb[1] + KB * rgb[2];
    let cb = (rgb[2] - y) / (2.0 * (1.0 - KB));
    let cr = (rgb[0] - y) / (2.0 * (1.0 - KR));
    [y, cb, cr]
}

/// Decode a pair of planar samples into straight RGBA.
///
/// `luma_alpha` is the level 0 sample (Y in x, alpha in y) and `chroma` the level 1
/// sample (Cb in x, Cr in y). Alpha comes from the luma plane only.
pub fn decode_planar(luma_alpha: [f32; 4], chroma: [f32; 4]) -> [f32; 4] {
    let [cb, cr] = rescale_chroma([chroma[0], chroma[1]]);
    let [r, g, b] = ycbcr_to_rgb([luma_alpha[0], cb, cr]);
    [r, g, b, luma_alpha[1]]
}

/// WGSL declarations of the color constants, prepended to every sprite program.
pub fn wgsl_prelude() -> String {
    let m = &YCBCR_TO_RGB;
    format!(
        "const KR: f32 = {KR:?};\n\
         const KB: f32 = {KB:?};\n\
         const KG: f32 = {KG:?};\n\
         const CBCR_MULT: f32 = {CBCR_MULT:?};\n\
         const CBCR_SUB: f32 = {CBCR_SUB:?};\n\
         const YCBCR_TO_RGB: mat3x3<f32> = mat3x3<f32>(\n    \
         vec3<f32>({:?}, {:?}, {:?}),\n    \
         vec3<f32>({:?}, {:?}, {:?}),\n    \
         vec3<f32>({:?}, {:?}, {:?})\n\
         );\n",
        m[0][0], m[0][1], m[0][2],
        m[1][0], m[1][1], m[1][2],
        m[2][0], m[2][1], m[2][2],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < EPS, "{a} != {b}");
    }

    #[test]
    fn luma_weights_sum_to_one() {
        assert_close(KR + KG + KB, 1.0);
        assert_close(KG, 0.7152);
    }

    #[test]
    fn white_luma_with_neutral_chroma_is_white() {
        for channel in ycbcr_to_rgb([1.0, 0.0, 0.0]) {
            assert_close(channel, 1.0);
        }
    }

    #[test]
    fn gray_survives_encode_then_decode() {
        for step in 0..=20 {
            let v = step as f32 / 20.0;
            let ycbcr = rgb_to_ycbcr([v, v, v]);
            assert_close(ycbcr[0], v);
            assert_close(ycbcr[1], 0.0);
            assert_close(ycbcr[2], 0.0);
            for channel in ycbcr_to_rgb(ycbcr) {
                assert_close(channel, v);
            }
        }
    }

    #[test]
    fn colors_survive_encode_then_decode() {
        let colors = [
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.25, 0.5, 0.75],
        ];
        for rgb in colors {
            let back = ycbcr_to_rgb(rgb_to_ycbcr(rgb));
            for (a, b) in rgb.iter().zip(back) {
                assert_close(*a, b);
            }
        }
    }

    #[test]
    fn neutral_chroma_texel_rescales_to_zero() {
        let neutral = 128.0 / 255.0;
        let [cb, cr] = rescale_chroma([neutral, neutral]);
        assert_close(cb, 0.0);
        assert_close(cr, 0.0);
        // the bias is the scaled 8-bit midpoint
        assert_close(CBCR_SUB, neutral * CBCR_MULT);
    }

    #[test]
    fn unscale_inverts_rescale() {
        let raw = [0.2, 0.9];
        let back = unscale_chroma(rescale_chroma(raw));
        assert_close(back[0], raw[0]);
        assert_close(back[1], raw[1]);
    }

    #[test]
    fn planar_decode_takes_alpha_from_luma_plane() {
        let neutral = 128.0 / 255.0;
        let rgba = decode_planar([1.0, 0.25, 0.0, 0.0], [neutral, neutral, 0.7, 0.3]);
        assert_close(rgba[0], 1.0);
        assert_close(rgba[1], 1.0);
        assert_close(rgba[2], 1.0);
        assert_close(rgba[3], 0.25);
    }

    #[test]
    fn prelude_declares_every_constant() {
        let prelude = wgsl_prelude();
        for name in ["KR", "KB", "KG", "CBCR_MULT", "CBCR_SUB", "YCBCR_TO_RGB"] {
            assert!(prelude.contains(&format!("const {name}")), "missing {name}");
        }
        assert!(prelude.contains(&format!("{CBCR_SUB:?}")));
        assert!(prelude.contains(&format!("{:?}", YCBCR_TO_RGB[1][1])));
    }
}
