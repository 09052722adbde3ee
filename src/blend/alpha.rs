//! Radial feathering weights.
//!
//! Each pixel gets weight
//!
//! ```text
//! w = 255 · max(0, 1 − (dx² + dy²) / r²)
//! ```
//!
//! where `(dx, dy)` is the offset from the image center `(width/2, height/2)`
//! and `r` the blend radius: full weight at the center, zero at and beyond `r`.

use rayon::prelude::*;

use super::image::PixelImage;

/// Maximum weight value (center of the mask).
pub const MAX_WEIGHT: f32 = 255.0;

/// Weight at offset `(dx, dy)` from the center for blend radius `r`.
///
/// A non-positive or non-finite radius gives zero weight everywhere.
pub fn radial_weight(dx: f32, dy: f32, blend_radius: f32) -> f32 {
    if !(blend_radius > 0.0 && blend_radius.is_finite()) {
        return 0.0;
    }
    let falloff = 1.0 - (dx * dx + dy * dy) / (blend_radius * blend_radius);
    MAX_WEIGHT * falloff.max(0.0)
}

/// Overwrite the weight channel of `img` with the radial mask. Color is untouched.
pub fn set_image_alpha(img: &mut PixelImage, blend_radius: f32) {
    let width = img.width();
    let cx = 0.5 * width as f32;
    let cy = 0.5 * img.height() as f32;
    let channels = img.channels();
    let wc = img.weight_channel();
    let row_len = img.row_len();
    if row_len == 0 {
        return;
    }

    img.as_raw_mut()
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let dy = y as f32 - cy;
            for (x, px) in row.chunks_exact_mut(channels).enumerate() {
                px[wc] = radial_weight(x as f32 - cx, dy, blend_radius);
            }
        });
}
