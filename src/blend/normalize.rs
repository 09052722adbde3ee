//! Convert accumulated sums into final pixel colors.

use rayon::prelude::*;

use super::accumulate::AccumulationBuffer;
use super::alpha::MAX_WEIGHT;
use super::image::PixelImage;

/// Divide each accumulated color by the accumulated weight (scaled back from
/// the 0–255 range).
///
/// Pixels with no accumulated weight are not covered by any source image; they
/// come out transparent black (color 0, weight 0). Covered pixels get weight 255.
pub fn normalize_blend(acc: &AccumulationBuffer) -> PixelImage {
    let sums = acc.sums();
    let mut out = PixelImage::new(sums.shape());
    let channels = sums.channels();
    let wc = sums.weight_channel();
    let row_len = sums.row_len();
    if row_len == 0 {
        return out;
    }

    out.as_raw_mut()
        .par_chunks_mut(row_len)
        .zip(sums.as_raw().par_chunks(row_len))
        .for_each(|(out_row, acc_row)| {
            for (o, a) in out_row
                .chunks_exact_mut(channels)
                .zip(acc_row.chunks_exact(channels))
            {
                let total = a[wc] / MAX_WEIGHT;
                if total > 0.0 && total.is_finite() {
                    for c in 0..wc {
                        o[c] = a[c] / total;
                    }
                    o[wc] = MAX_WEIGHT;
                }
            }
        });
    out
}

/// Fraction of canvas pixels covered by at least one source image.
pub fn coverage(acc: &AccumulationBuffer) -> f64 {
    let sums = acc.sums();
    let n = sums.shape().num_pixels();
    if n == 0 {
        return 0.0;
    }
    let wc = sums.weight_channel();
    let covered = sums
        .as_raw()
        .par_chunks(sums.channels())
        .filter(|p| p[wc] > 0.0)
        .count();
    covered as f64 / n as f64
}
