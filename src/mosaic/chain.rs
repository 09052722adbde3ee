//! Place a sequence of images in the mosaic frame from pairwise alignments.
//!
//! Image 0 defines the mosaic frame. Alignment `i` maps rays of image `i` to
//! rays of image `i + 1`, so the pose of image `i + 1` is the pose of image `i`
//! followed by that rotation. A failed link breaks the chain: the image it
//! would have placed and every image after it are reported as skipped.

use anyhow::{ensure, Result};
use tracing::warn;

use crate::align::AlignResult;
use crate::blend::PixelImage;
use crate::transform::Transform;

use super::{ImagePosition, SkipReason, SkippedImage};

/// Images that received a pose, plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct ChainedPositions {
    pub positions: Vec<ImagePosition>,
    /// Input index of each entry in `positions`.
    pub indices: Vec<usize>,
    pub skipped: Vec<SkippedImage>,
}

/// Compose `links` (one per consecutive image pair) into mosaic-frame poses.
///
/// Fails if `links.len() + 1 != images.len()` for a non-empty image list.
pub fn positions_from_chain(
    images: Vec<PixelImage>,
    links: &[AlignResult],
) -> Result<ChainedPositions> {
    let mut out = ChainedPositions::default();
    if images.is_empty() {
        ensure!(
            links.is_empty(),
            "{} alignments given for zero images",
            links.len()
        );
        return Ok(out);
    }
    ensure!(
        links.len() + 1 == images.len(),
        "Expected {} pairwise alignments for {} images, got {}",
        images.len() - 1,
        images.len(),
        links.len()
    );

    let mut pose = Some(Transform::identity());
    for (index, image) in images.into_iter().enumerate() {
        if index > 0 {
            let link = &links[index - 1];
            pose = match (pose, link.transform.as_ref()) {
                (Some(prev), Some(m)) if link.is_aligned() => Some(prev.then(m)),
                (Some(_), _) => {
                    warn!(
                        "Alignment {} -> {} failed ({:?}); images from {} on are left out",
                        index - 1,
                        index,
                        link.status,
                        index
                    );
                    out.skipped.push(SkippedImage {
                        index,
                        reason: SkipReason::AlignmentFailed(link.status),
                    });
                    None
                }
                (None, _) => {
                    out.skipped.push(SkippedImage {
                        index,
                        reason: SkipReason::Unanchored,
                    });
                    None
                }
            };
        }
        if let Some(transform) = pose {
            out.positions.push(ImagePosition::new(image, transform));
            out.indices.push(index);
        }
    }
    Ok(out)
}
