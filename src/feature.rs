//! Define a feature (an interest point located in one image) and the
//! correspondences between two feature sets.
//! Features and matches are produced upstream by detection and matching and are
//! treated as immutable inputs by the aligner.
//!

/// A 2D interest point in one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feature {
    /// Position in pixels along columns (image x-axis).
    /// Origin is the top-left corner of the image, +X points right.
    pub x: f64,
    /// Position in pixels along rows (image y-axis).
    /// Origin is the top-left corner of the image, +Y points down.
    pub y: f64,
    /// Stable 0-based identifier, `None` when the source data carried no id.
    pub id: Option<usize>,
}

impl Feature {
    /// Feature at `(x, y)` without an identifier.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, id: None }
    }

    /// Feature from source data that numbers features from 1.
    ///
    /// Any id `<= 0` is the source's "no id" marker and maps to `None`.
    pub fn from_one_based(x: f64, y: f64, id: i64) -> Self {
        Self {
            x,
            y,
            id: (id > 0).then(|| (id - 1) as usize),
        }
    }
}

/// Ordered features of one image. Position in the vector is the feature index.
pub type FeatureSet = Vec<Feature>;

/// Association from one feature of the first set to a feature of the second set.
///
/// `matches[i]` describes feature `i` of the first set. A match either points at
/// exactly one index of the second set or is explicitly unmatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureMatch {
    /// 0-based index into the second feature set, `None` if unmatched.
    pub target: Option<usize>,
}

impl FeatureMatch {
    /// Match pointing at feature `index` of the second set.
    pub fn to(index: usize) -> Self {
        Self {
            target: Some(index),
        }
    }

    /// Explicitly unmatched entry.
    pub fn unmatched() -> Self {
        Self { target: None }
    }

    /// Match from source data that refers to second-set features by 1-based id.
    ///
    /// Any id `<= 0` (the source uses `-1`) means unmatched.
    pub fn from_one_based(id: i64) -> Self {
        Self {
            target: (id > 0).then(|| (id - 1) as usize),
        }
    }

    /// `true` if this entry points at a feature.
    pub fn is_matched(&self) -> bool {
        self.target.is_some()
    }
}

/// Resolve the matched feature pairs that can actually be used.
///
/// Yields `(i, j)` with `i` an index into `f1` and `j` an index into `f2`, in
/// ascending `i`. Unmatched entries and targets outside `f2` are skipped.
pub(crate) fn valid_pairs<'a>(
    f1: &'a [Feature],
    f2: &'a [Feature],
    matches: &'a [FeatureMatch],
) -> impl Iterator<Item = (usize, usize)> + 'a {
    matches
        .iter()
        .take(f1.len())
        .enumerate()
        .filter_map(move |(i, m)| m.target.filter(|&j| j < f2.len()).map(|j| (i, j)))
}
