//! Detection orchestration.

use log::{debug, warn};
use nalgebra::Point2;
use saddle_corners_core::{gaussian_blur, FloatImage, GrayImageView};
use serde::{Deserialize, Serialize};

use crate::candidates::{extract_candidates, non_max_suppression};
use crate::error::DetectError;
use crate::grid::reconstruct_grid;
use crate::normalize::normalize_image;
use crate::params::{DetectorParams, GridShape, ACCEPTANCE_THRESHOLD, REJECTION_SCORE};
use crate::refine::refine_candidates;
use crate::response::{corner_response, radii_for_winsize};
use crate::score::grid_defect_score;
use crate::trim::trim_to_textured_region;

/// Candidate-pool margins over `rows * cols` tried for grid reconstruction.
const POOL_MARGINS: [usize; 2] = [10, 20];

/// Result of one detection call.
///
/// `corners` is either empty or exactly `rows * cols` sub-pixel points in
/// row-major order. The score is a defect measure, lower is better; any
/// score at or above [`REJECTION_SCORE`] means nothing usable was found.
/// A reconstructed-but-warped grid is reported with its real score and its
/// corners so callers can distinguish "noisy board" from "no structure";
/// such corners must still be discarded unless [`is_accepted`] holds.
///
/// [`is_accepted`]: CheckerboardDetection::is_accepted
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckerboardDetection {
    pub score: f32,
    pub corners: Vec<Point2<f32>>,
}

impl CheckerboardDetection {
    pub fn is_accepted(&self) -> bool {
        self.score < ACCEPTANCE_THRESHOLD && !self.corners.is_empty()
    }

    fn rejection() -> Self {
        Self {
            score: REJECTION_SCORE,
            corners: Vec::new(),
        }
    }
}

/// Detect an interior checkerboard corner grid in an 8-bit grayscale image.
///
/// Fails fast with [`DetectError`] on malformed inputs; an image without a
/// usable board is *not* an error and comes back as a rejection score with
/// empty corners.
pub fn detect_checkerboard(
    image: &GrayImageView<'_>,
    shape: GridShape,
    params: &DetectorParams,
) -> Result<CheckerboardDetection, DetectError> {
    if image.is_empty() {
        return Err(DetectError::EmptyImage);
    }
    let expected = image.width * image.height;
    if image.data.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: image.data.len(),
        });
    }
    detect_checkerboard_field(&FloatImage::from_gray(image), shape, params)
}

/// [`detect_checkerboard`] over an already-converted float field on the
/// `[0, 255]` scale.
pub fn detect_checkerboard_field(
    gray: &FloatImage,
    shape: GridShape,
    params: &DetectorParams,
) -> Result<CheckerboardDetection, DetectError> {
    if gray.is_empty() {
        return Err(DetectError::EmptyImage);
    }
    if shape.rows == 0 || shape.cols == 0 {
        return Err(DetectError::InvalidGridShape {
            rows: shape.rows,
            cols: shape.cols,
        });
    }

    let (cropped, offset) = if params.trim {
        match trim_to_textured_region(gray) {
            Some((cropped, offset)) => (Some(cropped), offset),
            None => (None, (0, 0)),
        }
    } else {
        (None, (0, 0))
    };
    let work = cropped.as_ref().unwrap_or(gray);

    let mut detection = run_pipeline(work, shape, params);
    if offset != (0, 0) {
        for p in &mut detection.corners {
            p.x += offset.0 as f32;
            p.y += offset.1 as f32;
        }
    }
    Ok(detection)
}

fn run_pipeline(
    gray: &FloatImage,
    shape: GridShape,
    params: &DetectorParams,
) -> CheckerboardDetection {
    let expected = shape.corner_count();
    let window = params.winsize + 2;

    let normalized = normalize_image(gray);
    let radii = radii_for_winsize(params.winsize);
    debug!(
        "detecting {}x{} grid in {}x{} field, template radii {radii:?}",
        shape.rows, shape.cols, gray.width, gray.height
    );

    let response = gaussian_blur(&corner_response(&normalized, &radii), 3, 3.0);
    let Some((_, peak)) = response.min_max() else {
        return CheckerboardDetection::rejection();
    };
    if peak <= 0.0 {
        warn!("cornerness response has no positive peak");
        return CheckerboardDetection::rejection();
    }

    let candidates =
        extract_candidates(&response, window, params.candidate_threshold_rel * peak);
    debug!("{} candidates above threshold", candidates.len());
    if candidates.len() < expected {
        warn!("{} candidates, need {expected}", candidates.len());
        return CheckerboardDetection::rejection();
    }

    let min_spacing = (params.winsize.saturating_sub(2) as f32).max(1.0);
    let spaced = non_max_suppression(candidates, min_spacing);
    debug!("{} candidates after non-maximum suppression", spaced.len());
    if spaced.len() < expected {
        warn!("{} candidates after suppression, need {expected}", spaced.len());
        return CheckerboardDetection::rejection();
    }

    let refined = refine_candidates(&spaced, &normalized, window);
    debug!("{} candidates refined to sub-pixel positions", refined.len());
    if refined.len() < expected {
        warn!("{} refined candidates, need {expected}", refined.len());
        return CheckerboardDetection::rejection();
    }

    let mut grid = None;
    for margin in POOL_MARGINS {
        let pool = &refined[..refined.len().min(expected + margin)];
        grid = reconstruct_grid(pool, &normalized, shape, params.edge_score_threshold);
        if grid.is_some() {
            break;
        }
    }
    let Some(grid) = grid else {
        return CheckerboardDetection::rejection();
    };

    let score = grid_defect_score(&grid.corners, shape);
    if score >= params.acceptance_threshold {
        warn!("grid reconstructed but defect score {score:.3} is above threshold");
    } else {
        debug!(
            "grid accepted, defect score {score:.3}, max snap distance² {:.2}",
            grid.max_snap_dist_sq
        );
    }
    CheckerboardDetection {
        score,
        corners: grid.corners,
    }
}

/// Detect over a batch of independent images in parallel.
///
/// Results are returned positionally; one image failing validation does not
/// affect the others.
#[cfg(feature = "rayon")]
pub fn detect_checkerboard_batch(
    images: &[GrayImageView<'_>],
    shape: GridShape,
    params: &DetectorParams,
) -> Vec<Result<CheckerboardDetection, DetectError>> {
    use rayon::prelude::*;

    images
        .par_iter()
        .map(|image| detect_checkerboard(image, shape, params))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: GridShape = GridShape { rows: 3, cols: 4 };

    fn blank(width: usize, height: usize) -> Vec<u8> {
        vec![128u8; width * height]
    }

    #[test]
    fn empty_image_is_an_error() {
        let view = GrayImageView {
            width: 0,
            height: 0,
            data: &[],
        };
        let err = detect_checkerboard(&view, SHAPE, &DetectorParams::default());
        assert!(matches!(err, Err(DetectError::EmptyImage)));
    }

    #[test]
    fn zero_grid_shape_is_an_error() {
        let pixels = blank(64, 48);
        let view = GrayImageView {
            width: 64,
            height: 48,
            data: &pixels,
        };
        let shape = GridShape { rows: 0, cols: 4 };
        let err = detect_checkerboard(&view, shape, &DetectorParams::default());
        assert!(matches!(
            err,
            Err(DetectError::InvalidGridShape { rows: 0, cols: 4 })
        ));
    }

    #[test]
    fn blank_image_is_a_rejection_not_an_error() {
        let pixels = blank(96, 72);
        let view = GrayImageView {
            width: 96,
            height: 72,
            data: &pixels,
        };
        let det = detect_checkerboard(&view, SHAPE, &DetectorParams::default()).unwrap();
        assert!(det.corners.is_empty());
        assert!(det.score >= REJECTION_SCORE);
        assert!(!det.is_accepted());
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn batch_results_are_positional() {
        let pixels = blank(96, 72);
        let good = GrayImageView {
            width: 96,
            height: 72,
            data: &pixels,
        };
        let bad = GrayImageView {
            width: 0,
            height: 0,
            data: &[],
        };

        let results =
            detect_checkerboard_batch(&[good, bad, good], SHAPE, &DetectorParams::default());
        assert_eq!(3, results.len());
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
