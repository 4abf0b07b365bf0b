//! Sub-pixel checkerboard corner detector.
//!
//! Given a grayscale image and the expected interior grid shape, the
//! detector returns a row-major ordered list of sub-pixel corner positions
//! plus a grid-defect score (lower is better). It is built from first
//! principles rather than wrapping a calibration library:
//!
//! 1. Local contrast normalization of the input image.
//! 2. Correlation against a ten-orientation bank of quadrant templates,
//!    fused into a single cornerness map.
//! 3. Sliding-window candidate extraction + non-maximum suppression.
//! 4. Structure-tensor sub-pixel refinement of each candidate.
//! 5. Topological grid reconstruction: lattice axes from the seed corner's
//!    neighborhood, then row-major snapping via nearest-neighbor search.
//! 6. Non-collinearity quality scoring with an accept/reject policy.
//!
//! Detection failure is an expected outcome and is reported as data
//! (score ≥ 1.0 with empty corners), never as an error. Errors are
//! reserved for malformed inputs.
//!
//! ## Quickstart
//!
//! ```
//! use saddle_corners::{detect_checkerboard, DetectorParams, GridShape};
//! use saddle_corners_core::GrayImageView;
//!
//! let pixels = vec![128u8; 64 * 48];
//! let view = GrayImageView { width: 64, height: 48, data: &pixels };
//! let shape = GridShape { rows: 4, cols: 5 };
//!
//! let detection = detect_checkerboard(&view, shape, &DetectorParams::default()).unwrap();
//! assert!(detection.corners.is_empty()); // a blank image has no board
//! assert!(detection.score >= 1.0);
//! ```
//!
//! ## Ordering contract
//!
//! On success `corners` holds exactly `rows * cols` points indexed
//! `r * cols + c`, with `r` along the slow lattice axis and `c` along the
//! fast one. Callers must generate their 3-D object points in the same
//! row-major order.

mod candidates;
mod detect;
mod error;
#[cfg(feature = "image")]
mod facade;
mod grid;
mod nn;
mod normalize;
mod params;
mod refine;
mod response;
mod score;
mod template;
mod trim;

pub use candidates::{extract_candidates, non_max_suppression, CornerCandidate};
pub use detect::{detect_checkerboard, detect_checkerboard_field, CheckerboardDetection};
pub use error::DetectError;
#[cfg(feature = "image")]
pub use facade::{
    detect_checkerboard_dynamic, detect_checkerboard_image, gray_image_from_slice, gray_view,
};
pub use grid::{reconstruct_grid, AxisRole, ReconstructedGrid};
pub use nn::{BruteForceIndex, KdTreeIndex, NearestNeighborIndex};
pub use normalize::normalize_image;
pub use params::{DetectorParams, GridShape, ACCEPTANCE_THRESHOLD, REJECTION_SCORE};
pub use refine::refine_candidates;
pub use response::{corner_response, radii_for_winsize, Polarity};
pub use score::grid_defect_score;
pub use template::{build_template, CorrelationTemplate, SectorKernel, TEMPLATE_ANGLE_PAIRS};
pub use trim::trim_to_textured_region;

#[cfg(feature = "rayon")]
pub use detect::detect_checkerboard_batch;
