//! Grid quality scoring via local non-collinearity.

use nalgebra::Point2;

use crate::params::GridShape;
use crate::params::REJECTION_SCORE;

/// Maximum local defect over all interior row and column triples.
///
/// For each interior point the defect is `‖(prev + next) − 2·curr‖ /
/// ‖next − prev‖`: zero for a straight, evenly spaced triple and large for
/// kinks or mis-ordered points. A degenerate triple (`prev ≈ next`) scores
/// an immediate 1.0, as does a corner list of the wrong length.
pub fn grid_defect_score(corners: &[Point2<f32>], shape: GridShape) -> f32 {
    if corners.len() != shape.corner_count() {
        return REJECTION_SCORE;
    }

    let at = |r: usize, c: usize| corners[r * shape.cols + c];
    let mut worst = 0.0f32;

    let mut check = |prev: Point2<f32>, curr: Point2<f32>, next: Point2<f32>| -> Option<()> {
        let top = (prev.coords + next.coords - 2.0 * curr.coords).norm();
        let bot = (next - prev).norm();
        if bot < 1e-9 {
            return None; // coincident endpoints, degenerate grid
        }
        worst = worst.max(top / bot);
        Some(())
    };

    for r in 0..shape.rows {
        for c in 1..shape.cols.saturating_sub(1) {
            if check(at(r, c - 1), at(r, c), at(r, c + 1)).is_none() {
                return REJECTION_SCORE;
            }
        }
    }
    for c in 0..shape.cols {
        for r in 1..shape.rows.saturating_sub(1) {
            if check(at(r - 1, c), at(r, c), at(r + 1, c)).is_none() {
                return REJECTION_SCORE;
            }
        }
    }
    worst
}
