//! Structure-tensor sub-pixel refinement.
//!
//! Around a saddle point the brightness gradient at every pixel is
//! perpendicular to the line joining that pixel to the saddle center, so
//! accumulating gradient outer products over a window and solving the
//! resulting 2×2 least-squares system snaps an integer candidate onto the
//! sub-pixel crossing.

use log::warn;
use nalgebra::{Matrix2, Point2, Vector2};
use saddle_corners_core::{sobel_x, sobel_y, FloatImage};

use crate::candidates::CornerCandidate;

const SINGULARITY_EPS: f64 = 1e-9;

/// Refined positions closer than this are the same saddle point.
const MERGE_DIST: f32 = 1.0;

/// Refine candidates to sub-pixel positions over `window`-sized patches.
///
/// Candidates whose window leaves the image, whose structure tensor is
/// singular, or whose refined offset diverges beyond `half + 1` pixels are
/// dropped entirely. Neighboring suppression survivors often converge onto
/// the same saddle; a candidate landing within [`MERGE_DIST`] of an
/// already-refined position is merged into it, keeping the earlier
/// (higher-scoring) one. Input ordering (descending score) is preserved.
pub fn refine_candidates(
    candidates: &[CornerCandidate],
    field: &FloatImage,
    window: usize,
) -> Vec<CornerCandidate> {
    let half = (window.max(1) - 1) / 2;
    if half == 0 {
        warn!("refinement window {window} too small, keeping integer candidates");
        return candidates.to_vec();
    }

    let dx = sobel_x(field);
    let dy = sobel_y(field);

    let mut refined = Vec::with_capacity(candidates.len());
    for cand in candidates {
        let cx = cand.position.x.round() as i64;
        let cy = cand.position.y.round() as i64;
        let h = half as i64;

        if cx - h < 0
            || cy - h < 0
            || cx + h >= field.width as i64
            || cy + h >= field.height as i64
        {
            continue; // window would leave the image
        }

        let Some(offset) = solve_patch(&dx, &dy, cx as usize, cy as usize, half) else {
            continue;
        };

        if offset.x.abs() > (half + 1) as f64 || offset.y.abs() > (half + 1) as f64 {
            continue; // refinement diverged
        }

        let position = Point2::new(
            cand.position.x.round() + offset.x as f32,
            cand.position.y.round() + offset.y as f32,
        );
        let duplicate = refined.iter().any(|kept: &CornerCandidate| {
            (kept.position - position).norm_squared() < MERGE_DIST * MERGE_DIST
        });
        if duplicate {
            continue;
        }

        refined.push(CornerCandidate {
            position,
            score: cand.score,
        });
    }
    refined
}

/// Solve the structure-tensor system over one window; returns the offset of
/// the saddle point from the window center as `(x, y)`.
fn solve_patch(
    dx: &FloatImage,
    dy: &FloatImage,
    cx: usize,
    cy: usize,
    half: usize,
) -> Option<Vector2<f64>> {
    let win = 2 * half + 1;
    let mut s = Matrix2::<f64>::zeros();
    let mut b = Vector2::<f64>::zeros();

    for r in 0..win {
        for c in 0..win {
            let x = cx - half + c;
            let y = cy - half + r;
            let gx = dx.at(x, y) as f64;
            let gy = dy.at(x, y) as f64;

            // per-pixel outer product [dy, dx]·[dy, dx]^T
            let m = Matrix2::new(gy * gy, gy * gx, gx * gy, gx * gx);
            s += m;
            b += m * Vector2::new(r as f64, c as f64);
        }
    }

    if s.determinant() < SINGULARITY_EPS {
        return None;
    }
    let p = s.try_inverse()? * b; // (row, col) within the window
    Some(Vector2::new(p.y - half as f64, p.x - half as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Supersampled checkerboard with saddle points at
    /// `(ox + i*pitch, oy + j*pitch)`. Every square edge passes through
    /// the saddles it joins, which is the gradient geometry the tensor
    /// solve assumes.
    fn render_checker(width: usize, height: usize, pitch: f32, ox: f32, oy: f32) -> FloatImage {
        let mut img = FloatImage::zeros(width, height);
        for y in 0..height {
            for x in 0..width {
                let mut acc = 0.0f32;
                for sy in 0..8 {
                    for sx in 0..8 {
                        let px = x as f32 + (sx as f32 + 0.5) / 8.0 - 0.5;
                        let py = y as f32 + (sy as f32 + 0.5) / 8.0 - 0.5;
                        let cx = ((px - ox) / pitch).floor() as i64;
                        let cy = ((py - oy) / pitch).floor() as i64;
                        if (cx + cy).rem_euclid(2) == 0 {
                            acc += 1.0;
                        }
                    }
                }
                img.set(x, y, acc / 64.0);
            }
        }
        img
    }

    #[test]
    fn recovers_subpixel_saddle_center() {
        // single interior saddle at (15.3, 14.6)
        let field = render_checker(31, 31, 15.0, 0.3, -0.4);
        let candidates = vec![CornerCandidate {
            position: Point2::new(15.0, 15.0),
            score: 1.0,
        }];

        let refined = refine_candidates(&candidates, &field, 11);
        assert_eq!(1, refined.len());
        assert_relative_eq!(15.3, refined[0].position.x, epsilon = 0.15);
        assert_relative_eq!(14.6, refined[0].position.y, epsilon = 0.15);
    }

    #[test]
    fn drops_candidate_near_border() {
        let field = render_checker(31, 31, 15.0, 0.3, -0.4);
        let candidates = vec![CornerCandidate {
            position: Point2::new(2.0, 2.0),
            score: 1.0,
        }];
        assert!(refine_candidates(&candidates, &field, 11).is_empty());
    }

    #[test]
    fn drops_candidate_on_flat_patch() {
        let field = FloatImage::zeros(31, 31); // zero gradients, singular tensor
        let candidates = vec![CornerCandidate {
            position: Point2::new(15.0, 15.0),
            score: 1.0,
        }];
        assert!(refine_candidates(&candidates, &field, 11).is_empty());
    }

    #[test]
    fn preserves_score_and_order() {
        // saddles at (20.5, 20.5) and (30.5, 30.5)
        let field = render_checker(41, 41, 10.0, 0.5, 0.5);
        let candidates = vec![
            CornerCandidate {
                position: Point2::new(20.0, 20.0),
                score: 0.9,
            },
            CornerCandidate {
                position: Point2::new(30.0, 30.0),
                score: 0.5,
            },
        ];
        let refined = refine_candidates(&candidates, &field, 9);
        assert_eq!(2, refined.len());
        assert_relative_eq!(0.9, refined[0].score);
        assert_relative_eq!(0.5, refined[1].score);
        assert!((refined[0].position - Point2::new(20.5, 20.5)).norm() < 0.2);
        assert!((refined[1].position - Point2::new(30.5, 30.5)).norm() < 0.2);
    }

    #[test]
    fn merges_candidates_converging_on_one_saddle() {
        // two suppression survivors around the saddle at (20.5, 20.5)
        let field = render_checker(41, 41, 10.0, 0.5, 0.5);
        let candidates = vec![
            CornerCandidate {
                position: Point2::new(20.0, 20.0),
                score: 0.9,
            },
            CornerCandidate {
                position: Point2::new(21.0, 21.0),
                score: 0.5,
            },
        ];
        let refined = refine_candidates(&candidates, &field, 9);
        assert_eq!(1, refined.len());
        assert_relative_eq!(0.9, refined[0].score);
        assert!((refined[0].position - Point2::new(20.5, 20.5)).norm() < 0.2);
    }
}
