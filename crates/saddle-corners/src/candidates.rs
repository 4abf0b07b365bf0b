//! Candidate extraction from the cornerness map and non-maximum suppression.

use std::collections::HashSet;

use nalgebra::Point2;
use saddle_corners_core::FloatImage;

/// An integer or sub-pixel corner candidate with its cornerness score.
#[derive(Clone, Copy, Debug)]
pub struct CornerCandidate {
    pub position: Point2<f32>,
    pub score: f32,
}

/// Extract local maxima of the (smoothed) cornerness map above an absolute
/// threshold.
///
/// A window of `window` pixels slides with 50 % overlap; the maximum of
/// each window is registered once (overlapping windows find the same peak,
/// so a visited-coordinate set dedups by exact integer location).
pub fn extract_candidates(
    response: &FloatImage,
    window: usize,
    threshold: f32,
) -> Vec<CornerCandidate> {
    let mut candidates = Vec::new();
    if response.is_empty() || window == 0 {
        return candidates;
    }

    let stride = (window / 2).max(1);
    let mut visited: HashSet<(usize, usize)> = HashSet::new();

    let mut y0 = 0usize;
    while y0 < response.height {
        let y1 = (y0 + window).min(response.height);
        let mut x0 = 0usize;
        while x0 < response.width {
            let x1 = (x0 + window).min(response.width);

            let mut best = f32::NEG_INFINITY;
            let mut best_xy = (x0, y0);
            for y in y0..y1 {
                for x in x0..x1 {
                    let v = response.at(x, y);
                    if v > best {
                        best = v;
                        best_xy = (x, y);
                    }
                }
            }

            if best > threshold && visited.insert(best_xy) {
                candidates.push(CornerCandidate {
                    position: Point2::new(best_xy.0 as f32, best_xy.1 as f32),
                    score: best,
                });
            }
            x0 += stride;
        }
        y0 += stride;
    }
    candidates
}

/// Greedy non-maximum suppression.
///
/// Candidates are sorted by descending score; each accepted candidate
/// suppresses every weaker candidate within `min_dist` pixels (squared
/// distances compared). The returned list stays in descending-score order,
/// which later stages rely on for grid seeding.
pub fn non_max_suppression(
    mut candidates: Vec<CornerCandidate>,
    min_dist: f32,
) -> Vec<CornerCandidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let min_dist_sq = min_dist * min_dist;
    let mut suppressed = vec![false; candidates.len()];
    let mut accepted = Vec::new();

    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        accepted.push(candidates[i]);
        for j in i + 1..candidates.len() {
            if suppressed[j] {
                continue;
            }
            let d = candidates[i].position - candidates[j].position;
            if d.norm_squared() < min_dist_sq {
                suppressed[j] = true;
            }
        }
    }
    accepted
}
