//! Topological grid reconstruction.
//!
//! Starting from the candidate nearest the cloud centroid, the two lattice
//! axis vectors are recovered from the seed's neighborhood: a neighbor
//! direction is an axis candidate when the image gradient integrated along
//! the connecting segment is strong (adjacent corners are joined by a
//! black/white square edge; diagonal neighbors are not). The full grid is
//! then grown by predicting every `(r, c)` position from an origin corner
//! and snapping each prediction onto its nearest candidate.

use std::collections::HashSet;

use log::{debug, warn};
use nalgebra::{Point2, Vector2};
use saddle_corners_core::{gradient_magnitude, sobel_x, sobel_y, FloatImage};

use crate::candidates::CornerCandidate;
use crate::nn::{build_index, NearestNeighborIndex};
use crate::params::GridShape;

/// Which recovered axis plays the fast (column) role.
///
/// The seed neighborhood fixes the two axis directions but not which one
/// advances along `cols`; both assignments are evaluated exhaustively and
/// the better-fitting grid wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisRole {
    Ax1Fast,
    Ax2Fast,
}

impl AxisRole {
    pub const BOTH: [AxisRole; 2] = [AxisRole::Ax1Fast, AxisRole::Ax2Fast];
}

/// A successfully reconstructed row-major grid.
#[derive(Clone, Debug)]
pub struct ReconstructedGrid {
    /// `rows * cols` corner positions, index `r * cols + c`.
    pub corners: Vec<Point2<f32>>,
    /// Largest squared distance between a predicted lattice position and
    /// the candidate it snapped to.
    pub max_snap_dist_sq: f32,
}

/// Fraction of the current axis kept when blending in the observed
/// neighbor offset during local axis refinement.
const AXIS_BLEND: f32 = 0.6;

/// Neighbor directions shorter than this cannot define a lattice axis.
/// Sub-pixel refinement can leave near-coincident candidates around one
/// saddle; their direction carries no lattice information.
const MIN_AXIS_LEN: f32 = 2.0;

/// Reconstruct a `rows × cols` grid from refined candidates.
///
/// Returns `None` when too few candidates are available, no axis pair
/// survives the edge-strength threshold, or the winning grid does not
/// cover `rows * cols` distinct candidates.
pub fn reconstruct_grid(
    candidates: &[CornerCandidate],
    field: &FloatImage,
    shape: GridShape,
    edge_score_threshold: f32,
) -> Option<ReconstructedGrid> {
    let expected = shape.corner_count();
    if candidates.len() < expected {
        warn!(
            "grid reconstruction needs {expected} candidates, got {}",
            candidates.len()
        );
        return None;
    }

    let positions: Vec<Point2<f32>> = candidates.iter().map(|c| c.position).collect();
    let index = build_index(&positions);

    // Seed: the candidate nearest the centroid sits well inside the board.
    let centroid = centroid(&positions);
    let seed_ix = index.query(centroid, 1).first()?.0;

    let (ax1, ax2) = estimate_axes(&positions, &*index, seed_ix, field, edge_score_threshold)?;
    debug!("lattice axes ax1=({:.2}, {:.2}) ax2=({:.2}, {:.2})", ax1.x, ax1.y, ax2.x, ax2.y);

    // Candidate origins: the two extreme corners along ax1 + ax2.
    let sum_axis = ax1 + ax2;
    let mut by_projection: Vec<usize> = (0..positions.len()).collect();
    by_projection.sort_by(|&a, &b| {
        let pa = positions[a].coords.dot(&sum_axis);
        let pb = positions[b].coords.dot(&sum_axis);
        pa.total_cmp(&pb)
    });
    let origins = &by_projection[..by_projection.len().min(2)];

    let mut best: Option<(f32, Vec<usize>)> = None;
    for &origin_ix in origins {
        let origin = positions[origin_ix];
        for role in AxisRole::BOTH {
            let (fast, slow) = match role {
                AxisRole::Ax1Fast => (ax1, ax2),
                AxisRole::Ax2Fast => (ax2, ax1),
            };
            let (max_dist_sq, ixs) =
                snap_grid(&positions, &*index, origin, fast, slow, shape);
            if best.as_ref().is_none_or(|(d, _)| max_dist_sq < *d) {
                best = Some((max_dist_sq, ixs));
            }
        }
    }

    let (max_snap_dist_sq, ixs) = best?;
    let distinct: HashSet<usize> = ixs.iter().copied().collect();
    if distinct.len() != expected {
        warn!(
            "snapped grid covers {} distinct candidates, expected {expected}",
            distinct.len()
        );
        return None;
    }

    Some(ReconstructedGrid {
        corners: ixs.into_iter().map(|ix| positions[ix]).collect(),
        max_snap_dist_sq,
    })
}

fn centroid(points: &[Point2<f32>]) -> Point2<f32> {
    let mut sum = Vector2::zeros();
    for p in points {
        sum += p.coords;
    }
    Point2::from(sum / points.len() as f32)
}

/// Recover the two lattice axis vectors from the seed's 6-neighborhood.
fn estimate_axes(
    positions: &[Point2<f32>],
    index: &dyn NearestNeighborIndex,
    seed_ix: usize,
    field: &FloatImage,
    edge_score_threshold: f32,
) -> Option<(Vector2<f32>, Vector2<f32>)> {
    let seed = positions[seed_ix];
    let dmag = gradient_magnitude(&sobel_x(field), &sobel_y(field));

    // Edge strength towards each of the 6 nearest neighbors.
    let mut scored: Vec<(Vector2<f32>, f32)> = Vec::new();
    for (ix, _) in index.query(seed, 7) {
        if ix == seed_ix {
            continue;
        }
        let dir = positions[ix] - seed;
        if dir.norm_squared() < MIN_AXIS_LEN * MIN_AXIS_LEN {
            continue; // near-duplicate of the seed
        }
        let strength = line_edge_strength(&dmag, seed, positions[ix]);
        scored.push((dir, strength));
    }

    let max_strength = scored
        .iter()
        .map(|&(_, s)| s)
        .fold(f32::NEG_INFINITY, f32::max);
    if scored.is_empty() || max_strength <= f32::EPSILON {
        warn!("no gradient support around seed corner");
        return None;
    }

    let kept: Vec<(Vector2<f32>, f32)> = scored
        .into_iter()
        .map(|(dir, s)| (dir, s / max_strength))
        .filter(|&(_, s)| s > edge_score_threshold)
        .collect();
    if kept.len() < 2 {
        warn!("{} axis directions above edge threshold, need 2", kept.len());
        return None;
    }

    // ax1: the direction with the strongest edge; ax2: the most orthogonal
    // of the remaining kept directions.
    let (ax1_pos, _) = kept
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.1.total_cmp(&b.1))?;
    let mut ax1 = kept[ax1_pos].0;
    let ax1_unit = ax1.normalize();

    let mut ax2 = kept
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != ax1_pos)
        .map(|(_, &(dir, _))| dir)
        .min_by(|a, b| {
            let da = a.normalize().dot(&ax1_unit).abs();
            let db = b.normalize().dot(&ax1_unit).abs();
            da.total_cmp(&db)
        })?;

    // Canonical orientation: each axis points into the (+x, +y) half-plane.
    if ax1.x + ax1.y < 0.0 {
        ax1 = -ax1;
    }
    if ax2.x + ax2.y < 0.0 {
        ax2 = -ax2;
    }
    Some((ax1, ax2))
}

/// Predict all lattice positions from an origin and snap each onto its
/// nearest candidate. Returns the worst squared snap distance and the
/// snapped candidate indices in row-major order.
fn snap_grid(
    positions: &[Point2<f32>],
    index: &dyn NearestNeighborIndex,
    origin: Point2<f32>,
    fast: Vector2<f32>,
    slow: Vector2<f32>,
    shape: GridShape,
) -> (f32, Vec<usize>) {
    // Locally refine each axis towards the candidate actually found one
    // step away from the origin.
    let refine = |axis: Vector2<f32>| -> Vector2<f32> {
        match index.query(origin + axis, 1).first() {
            Some(&(ix, _)) => axis * AXIS_BLEND + (positions[ix] - origin) * (1.0 - AXIS_BLEND),
            None => axis,
        }
    };
    let fast = refine(fast);
    let slow = refine(slow);

    let mut ixs = Vec::with_capacity(shape.corner_count());
    let mut max_dist_sq = 0.0f32;
    for r in 0..shape.rows {
        for c in 0..shape.cols {
            let predicted = origin + slow * r as f32 + fast * c as f32;
            let (ix, dist_sq) = match index.query(predicted, 1).first() {
                Some(&hit) => hit,
                None => return (f32::INFINITY, ixs),
            };
            ixs.push(ix);
            if dist_sq > max_dist_sq {
                max_dist_sq = dist_sq;
            }
        }
    }
    (max_dist_sq, ixs)
}

/// Mean gradient magnitude over a 3-px-thick rasterized segment.
fn line_edge_strength(dmag: &FloatImage, a: Point2<f32>, b: Point2<f32>) -> f32 {
    let pixels = line_pixels(dmag.width, dmag.height, a, b);
    if pixels.is_empty() {
        return 0.0;
    }
    let sum: f32 = pixels.iter().map(|&(x, y)| dmag.at(x, y)).sum();
    sum / pixels.len() as f32
}

/// Rasterize the segment `a → b` with 3-px thickness; pixels are returned
/// sorted so downstream accumulation is deterministic.
fn line_pixels(
    width: usize,
    height: usize,
    a: Point2<f32>,
    b: Point2<f32>,
) -> Vec<(usize, usize)> {
    let delta = b - a;
    let steps = (delta.norm() * 2.0).ceil().max(1.0) as usize;

    let mut stamped: HashSet<(i32, i32)> = HashSet::new();
    for s in 0..=steps {
        let p = a + delta * (s as f32 / steps as f32);
        let px = p.x.round() as i32;
        let py = p.y.round() as i32;
        for oy in -1..=1 {
            for ox in -1..=1 {
                stamped.insert((px + ox, py + oy));
            }
        }
    }

    let mut pixels: Vec<(usize, usize)> = stamped
        .into_iter()
        .filter(|&(x, y)| x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height)
        .map(|(x, y)| (x as usize, y as usize))
        .collect();
    pixels.sort_unstable();
    pixels
}
