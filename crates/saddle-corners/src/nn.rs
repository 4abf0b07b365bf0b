//! Nearest-neighbor search behind a small trait.
//!
//! Grid reconstruction is the only consumer of spatial search, so the
//! dependency is isolated here: a k-d tree for realistic candidate counts
//! and a brute-force scan for tiny sets.

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Point2;

/// Candidate counts below this use the brute-force index.
const BRUTE_FORCE_LIMIT: usize = 32;

/// Spatial index over a fixed point set.
///
/// `query` returns up to `k` `(index, squared_distance)` pairs in ascending
/// distance order. Distances are squared throughout; callers only compare
/// them, never mix them with unsquared values.
pub trait NearestNeighborIndex {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn query(&self, point: Point2<f32>, k: usize) -> Vec<(usize, f32)>;
}

/// k-d tree index backed by `kiddo`.
pub struct KdTreeIndex {
    tree: KdTree<f32, 2>,
    len: usize,
}

impl KdTreeIndex {
    pub fn build(points: &[Point2<f32>]) -> Self {
        let coords: Vec<[f32; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        Self {
            tree: (&coords).into(),
            len: points.len(),
        }
    }
}

impl NearestNeighborIndex for KdTreeIndex {
    fn len(&self) -> usize {
        self.len
    }

    fn query(&self, point: Point2<f32>, k: usize) -> Vec<(usize, f32)> {
        self.tree
            .nearest_n::<SquaredEuclidean>(&[point.x, point.y], k)
            .into_iter()
            .map(|nn| (nn.item as usize, nn.distance))
            .collect()
    }
}

/// Exhaustive scan; preferable for a handful of points.
pub struct BruteForceIndex {
    points: Vec<Point2<f32>>,
}

impl BruteForceIndex {
    pub fn build(points: &[Point2<f32>]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }
}

impl NearestNeighborIndex for BruteForceIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn query(&self, point: Point2<f32>, k: usize) -> Vec<(usize, f32)> {
        let mut dists: Vec<(usize, f32)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p - point).norm_squared()))
            .collect();
        dists.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        dists.truncate(k);
        dists
    }
}

/// Pick an index implementation suited to the point count.
pub(crate) fn build_index(points: &[Point2<f32>]) -> Box<dyn NearestNeighborIndex> {
    if points.len() < BRUTE_FORCE_LIMIT {
        Box::new(BruteForceIndex::build(points))
    } else {
        Box::new(KdTreeIndex::build(points))
    }
}
