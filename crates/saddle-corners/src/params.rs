use serde::{Deserialize, Serialize};

/// A detection whose defect score is below this value is a success.
pub const ACCEPTANCE_THRESHOLD: f32 = 0.3;

/// Score reported when no usable grid was found at all.
///
/// Any score at or above this value means "no detection"; callers must
/// discard the corner list regardless of its contents.
pub const REJECTION_SCORE: f32 = 1.0;

/// Interior corner grid of the target board.
///
/// `rows` counts corners along the slow output axis, `cols` along the fast
/// one: the detector returns corner `(r, c)` at index `r * cols + c`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn corner_count(&self) -> usize {
        self.rows * self.cols
    }
}

/// Detector tuning parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Sampling window size. Drives the correlation template radii
    /// (`winsize ± 3`), the candidate-extraction window (`winsize + 2`),
    /// the NMS spacing (`winsize − 2`), and the sub-pixel refinement
    /// window (`winsize + 2`).
    pub winsize: usize,
    /// Crop the image to its highest-textured connected region before
    /// detection. Output coordinates are translated back afterwards.
    pub trim: bool,
    /// Candidate threshold relative to the global cornerness maximum.
    pub candidate_threshold_rel: f32,
    /// Grid-defect score below which a detection is accepted.
    pub acceptance_threshold: f32,
    /// Normalized edge-strength threshold for lattice-axis neighbors.
    pub edge_score_threshold: f32,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            winsize: 9,
            trim: false,
            candidate_threshold_rel: 0.2,
            acceptance_threshold: ACCEPTANCE_THRESHOLD,
            edge_score_threshold: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_count_multiplies_shape() {
        let shape = GridShape { rows: 4, cols: 6 };
        assert_eq!(24, shape.corner_count());
    }
}
