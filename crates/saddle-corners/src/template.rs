//! Quadrant-indicator correlation templates.
//!
//! An ideal X-corner splits a disk into four sectors by two dividing lines.
//! Each template carries four normalized averaging kernels, one per sector,
//! stored as sparse tap lists so correlation only touches pixels inside
//! the disk.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI};

/// The fixed bank of `(angle1, angle2)` dividing-line pairs.
///
/// Spans rotations of the ideal corner pattern in 22.5°–90° increments so
/// saddle points are detected at arbitrary in-plane rotation.
pub const TEMPLATE_ANGLE_PAIRS: [(f32, f32); 10] = [
    (0.0, FRAC_PI_2),
    (FRAC_PI_4, -FRAC_PI_4),
    (0.0, FRAC_PI_4),
    (0.0, -FRAC_PI_4),
    (FRAC_PI_4, FRAC_PI_2),
    (-FRAC_PI_4, FRAC_PI_2),
    (-3.0 * FRAC_PI_8, 3.0 * FRAC_PI_8),
    (-FRAC_PI_8, FRAC_PI_8),
    (-FRAC_PI_8, -3.0 * FRAC_PI_8),
    (FRAC_PI_8, 3.0 * FRAC_PI_8),
];

/// One sector kernel: sparse `(dx, dy, weight)` taps relative to the center.
///
/// Weights sum to 1, or the tap list is empty when no pixel falls in the
/// sector (degenerate dividing lines).
#[derive(Clone, Debug, Default)]
pub struct SectorKernel {
    pub taps: Vec<(i32, i32, f32)>,
}

/// Four sector kernels for one `(angle1, angle2, radius)` configuration.
#[derive(Clone, Debug)]
pub struct CorrelationTemplate {
    pub sectors: [SectorKernel; 4],
    pub radius: usize,
}

/// Signed-distance margin that drops pixels too close to a dividing line.
const SECTOR_MARGIN: f32 = 0.1;

/// Build the four sector-indicator kernels for the dividing lines at
/// `angle1`/`angle2` (radians) within a disk of the given radius.
pub fn build_template(angle1: f32, angle2: f32, radius: usize) -> CorrelationTemplate {
    let r = radius as i32;
    let n1 = (-angle1.sin(), angle1.cos());
    let n2 = (-angle2.sin(), angle2.cos());

    let mut sectors: [Vec<(i32, i32)>; 4] = Default::default();

    for dy in -r..=r {
        for dx in -r..=r {
            let (fx, fy) = (dx as f32, dy as f32);
            if (fx * fx + fy * fy).sqrt() > radius as f32 {
                continue;
            }
            let s1 = fx * n1.0 + fy * n1.1;
            let s2 = fx * n2.0 + fy * n2.1;

            let sector = if s1 <= -SECTOR_MARGIN && s2 <= -SECTOR_MARGIN {
                0
            } else if s1 >= SECTOR_MARGIN && s2 >= SECTOR_MARGIN {
                1
            } else if s1 <= -SECTOR_MARGIN && s2 >= SECTOR_MARGIN {
                2
            } else if s1 >= SECTOR_MARGIN && s2 <= -SECTOR_MARGIN {
                3
            } else {
                continue; // on a dividing line or too close to it
            };
            sectors[sector].push((dx, dy));
        }
    }

    let sectors = sectors.map(|offsets| {
        if offsets.is_empty() {
            return SectorKernel::default();
        }
        let w = 1.0 / offsets.len() as f32;
        SectorKernel {
            taps: offsets.into_iter().map(|(dx, dy)| (dx, dy, w)).collect(),
        }
    });

    CorrelationTemplate { sectors, radius }
}

/// Sanity helper used by tests: both dividing lines must actually differ.
#[allow(dead_code)]
fn angles_distinct(a1: f32, a2: f32) -> bool {
    ((a1 - a2) % PI).abs() > 1e-3
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn angle_bank_has_distinct_lines() {
        for &(a1, a2) in &TEMPLATE_ANGLE_PAIRS {
            assert!(angles_distinct(a1, a2), "pair ({a1}, {a2})");
        }
    }

    #[test]
    fn sector_weights_sum_to_one() {
        for &(a1, a2) in &TEMPLATE_ANGLE_PAIRS {
            let tpl = build_template(a1, a2, 6);
            for sector in &tpl.sectors {
                assert!(!sector.taps.is_empty());
                let sum: f32 = sector.taps.iter().map(|&(_, _, w)| w).sum();
                assert_relative_eq!(1.0, sum, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn sectors_are_disjoint_and_inside_disk() {
        let tpl = build_template(0.0, FRAC_PI_2, 5);
        let mut seen = std::collections::HashSet::new();
        for sector in &tpl.sectors {
            for &(dx, dy, _) in &sector.taps {
                assert!(((dx * dx + dy * dy) as f32).sqrt() <= 5.0);
                assert!(seen.insert((dx, dy)), "offset ({dx}, {dy}) in two sectors");
            }
        }
    }

    #[test]
    fn axis_aligned_template_has_opposite_diagonal_sectors() {
        // angle1 = 0 and angle2 = π/2 divide the disk along x and y; the
        // sector pair (0, 1) must be point-symmetric to itself.
        let tpl = build_template(0.0, FRAC_PI_2, 4);
        let s0: std::collections::HashSet<_> = tpl.sectors[0]
            .taps
            .iter()
            .map(|&(dx, dy, _)| (dx, dy))
            .collect();
        for &(dx, dy, _) in &tpl.sectors[1].taps {
            assert!(s0.contains(&(-dx, -dy)));
        }
    }
}
