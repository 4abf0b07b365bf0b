//! Region-of-interest trimming.
//!
//! Checkerboards are busy regions: the absolute Laplacian lights up on
//! every square boundary. Smoothing that activity map and keeping the
//! largest high-activity blob isolates the board and lets the detector
//! skip large featureless margins.

use std::collections::VecDeque;

use log::debug;
use saddle_corners_core::{box_blur, laplacian_abs, FloatImage};

/// Half-width of the activity smoothing window.
const ACTIVITY_BLUR_RADIUS: usize = 50;
/// Activity percentile used as the texture threshold.
const ACTIVITY_PERCENTILE: f32 = 0.92;
/// Components smaller than this are noise, not a board.
const MIN_REGION_AREA: usize = 4000;
/// Padding added around the detected region before cropping.
const REGION_PAD: usize = 50;

/// Crop the image to its dominant textured region.
///
/// Returns the cropped image and the `(x, y)` offset of its top-left corner
/// in the input, or `None` when no sufficiently large textured region
/// exists, in which case the caller should process the full frame.
pub fn trim_to_textured_region(gray: &FloatImage) -> Option<(FloatImage, (usize, usize))> {
    if gray.is_empty() {
        return None;
    }

    let activity = box_blur(&laplacian_abs(gray), ACTIVITY_BLUR_RADIUS);
    let threshold = percentile(&activity.data, ACTIVITY_PERCENTILE)?;

    let mask: Vec<bool> = activity.data.iter().map(|&v| v > threshold).collect();
    let region = largest_component(&mask, gray.width, gray.height)?;

    if region.area < MIN_REGION_AREA {
        debug!(
            "textured region too small ({} px < {MIN_REGION_AREA}), keeping full frame",
            region.area
        );
        return None;
    }

    let x0 = region.min_x.saturating_sub(REGION_PAD);
    let y0 = region.min_y.saturating_sub(REGION_PAD);
    let x1 = (region.max_x + REGION_PAD + 1).min(gray.width);
    let y1 = (region.max_y + REGION_PAD + 1).min(gray.height);

    debug!(
        "trimmed to textured region [{x0}, {x1}) x [{y0}, {y1}) of {}x{}",
        gray.width, gray.height
    );
    Some((gray.crop(x0, y0, x1 - x0, y1 - y0), (x0, y0)))
}

fn percentile(values: &[f32], fraction: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let idx = ((sorted.len() - 1) as f32 * fraction).round() as usize;
    Some(sorted[idx])
}

struct Region {
    area: usize,
    min_x: usize,
    min_y: usize,
    max_x: usize,
    max_y: usize,
}

/// Largest 8-connected component of the mask, by pixel count.
fn largest_component(mask: &[bool], width: usize, height: usize) -> Option<Region> {
    let mut seen = vec![false; mask.len()];
    let mut best: Option<Region> = None;
    let mut queue = VecDeque::new();

    for start in 0..mask.len() {
        if !mask[start] || seen[start] {
            continue;
        }

        let mut region = Region {
            area: 0,
            min_x: usize::MAX,
            min_y: usize::MAX,
            max_x: 0,
            max_y: 0,
        };
        seen[start] = true;
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            let (x, y) = (idx % width, idx / width);
            region.area += 1;
            region.min_x = region.min_x.min(x);
            region.min_y = region.min_y.min(y);
            region.max_x = region.max_x.max(x);
            region.max_y = region.max_y.max(y);

            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                        continue;
                    }
                    let nidx = ny as usize * width + nx as usize;
                    if mask[nidx] && !seen[nidx] {
                        seen[nidx] = true;
                        queue.push_back(nidx);
                    }
                }
            }
        }

        if best.as_ref().is_none_or(|b| region.area > b.area) {
            best = Some(region);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fine checker texture inside a given block, flat elsewhere.
    fn textured_block(
        width: usize,
        height: usize,
        bx: usize,
        by: usize,
        bw: usize,
        bh: usize,
    ) -> FloatImage {
        let mut img = FloatImage::zeros(width, height);
        for y in by..by + bh {
            for x in bx..bx + bw {
                let v = if (x / 2 + y / 2) % 2 == 0 { 1.0 } else { 0.0 };
                img.set(x, y, v);
            }
        }
        img
    }

    #[test]
    fn blank_image_has_no_region() {
        let img = FloatImage::zeros(300, 300);
        assert!(trim_to_textured_region(&img).is_none());
    }

    #[test]
    fn crop_contains_textured_block() {
        let img = textured_block(400, 300, 120, 80, 150, 120);
        let (cropped, (ox, oy)) = trim_to_textured_region(&img).unwrap();

        // block center must survive the crop
        assert!(ox <= 195 && 195 < ox + cropped.width);
        assert!(oy <= 140 && 140 < oy + cropped.height);
        assert!(cropped.width <= 400 && cropped.height <= 300);
        assert!(cropped.width < 400 || cropped.height < 300);
    }

    #[test]
    fn uniform_texture_has_no_dominant_region() {
        // constant activity everywhere: nothing sits above the percentile
        let mut img = FloatImage::zeros(300, 300);
        for y in 0..300 {
            for x in 0..300 {
                img.set(x, y, if (x + y) % 2 == 0 { 1.0 } else { 0.0 });
            }
        }
        assert!(trim_to_textured_region(&img).is_none());
    }

    #[test]
    fn largest_component_prefers_bigger_blob() {
        let width = 10;
        let height = 6;
        let mut mask = vec![false; width * height];
        // 2x2 blob
        for &(x, y) in &[(1, 1), (2, 1), (1, 2), (2, 2)] {
            mask[y * width + x] = true;
        }
        // 3x3 blob
        for y in 3..6 {
            for x in 6..9 {
                mask[y * width + x] = true;
            }
        }

        let region = largest_component(&mask, width, height).unwrap();
        assert_eq!(9, region.area);
        assert_eq!((6, 3), (region.min_x, region.min_y));
        assert_eq!((8, 5), (region.max_x, region.max_y));
    }

    #[test]
    fn percentile_picks_upper_tail() {
        let values: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let p = percentile(&values, 0.92).unwrap();
        assert!((p - 91.0).abs() < 1.5);
    }
}
