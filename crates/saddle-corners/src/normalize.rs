//! Local contrast normalization of the input image.

use saddle_corners_core::{box_blur, gaussian_blur, FloatImage};

/// Turn a grayscale field (0..255 scale) into a locally contrast-normalized
/// field in `[0, 1]`.
///
/// A light 3×3 Gaussian removes pixel noise; a box blur with window
/// ≈ `sqrt(w·h)/2` estimates the local brightness mean; the difference is
/// clipped to ±0.2 of the dynamic range and min-max rescaled. A constant
/// clipped signal (blank image) yields an all-zero field.
pub fn normalize_image(gray: &FloatImage) -> FloatImage {
    let smoothed = gaussian_blur(gray, 1, 1.0);

    let pixels = (gray.width * gray.height) as f64;
    let mean_window = (pixels.sqrt() / 2.0) as usize;
    let mean = box_blur(&smoothed, (mean_window / 2).max(1));

    let mut clipped = FloatImage::zeros(gray.width, gray.height);
    for (out, (&a, &b)) in clipped
        .data
        .iter_mut()
        .zip(smoothed.data.iter().zip(mean.data.iter()))
    {
        let diff = (a - b) / 255.0;
        *out = diff.clamp(-0.2, 0.2) + 0.2;
    }

    let Some((lo, hi)) = clipped.min_max() else {
        return clipped;
    };
    if hi - lo < 1e-9 {
        // constant signal: avoid dividing by zero
        return FloatImage::zeros(gray.width, gray.height);
    }

    let scale = 1.0 / (hi - lo);
    for v in &mut clipped.data {
        *v = (*v - lo) * scale;
    }
    clipped
}
