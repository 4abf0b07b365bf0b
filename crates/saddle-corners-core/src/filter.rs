//! Separable filters over [`FloatImage`], all with replicate-border handling.

use crate::image::FloatImage;

/// Convolve rows with a symmetric 1-D kernel centered at `radius`.
fn convolve_rows(src: &FloatImage, kernel: &[f32], radius: i32) -> FloatImage {
    let mut out = FloatImage::zeros(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                acc += w * src.at_clamped(x as i32 + k as i32 - radius, y as i32);
            }
            out.set(x, y, acc);
        }
    }
    out
}

/// Convolve columns with a symmetric 1-D kernel centered at `radius`.
fn convolve_cols(src: &FloatImage, kernel: &[f32], radius: i32) -> FloatImage {
    let mut out = FloatImage::zeros(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let mut acc = 0.0f32;
            for (k, &w) in kernel.iter().enumerate() {
                acc += w * src.at_clamped(x as i32, y as i32 + k as i32 - radius);
            }
            out.set(x, y, acc);
        }
    }
    out
}

fn gaussian_kernel(radius: usize, sigma: f32) -> Vec<f32> {
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-(radius as i32)..=radius as i32)
        .map(|o| (-(o * o) as f32 / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Separable Gaussian blur with window `2*radius + 1`.
pub fn gaussian_blur(src: &FloatImage, radius: usize, sigma: f32) -> FloatImage {
    if src.is_empty() || radius == 0 {
        return src.clone();
    }
    let kernel = gaussian_kernel(radius, sigma);
    let tmp = convolve_rows(src, &kernel, radius as i32);
    convolve_cols(&tmp, &kernel, radius as i32)
}

/// Sliding-window mean along rows; O(width) per row regardless of radius.
fn box_rows(src: &FloatImage, radius: i32) -> FloatImage {
    let mut out = FloatImage::zeros(src.width, src.height);
    let norm = 1.0 / (2 * radius + 1) as f32;
    for y in 0..src.height {
        let mut sum = 0.0f32;
        for o in -radius..=radius {
            sum += src.at_clamped(o, y as i32);
        }
        out.set(0, y, sum * norm);
        for x in 1..src.width {
            sum += src.at_clamped(x as i32 + radius, y as i32);
            sum -= src.at_clamped(x as i32 - 1 - radius, y as i32);
            out.set(x, y, sum * norm);
        }
    }
    out
}

fn box_cols(src: &FloatImage, radius: i32) -> FloatImage {
    let mut out = FloatImage::zeros(src.width, src.height);
    let norm = 1.0 / (2 * radius + 1) as f32;
    for x in 0..src.width {
        let mut sum = 0.0f32;
        for o in -radius..=radius {
            sum += src.at_clamped(x as i32, o);
        }
        out.set(x, 0, sum * norm);
        for y in 1..src.height {
            sum += src.at_clamped(x as i32, y as i32 + radius);
            sum -= src.at_clamped(x as i32, y as i32 - 1 - radius);
            out.set(x, y, sum * norm);
        }
    }
    out
}

/// Box (mean) blur with window `2*radius + 1`, replicate border.
///
/// Runs in O(pixels) regardless of the radius, so the very large local-mean
/// windows used by contrast normalization stay cheap.
pub fn box_blur(src: &FloatImage, radius: usize) -> FloatImage {
    if src.is_empty() || radius == 0 {
        return src.clone();
    }
    let tmp = box_rows(src, radius as i32);
    box_cols(&tmp, radius as i32)
}

/// 3×3 Sobel derivative along x (smoothing [1,2,1] across rows).
pub fn sobel_x(src: &FloatImage) -> FloatImage {
    let deriv = [-1.0f32, 0.0, 1.0];
    let smooth = [1.0f32, 2.0, 1.0];
    let tmp = convolve_rows(src, &deriv, 1);
    convolve_cols(&tmp, &smooth, 1)
}

/// 3×3 Sobel derivative along y.
pub fn sobel_y(src: &FloatImage) -> FloatImage {
    let deriv = [-1.0f32, 0.0, 1.0];
    let smooth = [1.0f32, 2.0, 1.0];
    let tmp = convolve_cols(src, &deriv, 1);
    convolve_rows(&tmp, &smooth, 1)
}

/// Pixelwise `sqrt(dx² + dy²)`.
pub fn gradient_magnitude(dx: &FloatImage, dy: &FloatImage) -> FloatImage {
    debug_assert_eq!(dx.width, dy.width);
    debug_assert_eq!(dx.height, dy.height);
    let data = dx
        .data
        .iter()
        .zip(dy.data.iter())
        .map(|(&gx, &gy)| (gx * gx + gy * gy).sqrt())
        .collect();
    FloatImage {
        width: dx.width,
        height: dx.height,
        data,
    }
}

/// Magnitude of the 3×3 Laplacian (4-neighbor stencil).
pub fn laplacian_abs(src: &FloatImage) -> FloatImage {
    let mut out = FloatImage::zeros(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let xi = x as i32;
            let yi = y as i32;
            let v = src.at_clamped(xi - 1, yi)
                + src.at_clamped(xi + 1, yi)
                + src.at_clamped(xi, yi - 1)
                + src.at_clamped(xi, yi + 1)
                - 4.0 * src.at(x, y);
            out.set(x, y, v.abs());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn constant(width: usize, height: usize, v: f32) -> FloatImage {
        FloatImage {
            width,
            height,
            data: vec![v; width * height],
        }
    }

    #[test]
    fn gaussian_preserves_constant_field() {
        let img = constant(9, 7, 3.5);
        let blurred = gaussian_blur(&img, 1, 1.0);
        for &v in &blurred.data {
            assert_relative_eq!(3.5, v, epsilon = 1e-5);
        }
    }

    #[test]
    fn box_blur_matches_naive_mean() {
        let img = FloatImage {
            width: 5,
            height: 4,
            data: (0..20).map(|v| (v * 7 % 13) as f32).collect(),
        };
        let r = 2i32;
        let fast = box_blur(&img, r as usize);
        for y in 0..img.height {
            for x in 0..img.width {
                let mut sum = 0.0;
                for oy in -r..=r {
                    for ox in -r..=r {
                        sum += img.at_clamped(x as i32 + ox, y as i32 + oy);
                    }
                }
                let expected = sum / ((2 * r + 1) * (2 * r + 1)) as f32;
                assert_relative_eq!(expected, fast.at(x, y), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn sobel_x_responds_to_horizontal_ramp() {
        let mut img = FloatImage::zeros(7, 5);
        for y in 0..img.height {
            for x in 0..img.width {
                img.set(x, y, 2.0 * x as f32);
            }
        }
        let dx = sobel_x(&img);
        let dy = sobel_y(&img);
        // interior: [-1,0,1]*[1,2,1]^T kernel on a ramp of slope 2 gives 16
        assert_relative_eq!(16.0, dx.at(3, 2), epsilon = 1e-5);
        assert_relative_eq!(0.0, dy.at(3, 2), epsilon = 1e-5);
    }

    #[test]
    fn laplacian_is_zero_on_linear_field() {
        let mut img = FloatImage::zeros(6, 6);
        for y in 0..6 {
            for x in 0..6 {
                img.set(x, y, 3.0 * x as f32 - 2.0 * y as f32);
            }
        }
        // interior pixels only; the border sees the replicated edge
        for y in 1..5 {
            for x in 1..5 {
                assert_relative_eq!(0.0, laplacian_abs(&img).at(x, y), epsilon = 1e-5);
            }
        }
    }
}
