//! Image buffers and filtering primitives for the saddle-corners detector.
//!
//! This crate is intentionally small. It owns the grayscale view / float
//! field types and the handful of separable filters the detector needs.
//! No detection semantics live here.

mod filter;
mod image;
mod logger;

pub use filter::{
    box_blur, gaussian_blur, gradient_magnitude, laplacian_abs, sobel_x, sobel_y,
};
pub use image::{FloatImage, GrayImageView};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
