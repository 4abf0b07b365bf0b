//! Convenience entry points for callers holding `image` crate buffers.

use image::{DynamicImage, GrayImage};
use saddle_corners_core::GrayImageView;

use crate::detect::{detect_checkerboard, CheckerboardDetection};
use crate::error::DetectError;
use crate::params::{DetectorParams, GridShape};

/// Borrow a [`GrayImage`] as a detector input view.
pub fn gray_view(image: &GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: image.width() as usize,
        height: image.height() as usize,
        data: image.as_raw(),
    }
}

/// Build a [`GrayImage`] from a raw row-major byte buffer, validating the
/// dimensions against the buffer length.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    data: &[u8],
) -> Result<GrayImage, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    }
    let expected = width as usize * height as usize;
    if data.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: data.len(),
        });
    }
    GrayImage::from_raw(width, height, data.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

/// [`detect_checkerboard`] over an `image::GrayImage`.
pub fn detect_checkerboard_image(
    image: &GrayImage,
    shape: GridShape,
    params: &DetectorParams,
) -> Result<CheckerboardDetection, DetectError> {
    detect_checkerboard(&gray_view(image), shape, params)
}

/// [`detect_checkerboard`] over any `image::DynamicImage`; color inputs are
/// converted to 8-bit luma first.
pub fn detect_checkerboard_dynamic(
    image: &DynamicImage,
    shape: GridShape,
    params: &DetectorParams,
) -> Result<CheckerboardDetection, DetectError> {
    let gray = image.to_luma8();
    detect_checkerboard(&gray_view(&gray), shape, params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_roundtrip_preserves_pixels() {
        let data: Vec<u8> = (0..12).collect();
        let img = gray_image_from_slice(4, 3, &data).unwrap();
        assert_eq!(4, img.width());
        assert_eq!(3, img.height());
        assert_eq!(data.as_slice(), img.as_raw().as_slice());
    }

    #[test]
    fn slice_length_mismatch_is_rejected() {
        let err = gray_image_from_slice(4, 3, &[0u8; 10]);
        assert!(matches!(
            err,
            Err(DetectError::InvalidGrayBuffer {
                expected: 12,
                got: 10
            })
        ));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let err = gray_image_from_slice(0, 3, &[]);
        assert!(matches!(
            err,
            Err(DetectError::InvalidGrayDimensions {
                width: 0,
                height: 3
            })
        ));
    }

    #[test]
    fn view_borrows_without_copy() {
        let img = GrayImage::from_pixel(8, 6, image::Luma([42u8]));
        let view = gray_view(&img);
        assert_eq!(8, view.width);
        assert_eq!(6, view.height);
        assert!(view.data.iter().all(|&v| v == 42));
    }
}
