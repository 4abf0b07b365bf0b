/// Borrowed view over an 8-bit grayscale image.
#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.data.is_empty()
    }
}

/// Owned row-major 2-D field of `f32` samples.
///
/// Out-of-range accesses through [`FloatImage::at_clamped`] replicate the
/// nearest border pixel, which is what every filter in this crate assumes.
#[derive(Clone, Debug, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Copy an 8-bit view into a float field, keeping the [0, 255] scale.
    pub fn from_gray(src: &GrayImageView<'_>) -> Self {
        Self {
            width: src.width,
            height: src.height,
            data: src.data.iter().map(|&v| v as f32).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        self.data[y * self.width + x] = v;
    }

    /// Sample with replicate-border semantics.
    #[inline]
    pub fn at_clamped(&self, x: i32, y: i32) -> f32 {
        let xc = x.clamp(0, self.width as i32 - 1) as usize;
        let yc = y.clamp(0, self.height as i32 - 1) as usize;
        self.data[yc * self.width + xc]
    }

    /// Minimum and maximum sample; `None` for an empty field.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut it = self.data.iter();
        let first = *it.next()?;
        let mut lo = first;
        let mut hi = first;
        for &v in it {
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
        Some((lo, hi))
    }

    /// Crop a rectangular region. The rectangle must lie inside the image.
    pub fn crop(&self, x0: usize, y0: usize, width: usize, height: usize) -> Self {
        debug_assert!(x0 + width <= self.width && y0 + height <= self.height);
        let mut data = Vec::with_capacity(width * height);
        for y in y0..y0 + height {
            let row = &self.data[y * self.width + x0..y * self.width + x0 + width];
            data.extend_from_slice(row);
        }
        Self {
            width,
            height,
            data,
        }
    }
}
