/// Errors for malformed detector inputs.
///
/// An image on which no board can be found is *not* an error; that case is
/// reported through the detection score. These variants fire before any
/// pipeline stage runs.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("empty input image")]
    EmptyImage,

    #[error("invalid grid shape (rows={rows}, cols={cols})")]
    InvalidGridShape { rows: usize, cols: usize },

    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },
}
