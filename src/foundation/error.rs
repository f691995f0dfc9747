/// Convenience result type used across Rasterpad.
pub type RasterResult<T> = Result<T, RasterError>;

/// Top-level error taxonomy used by the editing surface.
#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    /// Operation attempted on a disposed image handle.
    #[error("image handle has been disposed")]
    Disposed,

    /// Pixel coordinates or a crop rectangle outside the raster bounds.
    #[error("coordinates ({x}, {y}) are outside the {width}x{height} raster")]
    OutOfRange {
        /// Requested x coordinate (floored).
        x: i64,
        /// Requested y coordinate (floored).
        y: i64,
        /// Raster width at the time of the request.
        width: u32,
        /// Raster height at the time of the request.
        height: u32,
    },

    /// Encoded data is in a format this crate does not handle.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// The codec produced no usable output.
    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    /// The backend could not allocate a raster.
    #[error("raster creation failed: {0}")]
    CreationFailed(String),

    /// Invalid user-provided parameters.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RasterError {
    /// Build a [`RasterError::OutOfRange`] value.
    pub fn out_of_range(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self::OutOfRange {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a [`RasterError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Build a [`RasterError::EncodingFailed`] value.
    pub fn encoding_failed(msg: impl Into<String>) -> Self {
        Self::EncodingFailed(msg.into())
    }

    /// Build a [`RasterError::CreationFailed`] value.
    pub fn creation_failed(msg: impl Into<String>) -> Self {
        Self::CreationFailed(msg.into())
    }

    /// Build a [`RasterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
