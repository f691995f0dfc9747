//! Rasterpad is a minimal 2D raster editing surface.
//!
//! The public API is handle-oriented:
//!
//! - Create a [`RasterImage`] — blank, wrapping a [`Raster`], or decoded from
//!   PNG/JPEG bytes
//! - Mutate it with crop, drawing, and pixel operations
//! - Snapshot it with [`RasterImage::to_encoded`]
//!
//! All rasterization is delegated to a [`RasterBackend`]; the built-in
//! [`CpuBackend`] is powered by `vello_cpu`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Encoded-image formats and snapshots.
pub mod codec;
/// Mutable raster image handles.
pub mod raster;
/// Rasterization backend(s).
pub mod render;

pub use crate::foundation::core::{Color, Point, Rect, Size, Vec2};
pub use crate::foundation::error::{RasterError, RasterResult};

pub use crate::codec::{EncodeFormat, EncodedImage};
pub use crate::raster::image::RasterImage;
pub use crate::render::backend::{BackendKind, DrawContext, Raster, RasterBackend, create_backend};
pub use crate::render::cpu::CpuBackend;
