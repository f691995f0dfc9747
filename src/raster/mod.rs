//! Mutable raster image handles.

pub mod image;
