//! Rasterization backends.
//!
//! The [`backend`] module defines the backend seam ([`backend::RasterBackend`]
//! and [`backend::DrawContext`]); [`cpu`] provides the built-in CPU
//! implementation.

pub mod backend;
pub mod cpu;
