//! The backend seam: the [`Raster`] pixel buffer, the [`DrawContext`] and
//! [`RasterBackend`] traits, and [`BackendKind`].

use crate::foundation::core::{Color, Point, Rect};
use crate::foundation::error::{RasterError, RasterResult};

/// An owned raster as straight-alpha RGBA8 pixels.
///
/// `data` is tightly packed, row-major. Unlike the pixmaps used inside the
/// CPU backend, a `Raster` holds **straight** (non-premultiplied) alpha so
/// that single-pixel reads and writes are exact for every channel
/// combination. Releasing a raster is dropping it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Raster {
    /// Create a raster from raw straight RGBA8 bytes.
    ///
    /// `data.len()` must be exactly `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> RasterResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| {
                RasterError::validation(format!("raster size {width}x{height} overflows"))
            })?;
        if data.len() != expected {
            return Err(RasterError::validation(format!(
                "raster byte length {} does not match {width}x{height} RGBA8 (expected {expected})",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Borrow the raw straight RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Read the pixel at `(x, y)`. Callers bounds-check first.
    pub(crate) fn pixel(&self, x: u32, y: u32) -> Color {
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Color::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Return a copy of this raster with the pixel at `(x, y)` set to `color`.
    pub(crate) fn with_pixel(&self, x: u32, y: u32, color: Color) -> Raster {
        let mut data = self.data.clone();
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        data[i] = color.r;
        data[i + 1] = color.g;
        data[i + 2] = color.b;
        data[i + 3] = color.a;
        Raster {
            width: self.width,
            height: self.height,
            data,
        }
    }
}

/// Drawing primitives available inside an active backend context.
///
/// A context is sized and cleared to transparent by
/// [`RasterBackend::with_context`]; its contents are captured as a new
/// [`Raster`] only when the closure returns successfully.
pub trait DrawContext {
    /// Draw an existing raster with its top-left corner at `at`.
    fn draw_raster(&mut self, raster: &Raster, at: Point) -> RasterResult<()>;

    /// Stroke a one-unit-wide line from `start` to `end` in `color`.
    fn stroke_line(&mut self, start: Point, end: Point, color: Color) -> RasterResult<()>;

    /// Stroke the ellipse inscribed in `rect`, filling it first when `fill`
    /// is set so the stroke stays visible on top.
    fn draw_oval(&mut self, rect: Rect, stroke: Color, fill: Option<Color>) -> RasterResult<()>;

    /// Stroke `rect`, filling it first when `fill` is set.
    fn draw_rect(&mut self, rect: Rect, stroke: Color, fill: Option<Color>) -> RasterResult<()>;
}

/// A rasterization backend that allocates rasters and runs scoped drawing
/// contexts over them.
///
/// At most one drawing context is active per backend instance at any time.
/// The closure scope in [`RasterBackend::with_context`] makes the begin/end
/// region explicit and guarantees teardown on every exit path: a failing
/// closure abandons the context contents and nothing is captured.
pub trait RasterBackend {
    /// Allocate a new blank, fully transparent raster.
    fn create_blank(&mut self, width: u32, height: u32) -> RasterResult<Raster>;

    /// Open a drawing context of the given size, run `f` against it, and
    /// capture the context contents as a new raster.
    fn with_context(
        &mut self,
        width: u32,
        height: u32,
        f: &mut dyn FnMut(&mut dyn DrawContext) -> RasterResult<()>,
    ) -> RasterResult<Raster>;
}

/// Available backend kinds.
///
/// - `Cpu` is always available.
#[derive(Clone, Copy, Debug)]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    Cpu,
}

/// Create a rasterization backend implementation.
pub fn create_backend(kind: BackendKind) -> RasterResult<Box<dyn RasterBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
    }
}
