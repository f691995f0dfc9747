//! The [`RasterImage`] handle wrapping a mutable raster surface.

use crate::codec::{self, EncodeFormat, EncodedImage};
use crate::foundation::core::{Color, Point, Rect, Size};
use crate::foundation::error::{RasterError, RasterResult};
use crate::render::backend::{BackendKind, DrawContext, Raster, RasterBackend, create_backend};

/// A mutable raster image handle.
///
/// The handle owns exactly one backing [`Raster`] while live. Every mutating
/// operation produces a replacement raster through one scoped backend drawing
/// pass — replay the current raster, apply a single primitive, capture — and
/// installs it only on success. The previous raster is released after the
/// replacement is installed, so a failed mutation leaves the image in its
/// last valid state.
///
/// Mutators take `&mut self`; single ownership is the per-instance exclusive
/// region, so operations on one handle can never interleave.
pub struct RasterImage {
    backend: Box<dyn RasterBackend>,
    raster: Option<Raster>,
}

impl RasterImage {
    /// Create a blank, fully transparent bitmap on the default CPU backend.
    pub fn create(width: u32, height: u32) -> RasterResult<Self> {
        Self::with_backend(create_backend(BackendKind::Cpu)?, width, height)
    }

    /// Create a blank bitmap on a caller-supplied backend.
    pub fn with_backend(
        mut backend: Box<dyn RasterBackend>,
        width: u32,
        height: u32,
    ) -> RasterResult<Self> {
        let raster = backend.create_blank(width, height)?;
        Ok(Self {
            backend,
            raster: Some(raster),
        })
    }

    /// Wrap an existing raster on the default CPU backend.
    pub fn from_raster(raster: Raster) -> RasterResult<Self> {
        Ok(Self {
            backend: create_backend(BackendKind::Cpu)?,
            raster: Some(raster),
        })
    }

    /// Decode PNG or JPEG bytes into a new image.
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    pub fn from_encoded(bytes: &[u8]) -> RasterResult<Self> {
        Self::from_raster(codec::decode_raster(bytes)?)
    }

    /// Current raster width in pixels.
    pub fn width(&self) -> RasterResult<u32> {
        Ok(self.current()?.width())
    }

    /// Current raster height in pixels.
    pub fn height(&self) -> RasterResult<u32> {
        Ok(self.current()?.height())
    }

    /// Borrow the currently owned raster. Ownership stays with the image.
    pub fn raster(&self) -> RasterResult<&Raster> {
        self.current()
    }

    /// Whether the handle has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.raster.is_none()
    }

    /// Restrict the image to the rectangle `(top_left, size)`.
    ///
    /// The rectangle must lie fully inside the current bounds; anything else
    /// fails with [`RasterError::OutOfRange`] and leaves the image unchanged.
    #[tracing::instrument(skip(self))]
    pub fn crop(&mut self, top_left: Point, size: Size) -> RasterResult<()> {
        let (width, height) = self.dimensions()?;
        let x = top_left.x.floor();
        let y = top_left.y.floor();
        let crop_w = size.width.round();
        let crop_h = size.height.round();
        if x < 0.0
            || y < 0.0
            || crop_w < 1.0
            || crop_h < 1.0
            || x + crop_w > f64::from(width)
            || y + crop_h > f64::from(height)
        {
            return Err(RasterError::out_of_range(
                x as i64, y as i64, width, height,
            ));
        }

        // Replaying the current raster at a negative offset into a context of
        // the crop size is the whole operation.
        self.replace_raster(crop_w as u32, crop_h as u32, Point::new(-x, -y), &mut |_| {
            Ok(())
        })
    }

    /// Stroke a one-pixel-wide line from `start` to `end` in `color`.
    pub fn draw_line(&mut self, start: Point, end: Point, color: Color) -> RasterResult<()> {
        let (width, height) = self.dimensions()?;
        self.replace_raster(width, height, Point::ZERO, &mut |ctx| {
            ctx.stroke_line(start, end, color)
        })
    }

    /// Stroke the ellipse inscribed in the rectangle `(top_left, size)`.
    ///
    /// When `fill` is set the ellipse is filled first, so the stroke stays
    /// visible on top; `None` suppresses the fill entirely.
    pub fn draw_oval(
        &mut self,
        top_left: Point,
        size: Size,
        stroke: Color,
        fill: Option<Color>,
    ) -> RasterResult<()> {
        let (width, height) = self.dimensions()?;
        let rect = Rect::from_origin_size(top_left, size);
        self.replace_raster(width, height, Point::ZERO, &mut |ctx| {
            ctx.draw_oval(rect, stroke, fill)
        })
    }

    /// Stroke the axis-aligned rectangle centered on `center`, filling it
    /// first when `fill` is set.
    ///
    /// The rectangle's top-left is derived from the center and half-extents.
    pub fn draw_rect(
        &mut self,
        center: Point,
        size: Size,
        stroke: Color,
        fill: Option<Color>,
    ) -> RasterResult<()> {
        let (width, height) = self.dimensions()?;
        let rect = Rect::from_center_size(center, size);
        self.replace_raster(width, height, Point::ZERO, &mut |ctx| {
            ctx.draw_rect(rect, stroke, fill)
        })
    }

    /// Read the pixel at `at` as packed ARGB:
    /// `(a << 24) | (r << 16) | (g << 8) | b`.
    pub fn get_point(&self, at: Point) -> RasterResult<u32> {
        let raster = self.current()?;
        let (x, y) = checked_coords(at, raster.width(), raster.height())?;
        Ok(raster.pixel(x, y).to_argb())
    }

    /// Write exactly the one pixel at `at` with `color`.
    ///
    /// The pixel is written directly into the replacement raster: a stroked
    /// 1x1 fill cannot represent every straight-alpha value once
    /// premultiplied, and `get_point` must round-trip exactly.
    pub fn set_point(&mut self, color: Color, at: Point) -> RasterResult<()> {
        let raster = self.current()?;
        let (x, y) = checked_coords(at, raster.width(), raster.height())?;
        let replacement = raster.with_pixel(x, y, color);
        self.raster = Some(replacement);
        Ok(())
    }

    /// Encode the current raster and wrap the compressed bytes as base64.
    ///
    /// `quality` applies to JPEG only and must be 0-100; PNG ignores it.
    #[tracing::instrument(skip(self))]
    pub fn to_encoded(&self, format: EncodeFormat, quality: u8) -> RasterResult<EncodedImage> {
        codec::encode_raster(self.current()?, format, quality)
    }

    /// Release the raster and mark the handle terminal.
    ///
    /// Disposing an already-disposed handle is a no-op; every other
    /// operation fails with [`RasterError::Disposed`] afterwards.
    pub fn dispose(&mut self) {
        self.raster = None;
    }

    fn current(&self) -> RasterResult<&Raster> {
        self.raster.as_ref().ok_or(RasterError::Disposed)
    }

    fn dimensions(&self) -> RasterResult<(u32, u32)> {
        let raster = self.current()?;
        Ok((raster.width(), raster.height()))
    }

    /// Run one scoped drawing pass and install its result.
    ///
    /// Opens a backend context of the target size, replays the current
    /// raster at `base_at`, applies `op`, and captures the context as the
    /// replacement raster. The previous raster is dropped only after the
    /// replacement is installed.
    fn replace_raster(
        &mut self,
        target_width: u32,
        target_height: u32,
        base_at: Point,
        op: &mut dyn FnMut(&mut dyn DrawContext) -> RasterResult<()>,
    ) -> RasterResult<()> {
        let old = self.raster.as_ref().ok_or(RasterError::Disposed)?;
        let replacement = self
            .backend
            .with_context(target_width, target_height, &mut |ctx| {
                ctx.draw_raster(old, base_at)?;
                op(ctx)
            })?;
        self.raster = Some(replacement);
        Ok(())
    }
}

fn checked_coords(at: Point, width: u32, height: u32) -> RasterResult<(u32, u32)> {
    let x = at.x.floor();
    let y = at.y.floor();
    if x < 0.0 || y < 0.0 || x >= f64::from(width) || y >= f64::from(height) {
        return Err(RasterError::out_of_range(x as i64, y as i64, width, height));
    }
    Ok((x as u32, y as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/raster/image.rs"]
mod tests;
