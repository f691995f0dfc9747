//! The built-in [`CpuBackend`] CPU rasterization implementation.

use crate::foundation::core::{Color, Point, Rect};
use crate::foundation::error::{RasterError, RasterResult};
use crate::render::backend::{DrawContext, Raster, RasterBackend};
use std::sync::Arc;
use vello_cpu::kurbo::Shape;

/// CPU raster backend powered by `vello_cpu`.
///
/// One `vello_cpu::RenderContext` is cached and reused across operations of
/// the same size, so at most one drawing context exists per backend instance.
/// Rasters cross the boundary as straight RGBA8 and are converted to and
/// from the premultiplied form the pipeline works in.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
}

impl CpuBackend {
    /// Create a CPU backend with no warm context.
    pub fn new() -> Self {
        Self { ctx: None }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> RasterResult<R>,
    ) -> RasterResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterBackend for CpuBackend {
    fn create_blank(&mut self, width: u32, height: u32) -> RasterResult<Raster> {
        checked_dims(width, height)?;
        let bytes = vec![0u8; (width as usize) * (height as usize) * 4];
        Raster::from_raw(width, height, bytes)
    }

    fn with_context(
        &mut self,
        width: u32,
        height: u32,
        f: &mut dyn FnMut(&mut dyn DrawContext) -> RasterResult<()>,
    ) -> RasterResult<Raster> {
        let (w, h) = checked_dims(width, height)?;
        self.with_ctx_mut(w, h, |ctx| {
            f(&mut CpuDrawContext { ctx: &mut *ctx })?;
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            let mut data = pixmap.data_as_u8_slice().to_vec();
            unpremultiply_rgba8_in_place(&mut data);
            Raster::from_raw(width, height, data)
        })
    }
}

/// Dimension limits of the CPU backend: `vello_cpu` contexts and pixmaps
/// address dimensions as `u16`, and zero-sized rasters are rejected.
fn checked_dims(width: u32, height: u32) -> RasterResult<(u16, u16)> {
    if width == 0 || height == 0 {
        return Err(RasterError::creation_failed(format!(
            "raster dimensions must be non-zero, got {width}x{height}"
        )));
    }
    let w = width
        .try_into()
        .map_err(|_| RasterError::creation_failed(format!("raster width {width} exceeds u16")))?;
    let h = height
        .try_into()
        .map_err(|_| RasterError::creation_failed(format!("raster height {height} exceeds u16")))?;
    Ok((w, h))
}

struct CpuDrawContext<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
}

impl CpuDrawContext<'_> {
    fn set_solid_paint(&mut self, color: Color) {
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
    }

    fn set_hairline_stroke(&mut self) {
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(1.0));
    }
}

impl DrawContext for CpuDrawContext<'_> {
    fn draw_raster(&mut self, raster: &Raster, at: Point) -> RasterResult<()> {
        let paint = rgba_straight_to_image_premul(raster.data(), raster.width(), raster.height())?;
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((at.x, at.y)));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            raster.width() as f64,
            raster.height() as f64,
        ));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn stroke_line(&mut self, start: Point, end: Point, color: Color) -> RasterResult<()> {
        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(vello_cpu::kurbo::Point::new(start.x, start.y));
        path.line_to(vello_cpu::kurbo::Point::new(end.x, end.y));

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.set_solid_paint(color);
        self.set_hairline_stroke();
        self.ctx.stroke_path(&path);
        Ok(())
    }

    fn draw_oval(&mut self, rect: Rect, stroke: Color, fill: Option<Color>) -> RasterResult<()> {
        let oval = vello_cpu::kurbo::Ellipse::from_rect(rect_to_cpu(rect));
        let path = oval.to_path(0.1);

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if let Some(fill) = fill {
            self.set_solid_paint(fill);
            self.ctx.fill_path(&path);
        }
        self.set_solid_paint(stroke);
        self.set_hairline_stroke();
        self.ctx.stroke_path(&path);
        Ok(())
    }

    fn draw_rect(&mut self, rect: Rect, stroke: Color, fill: Option<Color>) -> RasterResult<()> {
        let r = rect_to_cpu(rect);

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        if let Some(fill) = fill {
            self.set_solid_paint(fill);
            self.ctx.fill_rect(&r);
        }
        self.set_solid_paint(stroke);
        self.set_hairline_stroke();
        self.ctx.stroke_path(&r.to_path(0.1));
        Ok(())
    }
}

fn rect_to_cpu(rect: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(rect.x0, rect.y0, rect.x1, rect.y1)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((px[1] as u16 * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((px[2] as u16 * 255 + a / 2) / a).min(255) as u8;
    }
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> RasterResult<vello_cpu::Pixmap> {
    let (w, h) = checked_dims(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(RasterError::validation("pixmap byte length mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_straight_to_image_premul(
    bytes_rgba: &[u8],
    width: u32,
    height: u32,
) -> RasterResult<vello_cpu::Image> {
    let mut tmp = bytes_rgba.to_vec();
    premultiply_rgba8_in_place(&mut tmp);
    let pixmap = pixmap_from_premul_bytes(&tmp, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
