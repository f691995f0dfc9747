use super::*;
use crate::codec::EncodeFormat;
use crate::render::backend::Raster;

const RED: Color = Color::opaque(255, 0, 0);
const BLUE: Color = Color::opaque(0, 0, 255);

fn argb_alpha(argb: u32) -> u8 {
    (argb >> 24) as u8
}

#[test]
fn create_reports_requested_dimensions() {
    let img = RasterImage::create(17, 9).unwrap();
    assert_eq!(img.width().unwrap(), 17);
    assert_eq!(img.height().unwrap(), 9);
    assert!(!img.is_disposed());
}

#[test]
fn create_rejects_degenerate_dimensions() {
    assert!(matches!(
        RasterImage::create(0, 4),
        Err(RasterError::CreationFailed(_))
    ));
    assert!(matches!(
        RasterImage::create(4, 0),
        Err(RasterError::CreationFailed(_))
    ));
    assert!(matches!(
        RasterImage::create(70_000, 4),
        Err(RasterError::CreationFailed(_))
    ));
}

#[test]
fn fresh_bitmap_is_fully_transparent() {
    let img = RasterImage::create(4, 4).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(
                img.get_point(Point::new(f64::from(x), f64::from(y))).unwrap(),
                0
            );
        }
    }
}

#[test]
fn set_then_get_roundtrips_exactly() {
    let mut img = RasterImage::create(10, 10).unwrap();
    // Straight alpha must survive untouched, including zero and partial
    // alpha with non-zero color channels.
    let cases = [
        Color::new(255, 0, 0, 255),
        Color::new(0, 0, 0, 0),
        Color::new(255, 255, 255, 128),
        Color::new(100, 3, 250, 1),
        Color::new(7, 200, 40, 0),
    ];
    for (i, color) in cases.into_iter().enumerate() {
        let at = Point::new(i as f64, 5.0);
        img.set_point(color, at).unwrap();
        assert_eq!(img.get_point(at).unwrap(), color.to_argb());
    }
}

#[test]
fn pixel_access_rejects_out_of_bounds() {
    let mut img = RasterImage::create(8, 6).unwrap();
    for at in [
        Point::new(-1.0, 0.0),
        Point::new(0.0, -1.0),
        Point::new(8.0, 0.0),
        Point::new(0.0, 6.0),
    ] {
        assert!(matches!(
            img.get_point(at),
            Err(RasterError::OutOfRange { .. })
        ));
        assert!(matches!(
            img.set_point(RED, at),
            Err(RasterError::OutOfRange { .. })
        ));
    }
}

#[test]
fn crop_restricts_to_rectangle() {
    let mut img = RasterImage::create(4, 4).unwrap();
    img.set_point(RED, Point::new(1.0, 1.0)).unwrap();

    img.crop(Point::new(1.0, 1.0), Size::new(2.0, 2.0)).unwrap();
    assert_eq!(img.width().unwrap(), 2);
    assert_eq!(img.height().unwrap(), 2);
    // The old (1, 1) pixel is the new origin.
    assert_eq!(img.get_point(Point::new(0.0, 0.0)).unwrap(), 0xFFFF_0000);
    assert_eq!(img.get_point(Point::new(1.0, 1.0)).unwrap(), 0);
}

#[test]
fn crop_out_of_bounds_fails_and_leaves_image_unchanged() {
    let mut img = RasterImage::create(4, 4).unwrap();
    img.set_point(RED, Point::new(3.0, 3.0)).unwrap();

    for (top_left, size) in [
        (Point::new(3.0, 3.0), Size::new(4.0, 4.0)),
        (Point::new(-1.0, 0.0), Size::new(2.0, 2.0)),
        (Point::new(0.0, 0.0), Size::new(0.0, 2.0)),
        (Point::new(0.0, 0.0), Size::new(5.0, 5.0)),
    ] {
        assert!(matches!(
            img.crop(top_left, size),
            Err(RasterError::OutOfRange { .. })
        ));
    }

    assert_eq!(img.width().unwrap(), 4);
    assert_eq!(img.height().unwrap(), 4);
    assert_eq!(img.get_point(Point::new(3.0, 3.0)).unwrap(), 0xFFFF_0000);
}

#[test]
fn draw_line_strokes_one_pixel_row() {
    let mut img = RasterImage::create(10, 10).unwrap();
    // A unit-wide stroke centered on y = 5.5 covers row 5 exactly.
    img.draw_line(Point::new(0.0, 5.5), Point::new(10.0, 5.5), RED)
        .unwrap();

    assert_eq!(img.get_point(Point::new(3.0, 5.0)).unwrap(), 0xFFFF_0000);
    assert_eq!(img.get_point(Point::new(3.0, 3.0)).unwrap(), 0);
    assert_eq!(img.get_point(Point::new(3.0, 7.0)).unwrap(), 0);
}

#[test]
fn draw_oval_without_fill_leaves_interior_untouched() {
    let mut img = RasterImage::create(11, 11).unwrap();
    img.draw_oval(Point::new(0.0, 0.0), Size::new(11.0, 11.0), RED, None)
        .unwrap();

    // Interior stays transparent, the boundary is stroked.
    assert_eq!(img.get_point(Point::new(5.0, 5.0)).unwrap(), 0);
    let top = img.get_point(Point::new(5.0, 0.0)).unwrap();
    assert!(argb_alpha(top) > 0, "expected stroked boundary, got {top:#010x}");
}

#[test]
fn draw_oval_with_fill_fills_interior_before_stroking() {
    let mut img = RasterImage::create(11, 11).unwrap();
    img.draw_oval(Point::new(0.0, 0.0), Size::new(11.0, 11.0), RED, Some(BLUE))
        .unwrap();

    assert_eq!(img.get_point(Point::new(5.0, 5.0)).unwrap(), 0xFF00_00FF);
    let top = img.get_point(Point::new(5.0, 0.0)).unwrap();
    assert!(argb_alpha(top) > 0);
}

#[test]
fn draw_rect_derives_rectangle_from_center() {
    let mut img = RasterImage::create(10, 10).unwrap();
    // Center (5, 5) with size (5, 5) puts the edges on half-pixel
    // boundaries: the unit stroke covers columns 2 and 7, rows 2 and 7.
    img.draw_rect(Point::new(5.0, 5.0), Size::new(5.0, 5.0), RED, None)
        .unwrap();

    assert_eq!(img.get_point(Point::new(2.0, 5.0)).unwrap(), 0xFFFF_0000);
    assert_eq!(img.get_point(Point::new(7.0, 5.0)).unwrap(), 0xFFFF_0000);
    assert_eq!(img.get_point(Point::new(5.0, 2.0)).unwrap(), 0xFFFF_0000);
    // Interior and exterior stay untouched without a fill.
    assert_eq!(img.get_point(Point::new(5.0, 5.0)).unwrap(), 0);
    assert_eq!(img.get_point(Point::new(0.0, 5.0)).unwrap(), 0);
    assert_eq!(img.get_point(Point::new(9.0, 5.0)).unwrap(), 0);
}

#[test]
fn draw_rect_fill_goes_under_the_stroke() {
    let mut img = RasterImage::create(10, 10).unwrap();
    img.draw_rect(Point::new(5.0, 5.0), Size::new(5.0, 5.0), RED, Some(BLUE))
        .unwrap();

    assert_eq!(img.get_point(Point::new(5.0, 5.0)).unwrap(), 0xFF00_00FF);
    assert_eq!(img.get_point(Point::new(2.0, 5.0)).unwrap(), 0xFFFF_0000);
}

#[test]
fn wrapping_an_existing_raster_preserves_pixels() {
    let mut data = vec![0u8; 3 * 3 * 4];
    // Pixel (1, 1) in a 3x3 raster.
    data[16..20].copy_from_slice(&[255, 0, 0, 255]);
    let raster = Raster::from_raw(3, 3, data).unwrap();

    let img = RasterImage::from_raster(raster).unwrap();
    assert_eq!(img.width().unwrap(), 3);
    assert_eq!(img.get_point(Point::new(1.0, 1.0)).unwrap(), 0xFFFF_0000);
}

#[test]
fn encoded_snapshot_outlives_the_image() {
    let mut img = RasterImage::create(5, 5).unwrap();
    img.set_point(RED, Point::new(2.0, 2.0)).unwrap();

    let encoded = img.to_encoded(EncodeFormat::Png, 0).unwrap();
    assert_eq!(encoded.mime, "image/png");
    assert!(!encoded.bytes().unwrap().is_empty());

    img.dispose();
    // The snapshot is an independent value and still decodes.
    let restored = RasterImage::from_encoded(&encoded.bytes().unwrap()).unwrap();
    assert_eq!(restored.width().unwrap(), 5);
    assert_eq!(restored.get_point(Point::new(2.0, 2.0)).unwrap(), 0xFFFF_0000);
}

#[test]
fn jpeg_quality_is_validated() {
    let img = RasterImage::create(4, 4).unwrap();
    assert!(matches!(
        img.to_encoded(EncodeFormat::Jpeg, 101),
        Err(RasterError::Validation(_))
    ));
    assert!(img.to_encoded(EncodeFormat::Jpeg, 100).is_ok());
    assert!(img.to_encoded(EncodeFormat::Jpeg, 0).is_ok());
}

#[test]
fn every_operation_fails_after_dispose() {
    let mut img = RasterImage::create(4, 4).unwrap();
    img.dispose();
    assert!(img.is_disposed());

    assert!(matches!(img.width(), Err(RasterError::Disposed)));
    assert!(matches!(img.height(), Err(RasterError::Disposed)));
    assert!(matches!(img.raster(), Err(RasterError::Disposed)));
    assert!(matches!(
        img.crop(Point::new(0.0, 0.0), Size::new(1.0, 1.0)),
        Err(RasterError::Disposed)
    ));
    assert!(matches!(
        img.draw_line(Point::new(0.0, 0.0), Point::new(1.0, 1.0), RED),
        Err(RasterError::Disposed)
    ));
    assert!(matches!(
        img.draw_oval(Point::new(0.0, 0.0), Size::new(2.0, 2.0), RED, None),
        Err(RasterError::Disposed)
    ));
    assert!(matches!(
        img.draw_rect(Point::new(1.0, 1.0), Size::new(2.0, 2.0), RED, None),
        Err(RasterError::Disposed)
    ));
    assert!(matches!(
        img.get_point(Point::new(0.0, 0.0)),
        Err(RasterError::Disposed)
    ));
    assert!(matches!(
        img.set_point(RED, Point::new(0.0, 0.0)),
        Err(RasterError::Disposed)
    ));
    assert!(matches!(
        img.to_encoded(EncodeFormat::Png, 0),
        Err(RasterError::Disposed)
    ));

    // A second dispose is a no-op.
    img.dispose();
    assert!(img.is_disposed());
}

#[test]
fn failed_mutation_leaves_last_valid_state() {
    let mut img = RasterImage::create(4, 4).unwrap();
    img.set_point(RED, Point::new(0.0, 0.0)).unwrap();

    assert!(img.crop(Point::new(2.0, 2.0), Size::new(9.0, 9.0)).is_err());

    assert_eq!(img.width().unwrap(), 4);
    assert_eq!(img.get_point(Point::new(0.0, 0.0)).unwrap(), 0xFFFF_0000);
}
