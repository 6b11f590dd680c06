//! Handle overlay drawn onto a rendered raster using tiny-skia
//!
//! The basis passed in must map into the raster's own pixel space.

use image::RgbaImage;
use tiny_skia::{LineCap, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::calibration::CalibrationBasis;
use crate::domain::{ScreenPoint, ShapeKind, ShapeSet};
use crate::surface::all_handles;

const HANDLE_RGB: [u8; 3] = [220, 38, 38];
const GUIDE_ALPHA: u8 = 150;
const GUIDE_WIDTH: f32 = 1.6;
const POINT_HALF: f32 = 6.0;
const HANDLE_HALF: f32 = 5.0;
const HANDLE_RING: f32 = 2.0;
const CROSS_WIDTH: f32 = 2.0;

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = tiny_skia::IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

fn paint(alpha: u8) -> Paint<'static> {
    let [r, g, b] = HANDLE_RGB;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, alpha);
    paint.anti_alias = true;
    paint
}

fn draw_cross(pixmap: &mut Pixmap, at: ScreenPoint, half: f32) {
    let (x, y) = (at.x as f32, at.y as f32);
    let mut pb = PathBuilder::new();
    pb.move_to(x - half, y - half);
    pb.line_to(x + half, y + half);
    pb.move_to(x - half, y + half);
    pb.line_to(x + half, y - half);
    if let Some(path) = pb.finish() {
        let stroke = Stroke {
            width: CROSS_WIDTH,
            line_cap: LineCap::Round,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint(255), &stroke, Transform::identity(), None);
    }
}

fn draw_ring(pixmap: &mut Pixmap, at: ScreenPoint) {
    if let Some(path) = PathBuilder::from_circle(at.x as f32, at.y as f32, HANDLE_RING) {
        let stroke = Stroke {
            width: 1.0,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint(255), &stroke, Transform::identity(), None);
    }
}

fn draw_guide(pixmap: &mut Pixmap, from: ScreenPoint, to: ScreenPoint) {
    let mut pb = PathBuilder::new();
    pb.move_to(from.x as f32, from.y as f32);
    pb.line_to(to.x as f32, to.y as f32);
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: GUIDE_WIDTH,
        dash: StrokeDash::new(vec![5.0, 4.0], 0.0),
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint(GUIDE_ALPHA), &stroke, Transform::identity(), None);
}

/// Draw every handle of `shapes`; nothing is drawn without a valid basis
pub fn draw_handles(img: &mut RgbaImage, shapes: &ShapeSet, basis: &CalibrationBasis) -> usize {
    if !basis.is_valid() {
        return 0;
    }
    let handles = all_handles(shapes);
    if handles.is_empty() {
        return 0;
    }

    with_pixmap(img, |pixmap| {
        for handle in &handles {
            let at = basis.world_to_screen(handle.at);
            if handle.handle.kind == ShapeKind::Point {
                draw_cross(pixmap, at, POINT_HALF);
                continue;
            }
            if let Some(from) = handle.guide_from {
                draw_guide(pixmap, basis.world_to_screen(from), at);
            }
            draw_cross(pixmap, at, HANDLE_HALF);
            draw_ring(pixmap, at);
        }
    });
    handles.len()
}
