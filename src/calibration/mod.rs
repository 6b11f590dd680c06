//! Calibration engine
//!
//! The renderer is opaque, so the document -> screen mapping is recovered
//! after every render by finding the three injected markers in the raster:
//!
//! 1. For each marker color, cluster near-color pixels into 8-connected
//!    components; each component centroid is a candidate.
//! 2. Pick the (origin, x, y) candidate triple whose axes are closest to
//!    orthogonal and equally long, ignoring axes shorter than a pixel floor.
//! 3. Map image-local centroids into canvas space through the placement rect.

pub mod basis;
pub mod cluster;
pub mod markers;

pub use basis::CalibrationBasis;
pub use markers::Marker;

use image::RgbaImage;
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Rect, ScreenPoint};
use cluster::{Component, color_components};
use markers::MATCH_DISTANCE;

/// Axis vectors shorter than this (in image pixels) are rejected
pub const MIN_AXIS_PX: f64 = 2.0;
/// Largest clusters kept per color before disambiguation
const MAX_CANDIDATES: usize = 8;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("no rendered image")]
    EmptyImage,

    #[error("invalid placement rectangle {0:?}")]
    InvalidPlacement(Rect),

    #[error(
        "marker detection failed (R={}, G={}, B={})",
        hit(.origin), hit(.x_axis), hit(.y_axis)
    )]
    MissingMarkers {
        origin: bool,
        x_axis: bool,
        y_axis: bool,
    },

    #[error("no marker combination spans a usable basis")]
    NoConsistentTriple,

    #[error("degenerate basis (det={det:.2})")]
    Degenerate { det: f64 },
}

fn hit(found: &bool) -> &'static str {
    if *found { "ok" } else { "miss" }
}

/// Marker centroids in image-local pixel coordinates
///
/// Kept separately from any placement so pan and zoom can re-project the
/// basis without scanning the image again.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MarkerFix {
    pub origin: ScreenPoint,
    pub x_axis: ScreenPoint,
    pub y_axis: ScreenPoint,
    pub image_width: u32,
    pub image_height: u32,
}

impl MarkerFix {
    /// Map the fix into canvas coordinates for an image drawn into `placement`
    pub fn project(&self, placement: Rect) -> Result<CalibrationBasis, CalibrationError> {
        if !placement.is_valid() || self.image_width == 0 || self.image_height == 0 {
            return Err(CalibrationError::InvalidPlacement(placement));
        }
        let sx = placement.width() as f64 / self.image_width as f64;
        let sy = placement.height() as f64 / self.image_height as f64;
        let top_left = placement.top_left();
        // Pixel centres scale about their own centre, so a 1:1 placement is a pure offset
        let map = |p: ScreenPoint| {
            top_left + ScreenPoint::new((p.x + 0.5) * sx - 0.5, (p.y + 0.5) * sy - 0.5)
        };

        let basis = CalibrationBasis::from_samples(map(self.origin), map(self.x_axis), map(self.y_axis));
        if !basis.is_valid() {
            return Err(CalibrationError::Degenerate { det: basis.det() });
        }
        Ok(basis)
    }
}

/// Candidate centroids for one marker color, largest clusters first
pub fn marker_candidates(image: &RgbaImage, marker: Marker) -> Vec<ScreenPoint> {
    let mut components: Vec<Component> = color_components(image, marker.rgb(), MATCH_DISTANCE);
    components.sort_by(|a, b| b.pixel_count.cmp(&a.pixel_count));
    components.truncate(MAX_CANDIDATES);
    components.iter().map(Component::centroid).collect()
}

/// Disambiguation score; lower is better, `None` when an axis is too short
///
/// Combines |cos| of the angle between the axes with their relative length
/// imbalance. Both terms are 0 for a perfect square basis.
pub fn triple_score(origin: ScreenPoint, x_axis: ScreenPoint, y_axis: ScreenPoint) -> Option<f64> {
    let (u, v) = (x_axis - origin, y_axis - origin);
    let (lu, lv) = (u.length(), v.length());
    if lu < MIN_AXIS_PX || lv < MIN_AXIS_PX {
        return None;
    }
    let orthogonality = u.dot(v).abs() / (lu * lv);
    let imbalance = (lu - lv).abs() / lu.max(lv);
    Some(orthogonality + imbalance)
}

/// Locate the three markers in image-local coordinates
pub fn find_markers(image: &RgbaImage) -> Result<MarkerFix, CalibrationError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CalibrationError::EmptyImage);
    }

    let origins = marker_candidates(image, Marker::Origin);
    let x_axes = marker_candidates(image, Marker::AxisX);
    let y_axes = marker_candidates(image, Marker::AxisY);
    if origins.is_empty() || x_axes.is_empty() || y_axes.is_empty() {
        return Err(CalibrationError::MissingMarkers {
            origin: !origins.is_empty(),
            x_axis: !x_axes.is_empty(),
            y_axis: !y_axes.is_empty(),
        });
    }

    let mut best: Option<(f64, ScreenPoint, ScreenPoint, ScreenPoint)> = None;
    for &o in &origins {
        for &x in &x_axes {
            for &y in &y_axes {
                let Some(score) = triple_score(o, x, y) else {
                    continue;
                };
                if best.is_none_or(|(s, ..)| score < s) {
                    best = Some((score, o, x, y));
                }
            }
        }
    }
    let (score, origin, x_axis, y_axis) = best.ok_or(CalibrationError::NoConsistentTriple)?;
    log::debug!(
        "marker candidates R={} G={} B={}, best score {score:.4}",
        origins.len(),
        x_axes.len(),
        y_axes.len()
    );

    Ok(MarkerFix {
        origin,
        x_axis,
        y_axis,
        image_width: image.width(),
        image_height: image.height(),
    })
}

/// Locate markers and project them through `screen_rect` in one go
pub fn try_locate_markers(
    image: &RgbaImage,
    screen_rect: Rect,
) -> Result<CalibrationBasis, CalibrationError> {
    if !screen_rect.is_valid() {
        return Err(CalibrationError::InvalidPlacement(screen_rect));
    }
    find_markers(image)?.project(screen_rect)
}

/// Calibration as a value: failures come back as an invalid basis
pub fn locate_markers(image: &RgbaImage, screen_rect: Rect) -> CalibrationBasis {
    match try_locate_markers(image, screen_rect) {
        Ok(basis) => {
            log::info!(
                "[Calib] R=({:.1},{:.1}) G=({:.1},{:.1}) B=({:.1},{:.1}) det={:.2} OK",
                basis.origin.x,
                basis.origin.y,
                basis.x_sample.x,
                basis.x_sample.y,
                basis.y_sample.x,
                basis.y_sample.y,
                basis.det()
            );
            basis
        }
        Err(err) => {
            log::warn!("[Calib] {err}");
            CalibrationBasis::invalid()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorldPoint;
    use image::Rgba;

    fn canvas(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    fn dot(img: &mut RgbaImage, cx: u32, cy: u32, color: [u8; 3]) {
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                img.put_pixel(x, y, Rgba([color[0], color[1], color[2], 255]));
            }
        }
    }

    fn marker_image() -> RgbaImage {
        let mut img = canvas(200, 200);
        dot(&mut img, 10, 10, Marker::Origin.rgb());
        dot(&mut img, 110, 10, Marker::AxisX.rgb());
        dot(&mut img, 10, 110, Marker::AxisY.rgb());
        img
    }

    fn assert_near(p: ScreenPoint, x: f64, y: f64) {
        assert!((p.x - x).abs() < 1e-6 && (p.y - y).abs() < 1e-6, "{p:?} != ({x}, {y})");
    }

    #[test]
    fn test_unambiguous_markers_round_trip() {
        let img = marker_image();
        let basis = locate_markers(&img, Rect::from_origin_size(0, 0, 200, 200));
        assert!(basis.is_valid());
        assert_near(basis.world_to_screen(WorldPoint::new(0.0, 0.0)), 10.0, 10.0);
        assert_near(basis.world_to_screen(WorldPoint::new(1.0, 0.0)), 110.0, 10.0);
        assert_near(basis.world_to_screen(WorldPoint::new(0.0, 1.0)), 10.0, 110.0);

        for (x, y) in [(0.3, 0.7), (-2.0, 5.5), (12.25, -0.125)] {
            let back = basis
                .screen_to_world(basis.world_to_screen(WorldPoint::new(x, y)))
                .expect("valid basis inverts");
            assert!((back.x - x).abs() < 1e-9 && (back.y - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_placement_offsets_into_canvas() {
        let img = marker_image();
        let basis = locate_markers(&img, Rect::from_origin_size(40, 25, 200, 200));
        assert_near(basis.origin, 50.0, 35.0);
        assert_near(basis.x_sample, 150.0, 35.0);
    }

    #[test]
    fn test_scaled_placement() {
        let fix = find_markers(&marker_image()).expect("markers present");
        let basis = fix.project(Rect::from_origin_size(0, 0, 400, 400)).expect("valid");
        // Pixel centre 10 at scale 2 lands on 20.5
        assert_near(basis.origin, 20.5, 20.5);
        assert_near(basis.x_sample, 220.5, 20.5);
    }

    #[test]
    fn test_missing_marker_reports_which() {
        let mut img = canvas(100, 100);
        dot(&mut img, 10, 10, Marker::Origin.rgb());
        dot(&mut img, 60, 10, Marker::AxisX.rgb());
        let err = find_markers(&img).unwrap_err();
        assert_eq!(
            err,
            CalibrationError::MissingMarkers {
                origin: true,
                x_axis: true,
                y_axis: false
            }
        );
        assert_eq!(err.to_string(), "marker detection failed (R=ok, G=ok, B=miss)");
        assert!(!locate_markers(&img, Rect::from_origin_size(0, 0, 100, 100)).is_valid());
    }

    #[test]
    fn test_collinear_markers_are_rejected() {
        let mut img = canvas(260, 40);
        dot(&mut img, 10, 10, Marker::Origin.rgb());
        dot(&mut img, 110, 10, Marker::AxisX.rgb());
        dot(&mut img, 210, 10, Marker::AxisY.rgb());
        let err = try_locate_markers(&img, Rect::from_origin_size(0, 0, 260, 40)).unwrap_err();
        assert!(matches!(err, CalibrationError::Degenerate { det } if det.abs() < 1e-6));
        assert!(!locate_markers(&img, Rect::from_origin_size(0, 0, 260, 40)).is_valid());
    }

    #[test]
    fn test_decoy_cluster_is_disambiguated() {
        let mut img = marker_image();
        // A user-drawn near-cyan blob that is not a square partner of the origin
        dot(&mut img, 150, 160, Marker::AxisX.rgb());
        let fix = find_markers(&img).expect("markers present");
        assert_near(fix.x_axis, 110.0, 10.0);
        assert_near(fix.y_axis, 10.0, 110.0);
    }

    #[test]
    fn test_axis_floor_rejects_touching_candidates() {
        let mut img = canvas(60, 60);
        let [r, g, b] = Marker::Origin.rgb();
        img.put_pixel(10, 10, Rgba([r, g, b, 255]));
        let [r, g, b] = Marker::AxisX.rgb();
        img.put_pixel(11, 10, Rgba([r, g, b, 255]));
        dot(&mut img, 10, 40, Marker::AxisY.rgb());
        assert_eq!(find_markers(&img).unwrap_err(), CalibrationError::NoConsistentTriple);
    }

    #[test]
    fn test_invalid_placement() {
        let img = marker_image();
        assert!(matches!(
            try_locate_markers(&img, Rect::default()),
            Err(CalibrationError::InvalidPlacement(_))
        ));
    }

    #[test]
    fn test_empty_image() {
        let img = RgbaImage::new(0, 0);
        assert_eq!(find_markers(&img).unwrap_err(), CalibrationError::EmptyImage);
    }

    #[test]
    fn test_triple_score_prefers_square_axes() {
        let o = ScreenPoint::new(0.0, 0.0);
        let square = triple_score(o, ScreenPoint::new(50.0, 0.0), ScreenPoint::new(0.0, 50.0));
        let skewed = triple_score(o, ScreenPoint::new(50.0, 0.0), ScreenPoint::new(40.0, 30.0));
        assert_eq!(square, Some(0.0));
        assert!(skewed.expect("long enough") > 0.5);
        assert_eq!(triple_score(o, ScreenPoint::new(1.0, 0.0), ScreenPoint::new(0.0, 50.0)), None);
    }
}
