//! Placement of the rendered page inside the widget (pan and zoom)

use serde::Serialize;

use crate::domain::{Rect, ScreenPoint};

/// Zoom factor per wheel notch
pub const ZOOM_STEP: f64 = 1.12;
pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 12.0;
/// Share of the widget the page fills at zoom 1
const FIT_MARGIN: f64 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct View {
    pub zoom: f64,
    pub pan: ScreenPoint,
}

impl Default for View {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: ScreenPoint::default(),
        }
    }
}

impl View {
    /// Rectangle the page of `page_size` occupies in a widget of `widget_size`
    pub fn target_rect(&self, widget_size: (u32, u32), page_size: (u32, u32)) -> Rect {
        let (ww, wh) = (widget_size.0 as f64, widget_size.1 as f64);
        let (pw, ph) = (page_size.0 as f64, page_size.1 as f64);
        if pw <= 0.0 || ph <= 0.0 {
            return Rect::default();
        }

        let scale = FIT_MARGIN * (ww / pw).min(wh / ph) * self.zoom;
        let w = ((pw * scale) as i32).max(1);
        let h = ((ph * scale) as i32).max(1);
        let left = ((ww - w as f64) * 0.5 + self.pan.x).round() as i32;
        let top = ((wh - h as f64) * 0.5 + self.pan.y).round() as i32;
        Rect::from_origin_size(left, top, w, h)
    }

    /// Apply `notches` wheel steps (120 angle units each); returns whether the zoom moved
    pub fn zoom_by(&mut self, notches: f64) -> bool {
        if notches == 0.0 || !notches.is_finite() {
            return false;
        }
        let zoom = (self.zoom * ZOOM_STEP.powf(notches)).clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan = self.pan + ScreenPoint::new(dx, dy);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
