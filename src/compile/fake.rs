//! In-process renderer for tests: paints calibration markers, no TeX

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use image::{Rgba, RgbaImage};

use super::{RenderError, RenderedPage, Renderer};
use crate::calibration::Marker;
use crate::domain::ScreenPoint;

/// Page with the three markers drawn for a basis at `origin` with `unit` px per document unit (y up)
pub fn marker_page(width: u32, height: u32, origin: (u32, u32), unit: u32) -> RenderedPage {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let (ox, oy) = origin;
    for (marker, (cx, cy)) in [
        (Marker::Origin, (ox, oy)),
        (Marker::AxisX, (ox + unit, oy)),
        (Marker::AxisY, (ox, oy - unit)),
    ] {
        let [r, g, b] = marker.rgb();
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                image.put_pixel(x, y, Rgba([r, g, b, 255]));
            }
        }
    }
    RenderedPage {
        image,
        log: String::new(),
    }
}

/// Image-local position of a document point on [`marker_page`]
pub fn page_point(origin: (u32, u32), unit: u32, x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new(origin.0 as f64 + x * unit as f64, origin.1 as f64 - y * unit as f64)
}

/// Renders every job as the same marker page unless told to fail
#[derive(Default)]
pub struct FakeRenderer {
    pub submitted: Arc<Mutex<Vec<String>>>,
    pub cancels: AtomicUsize,
    pub fail: bool,
}

impl Renderer for FakeRenderer {
    fn submit(&self, source: String) -> BoxFuture<'static, Result<RenderedPage, RenderError>> {
        if let Ok(mut submitted) = self.submitted.lock() {
            submitted.push(source);
        }
        let fail = self.fail;
        Box::pin(async move {
            if fail {
                Err(RenderError::Failed {
                    tool: "fake".to_string(),
                    status: "exit status: 1".to_string(),
                    log: "! Undefined control sequence.".to_string(),
                })
            } else {
                Ok(marker_page(300, 300, (50, 250), 40))
            }
        })
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}
