//! Affine document <-> screen transform recovered from three markers

use serde::Serialize;

use crate::domain::{ScreenPoint, WorldPoint};

/// Minimum parallelogram area for a basis to be considered valid
pub const MIN_DET: f64 = 1e-6;
/// Below this the 2x2 system is not inverted at all
const SINGULAR_DET: f64 = 1e-9;

/// Screen-space images of document (0,0), (1,0) and (0,1)
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CalibrationBasis {
    pub origin: ScreenPoint,
    pub x_sample: ScreenPoint,
    pub y_sample: ScreenPoint,
    valid: bool,
}

impl Default for CalibrationBasis {
    fn default() -> Self {
        Self::invalid()
    }
}

impl CalibrationBasis {
    /// Build a basis; validity is decided by the determinant alone
    pub fn from_samples(origin: ScreenPoint, x_sample: ScreenPoint, y_sample: ScreenPoint) -> Self {
        let mut basis = Self {
            origin,
            x_sample,
            y_sample,
            valid: false,
        };
        basis.valid = basis.det().abs() > MIN_DET;
        basis
    }

    /// The "no calibration" value: handles hidden, new drags refused
    pub fn invalid() -> Self {
        Self {
            origin: ScreenPoint::new(0.0, 0.0),
            x_sample: ScreenPoint::new(1.0, 0.0),
            y_sample: ScreenPoint::new(0.0, -1.0),
            valid: false,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Screen vector of one document unit along x
    pub fn u(&self) -> ScreenPoint {
        self.x_sample - self.origin
    }

    /// Screen vector of one document unit along y
    pub fn v(&self) -> ScreenPoint {
        self.y_sample - self.origin
    }

    pub fn det(&self) -> f64 {
        self.u().cross(self.v())
    }

    pub fn world_to_screen(&self, p: WorldPoint) -> ScreenPoint {
        self.origin + self.u() * p.x + self.v() * p.y
    }

    /// Invert the 2x2 system with Cramer's rule
    pub fn screen_to_world(&self, p: ScreenPoint) -> Option<WorldPoint> {
        let (u, v) = (self.u(), self.v());
        let det = u.cross(v);
        if det.abs() < SINGULAR_DET {
            return None;
        }
        let d = p - self.origin;
        Some(WorldPoint::new(d.cross(v) / det, u.cross(d) / det))
    }

    /// Same basis shifted by a screen-space delta (panning)
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        let delta = ScreenPoint::new(dx, dy);
        Self {
            origin: self.origin + delta,
            x_sample: self.x_sample + delta,
            y_sample: self.y_sample + delta,
            valid: self.valid,
        }
    }
}
