//! Grid snapping for dragged values

use serde::Serialize;

use crate::domain::WorldPoint;

/// Smallest radius a drag may produce
pub const MIN_RADIUS: f64 = 0.01;

/// Grid step in document units; a step of 0 disables snapping
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SnapSetting {
    step: f64,
}

impl SnapSetting {
    pub fn new(step: f64) -> Self {
        Self {
            step: if step.is_finite() && step > 0.0 { step } else { 0.0 },
        }
    }

    /// 10 mm is one document unit
    pub fn from_mm(mm: u32) -> Self {
        Self::new(mm as f64 / 10.0)
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn is_enabled(&self) -> bool {
        self.step > 0.0
    }

    /// Round to the nearest multiple of the step, halves away from zero
    pub fn value(&self, v: f64) -> f64 {
        if self.is_enabled() {
            (v / self.step).round() * self.step
        } else {
            v
        }
    }

    pub fn point(&self, p: WorldPoint) -> WorldPoint {
        WorldPoint::new(self.value(p.x), self.value(p.y))
    }

    /// Snap then clamp to [`MIN_RADIUS`]
    pub fn radius(&self, r: f64) -> f64 {
        self.value(r).max(MIN_RADIUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_half_unit() {
        let snap = SnapSetting::new(0.5);
        assert_eq!(snap.point(WorldPoint::new(1.23, 1.77)), WorldPoint::new(1.0, 2.0));
        assert_eq!(snap.value(-0.25), -0.5);
        assert_eq!(snap.value(0.25), 0.5);
    }

    #[test]
    fn test_millimetre_setting() {
        assert_eq!(SnapSetting::from_mm(10).step(), 1.0);
        assert_eq!(SnapSetting::from_mm(5).step(), 0.5);
        assert!(!SnapSetting::from_mm(0).is_enabled());
    }

    #[test]
    fn test_disabled_snap_is_identity() {
        let snap = SnapSetting::from_mm(0);
        assert_eq!(snap.value(1.2345), 1.2345);
        assert!(!SnapSetting::new(f64::NAN).is_enabled());
        assert!(!SnapSetting::new(-1.0).is_enabled());
    }

    #[test]
    fn test_radius_floor() {
        assert_eq!(SnapSetting::new(0.5).radius(0.2), MIN_RADIUS);
        assert_eq!(SnapSetting::new(0.0).radius(0.0), MIN_RADIUS);
        assert_eq!(SnapSetting::new(0.5).radius(1.3), 1.5);
    }
}
