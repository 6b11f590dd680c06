//! Handle layout and hit-testing
//!
//! Every editable field (or linked pair) of a shape gets one handle. Handles
//! are laid out in document units and pushed through the calibration basis
//! whenever they are drawn or probed.

use serde::Serialize;

use crate::calibration::CalibrationBasis;
use crate::domain::{HandleRef, ScreenPoint, ShapeKind, ShapeRecord, ShapeSet, SubHandle, WorldPoint};

/// One draggable handle with the fixed point its guide line starts from
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Handle {
    pub handle: HandleRef,
    pub at: WorldPoint,
    /// Centre, rectangle anchor or curve end point the handle hangs off
    pub guide_from: Option<WorldPoint>,
}

/// Where a handle sits for the given record, or `None` if the sub-handle
/// does not belong to that kind
pub fn handle_position(record: &ShapeRecord, sub: Option<SubHandle>) -> Option<WorldPoint> {
    match (record, sub) {
        (ShapeRecord::Point(p), None) => Some(p.at),
        (ShapeRecord::Circle(c), None) => Some(WorldPoint::new(c.center.x + c.radius, c.center.y)),
        (ShapeRecord::Ellipse(e), Some(SubHandle::RadiusX)) => {
            Some(WorldPoint::new(e.center.x + e.rx, e.center.y))
        }
        (ShapeRecord::Ellipse(e), Some(SubHandle::RadiusY)) => {
            Some(WorldPoint::new(e.center.x, e.center.y + e.ry))
        }
        (ShapeRecord::Rectangle(r), None) => Some(r.corner),
        (ShapeRecord::CubicCurve(c), Some(SubHandle::Control1)) => Some(c.control1),
        (ShapeRecord::CubicCurve(c), Some(SubHandle::Control2)) => Some(c.control2),
        _ => None,
    }
}

fn guide_origin(record: &ShapeRecord, sub: Option<SubHandle>) -> Option<WorldPoint> {
    match (record, sub) {
        (ShapeRecord::Point(_), _) => None,
        (ShapeRecord::Circle(c), _) => Some(c.center),
        (ShapeRecord::Ellipse(e), _) => Some(e.center),
        (ShapeRecord::Rectangle(r), _) => Some(r.anchor),
        (ShapeRecord::CubicCurve(c), Some(SubHandle::Control2)) => Some(c.end),
        (ShapeRecord::CubicCurve(c), _) => Some(c.start),
    }
}

/// Sub-handles exposed by one kind
pub fn sub_handles(kind: ShapeKind) -> &'static [Option<SubHandle>] {
    match kind {
        ShapeKind::Point | ShapeKind::Circle | ShapeKind::Rectangle => &[None],
        ShapeKind::Ellipse => &[Some(SubHandle::RadiusX), Some(SubHandle::RadiusY)],
        ShapeKind::CubicCurve => &[Some(SubHandle::Control1), Some(SubHandle::Control2)],
    }
}

/// Handles of one record
pub fn record_handles(record: &ShapeRecord, index: usize) -> impl Iterator<Item = Handle> + '_ {
    let kind = record.kind();
    sub_handles(kind).iter().filter_map(move |&sub| {
        Some(Handle {
            handle: HandleRef::new(kind, index, sub),
            at: handle_position(record, sub)?,
            guide_from: guide_origin(record, sub),
        })
    })
}

/// Every handle in the set, in probe order: kind priority, then extraction order
pub fn all_handles(shapes: &ShapeSet) -> Vec<Handle> {
    let mut handles = Vec::new();
    for kind in ShapeKind::PROBE_ORDER {
        for index in 0..shapes.count(kind) {
            if let Some(record) = shapes.get(kind, index) {
                handles.extend(record_handles(&record, index));
            }
        }
    }
    handles
}

/// Nearest handle within `radius` screen pixels of `pointer`
///
/// Ties keep the handle probed first.
pub fn hit_test(
    shapes: &ShapeSet,
    basis: &CalibrationBasis,
    pointer: ScreenPoint,
    radius: f64,
) -> Option<HandleRef> {
    if !basis.is_valid() {
        return None;
    }
    let mut best: Option<(f64, HandleRef)> = None;
    for handle in all_handles(shapes) {
        let distance = basis.world_to_screen(handle.at).distance(pointer);
        if distance > radius {
            continue;
        }
        if best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, handle.handle));
        }
    }
    best.map(|(_, handle)| handle)
}
