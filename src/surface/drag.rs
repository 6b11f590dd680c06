//! Pointer state machine and the drag arithmetic behind it

use crate::calibration::CalibrationBasis;
use crate::domain::{EditValues, HandleRef, ScreenPoint, ShapeEdit, ShapeRecord, SubHandle, WorldPoint};

use super::snap::SnapSetting;

/// Per-pointer state: `Idle -> Panning -> Idle` or `Idle -> DraggingHandle -> Idle`
#[derive(Clone, Debug, Default, PartialEq)]
pub enum PointerState {
    #[default]
    Idle,
    Panning {
        last: ScreenPoint,
    },
    DraggingHandle(DragSession),
}

/// A handle being dragged, from press to release
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub handle: HandleRef,
    /// Version of the shape set the handle was resolved against
    pub version: u64,
    current: ShapeRecord,
    /// Last valid basis; kept when calibration drops out mid-drag
    basis: CalibrationBasis,
    moved: bool,
}

impl DragSession {
    /// Begin a drag; refused without a valid basis or with a mismatched handle
    pub fn start(
        handle: HandleRef,
        record: ShapeRecord,
        version: u64,
        basis: CalibrationBasis,
    ) -> Option<Self> {
        if !basis.is_valid() || record.kind() != handle.kind || !handle.is_well_formed() {
            return None;
        }
        Some(Self {
            handle,
            version,
            current: record,
            basis,
            moved: false,
        })
    }

    /// Candidate geometry as it would be written on release
    pub fn current(&self) -> ShapeRecord {
        self.current
    }

    /// Follow the pointer; `basis` replaces the stored one only while valid
    pub fn update(&mut self, pointer: ScreenPoint, basis: &CalibrationBasis, snap: SnapSetting) -> bool {
        if basis.is_valid() {
            self.basis = *basis;
        }
        let Some(world) = self.basis.screen_to_world(pointer) else {
            return false;
        };
        self.drag_to(world, snap)
    }

    /// Move the handle to a document position
    pub fn drag_to(&mut self, world: WorldPoint, snap: SnapSetting) -> bool {
        let next = dragged(self.current, self.handle.sub, world, snap);
        let changed = next != self.current;
        self.current = next;
        self.moved = true;
        changed
    }

    /// The finalized edit for this drag; a press without motion writes nothing
    pub fn finish(self) -> Option<ShapeEdit> {
        if !self.moved {
            log::debug!("drag {} released without motion", self.handle);
            return None;
        }
        Some(ShapeEdit {
            handle: self.handle,
            version: self.version,
            values: edit_values(&self.current, self.handle.sub)?,
        })
    }
}

/// Geometry after dragging one handle of `record` to `world`
pub fn dragged(record: ShapeRecord, sub: Option<SubHandle>, world: WorldPoint, snap: SnapSetting) -> ShapeRecord {
    match (record, sub) {
        (ShapeRecord::Point(mut p), _) => {
            p.at = snap.point(world);
            ShapeRecord::Point(p)
        }
        (ShapeRecord::Circle(mut c), _) => {
            c.radius = snap.radius(world.distance(c.center));
            ShapeRecord::Circle(c)
        }
        (ShapeRecord::Ellipse(mut e), Some(SubHandle::RadiusY)) => {
            e.ry = snap.radius((world.y - e.center.y).abs());
            ShapeRecord::Ellipse(e)
        }
        (ShapeRecord::Ellipse(mut e), _) => {
            e.rx = snap.radius((world.x - e.center.x).abs());
            ShapeRecord::Ellipse(e)
        }
        (ShapeRecord::Rectangle(mut r), _) => {
            r.corner = snap.point(world);
            ShapeRecord::Rectangle(r)
        }
        (ShapeRecord::CubicCurve(mut c), Some(SubHandle::Control2)) => {
            c.control2 = snap.point(world);
            ShapeRecord::CubicCurve(c)
        }
        (ShapeRecord::CubicCurve(mut c), _) => {
            c.control1 = snap.point(world);
            ShapeRecord::CubicCurve(c)
        }
    }
}

/// Values an edit of this handle writes back
pub fn edit_values(record: &ShapeRecord, sub: Option<SubHandle>) -> Option<EditValues> {
    match (record, sub) {
        (ShapeRecord::Point(p), None) => Some(EditValues::Position(p.at)),
        (ShapeRecord::Circle(c), None) => Some(EditValues::Radius(c.radius)),
        (ShapeRecord::Ellipse(e), Some(SubHandle::RadiusX | SubHandle::RadiusY)) => {
            Some(EditValues::Radii { rx: e.rx, ry: e.ry })
        }
        (ShapeRecord::Rectangle(r), None) => Some(EditValues::Position(r.corner)),
        (ShapeRecord::CubicCurve(c), Some(SubHandle::Control1)) => Some(EditValues::Position(c.control1)),
        (ShapeRecord::CubicCurve(c), Some(SubHandle::Control2)) => Some(EditValues::Position(c.control2)),
        _ => None,
    }
}
