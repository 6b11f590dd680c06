//! Handle identities and the finalized edits a drag produces

use serde::Serialize;

use super::geometry::WorldPoint;
use super::shape::ShapeKind;

/// Which part of a multi-handle shape is addressed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubHandle {
    /// Ellipse horizontal radius handle at (cx + rx, cy)
    RadiusX,
    /// Ellipse vertical radius handle at (cx, cy + ry)
    RadiusY,
    /// First curve control point
    Control1,
    /// Second curve control point
    Control2,
}

impl SubHandle {
    pub fn name(self) -> &'static str {
        match self {
            SubHandle::RadiusX => "rx",
            SubHandle::RadiusY => "ry",
            SubHandle::Control1 => "c1",
            SubHandle::Control2 => "c2",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rx" => Some(SubHandle::RadiusX),
            "ry" => Some(SubHandle::RadiusY),
            "c1" | "1" => Some(SubHandle::Control1),
            "c2" | "2" => Some(SubHandle::Control2),
            _ => None,
        }
    }
}

/// Identity of one draggable handle: shape kind, per-kind index, sub-handle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct HandleRef {
    pub kind: ShapeKind,
    pub index: usize,
    pub sub: Option<SubHandle>,
}

impl HandleRef {
    pub fn new(kind: ShapeKind, index: usize, sub: Option<SubHandle>) -> Self {
        Self { kind, index, sub }
    }

    /// Parse `kind:index[:sub]`, e.g. `curve:0:c2` or `circle:1`
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(':');
        let kind = ShapeKind::from_name(parts.next()?)?;
        let index = parts.next()?.parse().ok()?;
        let sub = match parts.next() {
            Some(name) => Some(SubHandle::from_name(name)?),
            None => None,
        };
        if parts.next().is_some() {
            return None;
        }
        let handle = Self::new(kind, index, sub);
        handle.is_well_formed().then_some(handle)
    }

    /// Whether the sub-handle matches what the kind exposes
    pub fn is_well_formed(&self) -> bool {
        matches!(
            (self.kind, self.sub),
            (ShapeKind::Point, None)
                | (ShapeKind::Circle, None)
                | (ShapeKind::Rectangle, None)
                | (ShapeKind::Ellipse, Some(SubHandle::RadiusX | SubHandle::RadiusY))
                | (ShapeKind::CubicCurve, Some(SubHandle::Control1 | SubHandle::Control2))
        )
    }
}

impl std::fmt::Display for HandleRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind.name(), self.index)?;
        if let Some(sub) = self.sub {
            write!(f, ":{}", sub.name())?;
        }
        Ok(())
    }
}

/// Final values carried by an edit
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum EditValues {
    /// A point, a rectangle corner or a curve control point
    Position(WorldPoint),
    /// Circle radius
    Radius(f64),
    /// Both ellipse radii
    Radii { rx: f64, ry: f64 },
}

/// One finalized drag: emitted once on release, never on intermediate moves
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ShapeEdit {
    pub handle: HandleRef,
    /// Version of the shape set the handle's spans came from
    pub version: u64,
    pub values: EditValues,
}
