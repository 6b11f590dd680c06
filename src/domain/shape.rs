//! Shape records produced by the extractor
//!
//! Every editable numeric literal carries the [`ByteSpan`] it occupies in the
//! text snapshot it was scanned from. Spans mean nothing against any other
//! snapshot, which is why a [`ShapeSet`] remembers the snapshot version.

use serde::Serialize;

use super::geometry::WorldPoint;

/// Kinds of drawable primitives the extractor recognises
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Point,
    Circle,
    Ellipse,
    Rectangle,
    CubicCurve,
}

impl ShapeKind {
    /// All kinds, in the order handles are probed when distances tie
    pub const PROBE_ORDER: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Ellipse,
        ShapeKind::CubicCurve,
        ShapeKind::Point,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Point => "point",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::CubicCurve => "curve",
        }
    }

    /// Parse the short name used on the command line
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "point" => Some(ShapeKind::Point),
            "circle" => Some(ShapeKind::Circle),
            "ellipse" => Some(ShapeKind::Ellipse),
            "rectangle" | "rect" => Some(ShapeKind::Rectangle),
            "curve" | "bezier" => Some(ShapeKind::CubicCurve),
            _ => None,
        }
    }
}

/// Half-open `[start, end)` byte range into one text snapshot
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ByteSpan {
    pub start: usize,
    pub end: usize,
}

impl ByteSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn overlaps(&self, other: &ByteSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Spans of an `x, y` literal pair
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PairSpans {
    pub x: ByteSpan,
    pub y: ByteSpan,
}

/// `(x, y)` coordinate
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PointShape {
    pub at: WorldPoint,
    pub spans: PairSpans,
}

/// `(cx, cy) circle (r)`; the radius is the drag handle, the centre is
/// editable through properties
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CircleShape {
    pub center: WorldPoint,
    pub radius: f64,
    pub center_spans: PairSpans,
    pub radius_span: ByteSpan,
}

/// `(cx, cy) ellipse (rx and ry)`; both radii are dragged
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EllipseShape {
    pub center: WorldPoint,
    pub rx: f64,
    pub ry: f64,
    pub center_spans: PairSpans,
    pub rx_span: ByteSpan,
    pub ry_span: ByteSpan,
}

/// `(x1, y1) rectangle (x2, y2)`; the first corner is not dragged
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RectangleShape {
    pub anchor: WorldPoint,
    pub corner: WorldPoint,
    pub anchor_spans: PairSpans,
    pub corner_spans: PairSpans,
}

/// `[(x0, y0)] .. controls (x1, y1) and (x2, y2) .. (x3, y3)`
///
/// `start` is either explicit or inherited from the previous segment of the
/// same statement. Only the two control points are editable.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurveShape {
    pub start: WorldPoint,
    pub control1: WorldPoint,
    pub control2: WorldPoint,
    pub end: WorldPoint,
    pub inherited_start: bool,
    pub control1_spans: PairSpans,
    pub control2_spans: PairSpans,
}

/// One extracted primitive of any kind
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRecord {
    Point(PointShape),
    Circle(CircleShape),
    Ellipse(EllipseShape),
    Rectangle(RectangleShape),
    CubicCurve(CurveShape),
}

impl ShapeRecord {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeRecord::Point(_) => ShapeKind::Point,
            ShapeRecord::Circle(_) => ShapeKind::Circle,
            ShapeRecord::Ellipse(_) => ShapeKind::Ellipse,
            ShapeRecord::Rectangle(_) => ShapeKind::Rectangle,
            ShapeRecord::CubicCurve(_) => ShapeKind::CubicCurve,
        }
    }
}

/// Per-kind ordered shape lists scanned from one snapshot version
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ShapeSet {
    pub version: u64,
    pub points: Vec<PointShape>,
    pub circles: Vec<CircleShape>,
    pub ellipses: Vec<EllipseShape>,
    pub rectangles: Vec<RectangleShape>,
    pub curves: Vec<CurveShape>,
}

impl ShapeSet {
    /// Number of shapes of one kind
    pub fn count(&self, kind: ShapeKind) -> usize {
        match kind {
            ShapeKind::Point => self.points.len(),
            ShapeKind::Circle => self.circles.len(),
            ShapeKind::Ellipse => self.ellipses.len(),
            ShapeKind::Rectangle => self.rectangles.len(),
            ShapeKind::CubicCurve => self.curves.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        ShapeKind::PROBE_ORDER.iter().all(|k| self.count(*k) == 0)
    }

    /// Look up a shape by kind and per-kind index
    pub fn get(&self, kind: ShapeKind, index: usize) -> Option<ShapeRecord> {
        match kind {
            ShapeKind::Point => self.points.get(index).copied().map(ShapeRecord::Point),
            ShapeKind::Circle => self.circles.get(index).copied().map(ShapeRecord::Circle),
            ShapeKind::Ellipse => self.ellipses.get(index).copied().map(ShapeRecord::Ellipse),
            ShapeKind::Rectangle => self
                .rectangles
                .get(index)
                .copied()
                .map(ShapeRecord::Rectangle),
            ShapeKind::CubicCurve => self.curves.get(index).copied().map(ShapeRecord::CubicCurve),
        }
    }

    /// Replace the geometry of one shape (used for live drag previews)
    pub fn set(&mut self, index: usize, record: ShapeRecord) -> bool {
        let slot = match record {
            ShapeRecord::Point(p) => self.points.get_mut(index).map(|s| *s = p),
            ShapeRecord::Circle(c) => self.circles.get_mut(index).map(|s| *s = c),
            ShapeRecord::Ellipse(e) => self.ellipses.get_mut(index).map(|s| *s = e),
            ShapeRecord::Rectangle(r) => self.rectangles.get_mut(index).map(|s| *s = r),
            ShapeRecord::CubicCurve(c) => self.curves.get_mut(index).map(|s| *s = c),
        };
        slot.is_some()
    }
}
