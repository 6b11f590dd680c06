//! Properties of the selected shape
//!
//! A selection names one shape by kind and per-kind index. Its geometry is
//! edited as typed values written into the shape's literal spans; its style
//! is the option list of the `\draw` or `\node` command that contains it.

pub mod style;

pub use style::{Cap, CommandKind, LineStyle, StyleSettings, Thickness, command_span, read_style, restyle_command};

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    ByteSpan, HandleRef, PairSpans, ShapeKind, ShapeRecord, ShapeSet, TextSnapshot, WorldPoint,
};
use crate::patch::{PatchError, literal_replacement, patch_spans};
use crate::surface::MIN_RADIUS;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("no shape is selected")]
    NoSelection,

    #[error("selected shape {0} no longer exists")]
    MissingShape(HandleRef),

    #[error("{} values do not fit selected shape {selected}", .values.name())]
    KindMismatch { selected: HandleRef, values: ShapeKind },

    #[error("no \\draw or \\node command contains {0}")]
    NoCommand(HandleRef),

    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Editable geometry of one shape, per kind
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryValues {
    Point { at: WorldPoint },
    Circle { center: WorldPoint, radius: f64 },
    Ellipse { center: WorldPoint, rx: f64, ry: f64 },
    Rectangle { anchor: WorldPoint, corner: WorldPoint },
    /// Curve end points follow the path and are not edited here
    CubicCurve { control1: WorldPoint, control2: WorldPoint },
}

impl GeometryValues {
    pub fn of(record: &ShapeRecord) -> Self {
        match record {
            ShapeRecord::Point(p) => GeometryValues::Point { at: p.at },
            ShapeRecord::Circle(c) => GeometryValues::Circle {
                center: c.center,
                radius: c.radius,
            },
            ShapeRecord::Ellipse(e) => GeometryValues::Ellipse {
                center: e.center,
                rx: e.rx,
                ry: e.ry,
            },
            ShapeRecord::Rectangle(r) => GeometryValues::Rectangle {
                anchor: r.anchor,
                corner: r.corner,
            },
            ShapeRecord::CubicCurve(c) => GeometryValues::CubicCurve {
                control1: c.control1,
                control2: c.control2,
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            GeometryValues::Point { .. } => ShapeKind::Point,
            GeometryValues::Circle { .. } => ShapeKind::Circle,
            GeometryValues::Ellipse { .. } => ShapeKind::Ellipse,
            GeometryValues::Rectangle { .. } => ShapeKind::Rectangle,
            GeometryValues::CubicCurve { .. } => ShapeKind::CubicCurve,
        }
    }
}

/// Everything a properties view shows for one selection
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Properties {
    pub selection: HandleRef,
    pub geometry: GeometryValues,
    /// `None` when the shape is not inside a `\draw` or `\node` command
    pub command: Option<CommandKind>,
    pub style: Option<StyleSettings>,
}

fn resolve(snapshot: &TextSnapshot, shapes: &ShapeSet, selection: HandleRef) -> Result<ShapeRecord, PropertyError> {
    if shapes.version != snapshot.version() {
        return Err(PatchError::StaleSnapshot {
            spans: shapes.version,
            text: snapshot.version(),
        }
        .into());
    }
    shapes
        .get(selection.kind, selection.index)
        .ok_or(PropertyError::MissingShape(selection))
}

/// Byte offset that places a shape inside its command
fn anchor(record: &ShapeRecord) -> usize {
    match record {
        ShapeRecord::Point(p) => p.spans.x.start,
        ShapeRecord::Circle(c) => c.radius_span.start,
        ShapeRecord::Ellipse(e) => e.rx_span.start,
        ShapeRecord::Rectangle(r) => r.corner_spans.x.start,
        ShapeRecord::CubicCurve(c) => c.control1_spans.x.start,
    }
}

fn pair(spans: PairSpans, at: WorldPoint) -> Result<[(ByteSpan, String); 2], PatchError> {
    Ok([literal_replacement(spans.x, at.x)?, literal_replacement(spans.y, at.y)?])
}

/// Radii below the drag floor are raised to it
fn radius(span: ByteSpan, value: f64) -> Result<(ByteSpan, String), PatchError> {
    if !value.is_finite() {
        return Err(PatchError::NonFinite(value));
    }
    literal_replacement(span, value.max(MIN_RADIUS))
}

fn geometry_replacements(
    record: &ShapeRecord,
    selection: HandleRef,
    values: GeometryValues,
) -> Result<Vec<(ByteSpan, String)>, PropertyError> {
    let mut out = Vec::with_capacity(4);
    match (record, values) {
        (ShapeRecord::Point(p), GeometryValues::Point { at }) => out.extend(pair(p.spans, at)?),
        (ShapeRecord::Circle(c), GeometryValues::Circle { center, radius: r }) => {
            out.extend(pair(c.center_spans, center)?);
            out.push(radius(c.radius_span, r)?);
        }
        (ShapeRecord::Ellipse(e), GeometryValues::Ellipse { center, rx, ry }) => {
            out.extend(pair(e.center_spans, center)?);
            out.push(radius(e.rx_span, rx)?);
            out.push(radius(e.ry_span, ry)?);
        }
        (ShapeRecord::Rectangle(r), GeometryValues::Rectangle { anchor, corner }) => {
            out.extend(pair(r.anchor_spans, anchor)?);
            out.extend(pair(r.corner_spans, corner)?);
        }
        (ShapeRecord::CubicCurve(c), GeometryValues::CubicCurve { control1, control2 }) => {
            out.extend(pair(c.control1_spans, control1)?);
            out.extend(pair(c.control2_spans, control2)?);
        }
        (_, values) => {
            return Err(PropertyError::KindMismatch {
                selected: selection,
                values: values.kind(),
            });
        }
    }
    Ok(out)
}

/// Geometry and style of the selected shape
pub fn properties(
    snapshot: &TextSnapshot,
    shapes: &ShapeSet,
    selection: HandleRef,
) -> Result<Properties, PropertyError> {
    let record = resolve(snapshot, shapes, selection)?;
    let styled = command_span(snapshot.text(), anchor(&record))
        .and_then(|span| read_style(&snapshot.text()[span.start..span.end]));
    let (command, style) = styled.map_or((None, None), |(kind, style)| (Some(kind), Some(style)));
    Ok(Properties {
        selection,
        geometry: GeometryValues::of(&record),
        command,
        style,
    })
}

/// Write typed geometry into the selected shape's literals
pub fn apply_geometry(
    snapshot: &TextSnapshot,
    shapes: &ShapeSet,
    selection: HandleRef,
    values: GeometryValues,
) -> Result<String, PropertyError> {
    let record = resolve(snapshot, shapes, selection)?;
    let mut replacements = geometry_replacements(&record, selection, values)?;
    let patched = patch_spans(snapshot.text(), &mut replacements)?;
    log::debug!("geometry of {selection}: {} span(s) rewritten", replacements.len());
    Ok(patched)
}

/// Rewrite the option list of the command holding the selected shape
pub fn apply_style(
    snapshot: &TextSnapshot,
    shapes: &ShapeSet,
    selection: HandleRef,
    style: &StyleSettings,
) -> Result<String, PropertyError> {
    let record = resolve(snapshot, shapes, selection)?;
    let text = snapshot.text();
    let span = command_span(text, anchor(&record)).ok_or(PropertyError::NoCommand(selection))?;
    let command = restyle_command(&text[span.start..span.end], style).ok_or(PropertyError::NoCommand(selection))?;
    let mut out = text.to_string();
    out.replace_range(span.start..span.end, &command);
    log::debug!("style of {selection}: {command}");
    Ok(out)
}
