//! Text patch-back
//!
//! Writes the values of a finished drag into the exact literal spans the
//! extractor captured. Every span of an edit is validated before any byte
//! changes; replacements then run from the highest offset down so earlier
//! spans stay valid against the original text.

use thiserror::Error;

use crate::domain::{
    ByteSpan, EditValues, HandleRef, ShapeEdit, ShapeRecord, ShapeSet, SubHandle, TextSnapshot,
};
use crate::extract::{format_number, parse_literal};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("stale edit: spans belong to version {spans}, text is at version {text}")]
    StaleSnapshot { spans: u64, text: u64 },

    #[error("no shape for handle {0}")]
    UnknownShape(HandleRef),

    #[error("edit values do not fit handle {0}")]
    MismatchedValues(HandleRef),

    #[error("empty span {0:?}")]
    EmptySpan(ByteSpan),

    #[error("span {span:?} is outside text of length {len}")]
    OutOfBounds { span: ByteSpan, len: usize },

    #[error("span {0:?} does not fall on character boundaries")]
    NotCharBoundary(ByteSpan),

    #[error("spans {0:?} and {1:?} overlap")]
    Overlap(ByteSpan, ByteSpan),

    #[error("span {span:?} holds {found:?}, not a number")]
    NotALiteral { span: ByteSpan, found: String },

    #[error("value {0} is not finite")]
    NonFinite(f64),
}

/// Replace every span with its new text, or change nothing
pub fn patch_spans(text: &str, replacements: &mut [(ByteSpan, String)]) -> Result<String, PatchError> {
    for (span, _) in replacements.iter() {
        validate_span(text, *span)?;
    }
    replacements.sort_by(|a, b| b.0.start.cmp(&a.0.start));
    for pair in replacements.windows(2) {
        // Sorted descending, so only neighbours can overlap
        let (later, earlier) = (pair[0].0, pair[1].0);
        if later.overlaps(&earlier) {
            return Err(PatchError::Overlap(earlier, later));
        }
    }

    let mut out = text.to_string();
    for (span, replacement) in replacements.iter() {
        out.replace_range(span.start..span.end, replacement);
    }
    Ok(out)
}

fn validate_span(text: &str, span: ByteSpan) -> Result<(), PatchError> {
    if span.is_empty() {
        return Err(PatchError::EmptySpan(span));
    }
    if span.end > text.len() {
        return Err(PatchError::OutOfBounds {
            span,
            len: text.len(),
        });
    }
    if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
        return Err(PatchError::NotCharBoundary(span));
    }
    let found = &text[span.start..span.end];
    if parse_literal(found).is_none() {
        return Err(PatchError::NotALiteral {
            span,
            found: found.to_string(),
        });
    }
    Ok(())
}

/// Canonical text for one literal span
pub(crate) fn literal_replacement(span: ByteSpan, value: f64) -> Result<(ByteSpan, String), PatchError> {
    if !value.is_finite() {
        return Err(PatchError::NonFinite(value));
    }
    Ok((span, format_number(value)))
}

/// Span/value pairs one edit touches
pub fn edit_replacements(
    record: &ShapeRecord,
    edit: &ShapeEdit,
) -> Result<Vec<(ByteSpan, String)>, PatchError> {
    let handle = edit.handle;
    let mismatch = || PatchError::MismatchedValues(handle);
    match (record, handle.sub, edit.values) {
        (ShapeRecord::Point(p), None, EditValues::Position(at)) => Ok(vec![
            literal_replacement(p.spans.x, at.x)?,
            literal_replacement(p.spans.y, at.y)?,
        ]),
        (ShapeRecord::Circle(c), None, EditValues::Radius(r)) => Ok(vec![literal_replacement(c.radius_span, r)?]),
        (ShapeRecord::Ellipse(e), Some(SubHandle::RadiusX | SubHandle::RadiusY), EditValues::Radii { rx, ry }) => {
            Ok(vec![literal_replacement(e.rx_span, rx)?, literal_replacement(e.ry_span, ry)?])
        }
        (ShapeRecord::Rectangle(r), None, EditValues::Position(at)) => Ok(vec![
            literal_replacement(r.corner_spans.x, at.x)?,
            literal_replacement(r.corner_spans.y, at.y)?,
        ]),
        (ShapeRecord::CubicCurve(c), Some(sub @ (SubHandle::Control1 | SubHandle::Control2)), EditValues::Position(at)) => {
            let spans = if sub == SubHandle::Control1 {
                c.control1_spans
            } else {
                c.control2_spans
            };
            Ok(vec![literal_replacement(spans.x, at.x)?, literal_replacement(spans.y, at.y)?])
        }
        _ => Err(mismatch()),
    }
}

/// Apply one finished drag to the snapshot its spans were scanned from
pub fn apply_edit(
    snapshot: &TextSnapshot,
    shapes: &ShapeSet,
    edit: &ShapeEdit,
) -> Result<String, PatchError> {
    for spans in [shapes.version, edit.version] {
        if spans != snapshot.version() {
            return Err(PatchError::StaleSnapshot {
                spans,
                text: snapshot.version(),
            });
        }
    }
    let handle = edit.handle;
    let record = shapes
        .get(handle.kind, handle.index)
        .ok_or(PatchError::UnknownShape(handle))?;
    let mut replacements = edit_replacements(&record, edit)?;
    let patched = patch_spans(snapshot.text(), &mut replacements)?;
    log::debug!(
        "patched {handle}: {} span(s), {} -> {} bytes",
        replacements.len(),
        snapshot.len(),
        patched.len()
    );
    Ok(patched)
}
