//! Shape extraction from document text
//!
//! A pattern-based scan, not a parser: each recognised primitive becomes a
//! typed record holding its values and the byte spans of its editable
//! literals. The scan is pure and may be repeated on any text; it must run
//! on the text as typed, before calibration markers are injected.

pub mod number;
pub mod patterns;

pub use number::{format_number, parse_literal};

use regex::Captures;

use crate::domain::{
    ByteSpan, CircleShape, CurveShape, EllipseShape, PairSpans, PointShape, RectangleShape,
    ShapeSet, TextSnapshot, WorldPoint,
};

/// Statement terminator that resets curve start-point inheritance
const STATEMENT_END: char = ';';

/// Scan a snapshot; the result is tagged with the snapshot's version
pub fn extract_snapshot(snapshot: &TextSnapshot) -> ShapeSet {
    let mut set = extract(snapshot.text());
    set.version = snapshot.version();
    set
}

/// Scan raw text into per-kind ordered shape lists (version 0)
pub fn extract(text: &str) -> ShapeSet {
    let set = ShapeSet {
        version: 0,
        points: extract_points(text),
        circles: extract_circles(text),
        ellipses: extract_ellipses(text),
        rectangles: extract_rectangles(text),
        curves: extract_curves(text),
    };
    log::debug!(
        "extracted {} points, {} circles, {} ellipses, {} rectangles, {} curves",
        set.points.len(),
        set.circles.len(),
        set.ellipses.len(),
        set.rectangles.len(),
        set.curves.len()
    );
    set
}

/// Value and span of one named literal, if present and parseable
fn literal(caps: &Captures<'_>, name: &str) -> Option<(f64, ByteSpan)> {
    let m = caps.name(name)?;
    let value = parse_literal(m.as_str());
    if value.is_none() {
        log::debug!("dropping match: literal {:?} does not parse", m.as_str());
    }
    Some((value?, ByteSpan::new(m.start(), m.end())))
}

/// A literal pair; both halves must parse
fn literal_pair(caps: &Captures<'_>, x: &str, y: &str) -> Option<(WorldPoint, PairSpans)> {
    let (xv, xs) = literal(caps, x)?;
    let (yv, ys) = literal(caps, y)?;
    Some((WorldPoint::new(xv, yv), PairSpans { x: xs, y: ys }))
}

fn extract_points(text: &str) -> Vec<PointShape> {
    patterns::point()
        .captures_iter(text)
        .filter_map(|caps| {
            let (at, spans) = literal_pair(&caps, "x", "y")?;
            Some(PointShape { at, spans })
        })
        .collect()
}

fn extract_circles(text: &str) -> Vec<CircleShape> {
    patterns::circle()
        .captures_iter(text)
        .filter_map(|caps| {
            let (center, center_spans) = literal_pair(&caps, "cx", "cy")?;
            let (radius, radius_span) = literal(&caps, "r")?;
            Some(CircleShape {
                center,
                radius,
                center_spans,
                radius_span,
            })
        })
        .collect()
}

fn extract_ellipses(text: &str) -> Vec<EllipseShape> {
    patterns::ellipse()
        .captures_iter(text)
        .filter_map(|caps| {
            let (center, center_spans) = literal_pair(&caps, "cx", "cy")?;
            let (rx, rx_span) = literal(&caps, "rx")?;
            let (ry, ry_span) = literal(&caps, "ry")?;
            Some(EllipseShape {
                center,
                rx,
                ry,
                center_spans,
                rx_span,
                ry_span,
            })
        })
        .collect()
}

fn extract_rectangles(text: &str) -> Vec<RectangleShape> {
    patterns::rectangle()
        .captures_iter(text)
        .filter_map(|caps| {
            let (anchor, anchor_spans) = literal_pair(&caps, "x1", "y1")?;
            let (corner, corner_spans) = literal_pair(&caps, "x2", "y2")?;
            Some(RectangleShape {
                anchor,
                corner,
                anchor_spans,
                corner_spans,
            })
        })
        .collect()
}

/// Curve segments with start-point inheritance inside one statement
fn extract_curves(text: &str) -> Vec<CurveShape> {
    let mut curves = Vec::new();
    let mut prev_end: Option<WorldPoint> = None;
    let mut last_seg_end = 0;

    for caps in patterns::curve().captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if text[last_seg_end..whole.start()].contains(STATEMENT_END) {
            prev_end = None;
        }
        last_seg_end = whole.end();

        let end = literal_pair(&caps, "x3", "y3").map(|(p, _)| p);
        let explicit = caps.name("x0").is_some() && caps.name("y0").is_some();
        let start = if explicit {
            literal_pair(&caps, "x0", "y0").map(|(p, _)| p)
        } else {
            prev_end
        };
        let controls = literal_pair(&caps, "x1", "y1").zip(literal_pair(&caps, "x2", "y2"));

        // A later segment chains from this one's end even if this one is dropped
        prev_end = end;

        let (Some(start), Some(end), Some(((control1, control1_spans), (control2, control2_spans)))) =
            (start, end, controls)
        else {
            if !explicit && start.is_none() {
                log::debug!(
                    "dropping curve segment at byte {}: no explicit or inherited start point",
                    whole.start()
                );
            }
            continue;
        };

        curves.push(CurveShape {
            start,
            control1,
            control2,
            end,
            inherited_start: !explicit,
            control1_spans,
            control2_spans,
        });
    }
    curves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_text<'a>(text: &'a str, span: ByteSpan) -> &'a str {
        &text[span.start..span.end]
    }

    #[test]
    fn test_points_in_source_order() {
        let text = r"\draw (0,0) -- (1, 2.5) -- (-3,+4);";
        let set = extract(text);
        let coords: Vec<_> = set.points.iter().map(|p| (p.at.x, p.at.y)).collect();
        assert_eq!(coords, vec![(0.0, 0.0), (1.0, 2.5), (-3.0, 4.0)]);
        assert_eq!(span_text(text, set.points[1].spans.x), "1");
        assert_eq!(span_text(text, set.points[1].spans.y), "2.5");
        assert_eq!(span_text(text, set.points[2].spans.y), "+4");
    }

    #[test]
    fn test_circle_radius_span() {
        let text = r"\draw[thick] (2.4,1.1) circle (0.9);";
        let set = extract(text);
        assert_eq!(set.circles.len(), 1);
        let c = set.circles[0];
        assert_eq!(c.center, WorldPoint::new(2.4, 1.1));
        assert_eq!(c.radius, 0.9);
        assert_eq!(span_text(text, c.radius_span), "0.9");
        assert_eq!(span_text(text, c.center_spans.x), "2.4");
        assert_eq!(span_text(text, c.center_spans.y), "1.1");
        // The centre is also reported as a point
        assert_eq!(set.points.len(), 1);
    }

    #[test]
    fn test_ellipse_radii_spans() {
        let text = r"\draw (6.6,2.7) ellipse (1.8 and 0.8);";
        let e = extract(text).ellipses[0];
        assert_eq!((e.rx, e.ry), (1.8, 0.8));
        assert_eq!(span_text(text, e.rx_span), "1.8");
        assert_eq!(span_text(text, e.ry_span), "0.8");
        assert_eq!(span_text(text, e.center_spans.x), "6.6");
    }

    #[test]
    fn test_rectangle_anchor_and_corner() {
        let text = r"\draw (7.4,-0.8) rectangle (9.8,1.4);";
        let r = extract(text).rectangles[0];
        assert_eq!(r.anchor, WorldPoint::new(7.4, -0.8));
        assert_eq!(r.corner, WorldPoint::new(9.8, 1.4));
        assert_eq!(span_text(text, r.corner_spans.x), "9.8");
        assert_eq!(span_text(text, r.corner_spans.y), "1.4");
        assert_eq!(span_text(text, r.anchor_spans.x), "7.4");
        assert_eq!(span_text(text, r.anchor_spans.y), "-0.8");
    }

    #[test]
    fn test_curve_explicit_start() {
        let text = r"\draw (0,0) .. controls (1.5,2.0) and (3.0,-1.0) .. (4.0,1.0);";
        let set = extract(text);
        assert_eq!(set.curves.len(), 1);
        let c = set.curves[0];
        assert!(!c.inherited_start);
        assert_eq!(c.start, WorldPoint::new(0.0, 0.0));
        assert_eq!(c.control1, WorldPoint::new(1.5, 2.0));
        assert_eq!(c.control2, WorldPoint::new(3.0, -1.0));
        assert_eq!(c.end, WorldPoint::new(4.0, 1.0));
        assert_eq!(span_text(text, c.control2_spans.y), "-1.0");
    }

    #[test]
    fn test_curve_inherits_previous_end() {
        let text = "(0,0) .. controls (1,1) and (2,2) .. (3,3) .. controls (4,4) and (5,5) .. (6,6);";
        let set = extract(text);
        assert_eq!(set.curves.len(), 2);
        assert!(set.curves[1].inherited_start);
        assert_eq!(set.curves[1].start, WorldPoint::new(3.0, 3.0));
        assert_eq!(set.curves[1].end, WorldPoint::new(6.0, 6.0));
    }

    #[test]
    fn test_statement_terminator_resets_inheritance() {
        let text = "(0,0) .. controls (1,1) and (2,2) .. (3,3); .. controls (4,4) and (5,5) .. (6,6);";
        let set = extract(text);
        assert_eq!(set.curves.len(), 1);
        assert_eq!(set.curves[0].end, WorldPoint::new(3.0, 3.0));
    }

    #[test]
    fn test_inheritance_does_not_cross_statements() {
        let text = "\\draw (0,0) .. controls (1,1) and (2,2) .. (3,3);\n\
                    \\draw (9,9) .. controls (4,4) and (5,5) .. (6,6);";
        let set = extract(text);
        assert_eq!(set.curves.len(), 2);
        assert!(!set.curves[1].inherited_start);
        assert_eq!(set.curves[1].start, WorldPoint::new(9.0, 9.0));
    }

    #[test]
    fn test_unparsable_literal_drops_only_that_match() {
        let text = "(1e999, 2) -- (3, 4)";
        let set = extract(text);
        assert_eq!(set.points.len(), 1);
        assert_eq!(set.points[0].at, WorldPoint::new(3.0, 4.0));
    }

    #[test]
    fn test_extract_snapshot_carries_version() {
        let snapshot = TextSnapshot::new(7, "(1,2)");
        let set = extract_snapshot(&snapshot);
        assert_eq!(set.version, 7);
        assert_eq!(set.points.len(), 1);
    }

    #[test]
    fn test_rewriting_unchanged_values_is_stable() {
        let text = r"\draw (0.50,1) circle (2.000); \draw (1,1) rectangle (+2,3.10);";
        let first = extract(text);

        let mut spans: Vec<(ByteSpan, f64)> = Vec::new();
        for p in &first.points {
            spans.push((p.spans.x, p.at.x));
            spans.push((p.spans.y, p.at.y));
        }
        for c in &first.circles {
            spans.push((c.radius_span, c.radius));
        }
        spans.sort_by_key(|(s, _)| std::cmp::Reverse(s.start));
        spans.dedup_by_key(|(s, _)| s.start);

        let mut rewritten = text.to_string();
        for (span, value) in spans {
            rewritten.replace_range(span.start..span.end, &format_number(value));
        }
        assert_eq!(rewritten, r"\draw (0.5,1) circle (2); \draw (1,1) rectangle (2,3.1);");

        let second = extract(&rewritten);
        assert_eq!(second.points.len(), first.points.len());
        assert_eq!(second.circles.len(), first.circles.len());
        assert_eq!(second.rectangles.len(), first.rectangles.len());
        for (a, b) in first.points.iter().zip(&second.points) {
            assert_eq!(a.at, b.at);
        }
    }
}
