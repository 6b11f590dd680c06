//! Document preparation before rendering
//!
//! The source the user sees is never modified; the compiler gets a copy with
//! a background grid right after the opening `tikzpicture` and the three
//! calibration markers right before the last closing one.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::calibration::Marker;
use crate::extract::format_number;

const END_TIKZ: &str = r"\end{tikzpicture}";

fn begin_tikz() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\begin\{tikzpicture\}(?:\[[^\]]*\])?").expect("valid regex"))
}

/// Background grid drawn into the render
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GridSettings {
    /// Grid step in millimetres; 0 draws no grid
    pub step_mm: u32,
    /// Total extent in centimetres, centred on the origin
    pub extent_cm: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self::new(10, 20)
    }
}

impl GridSettings {
    pub fn new(step_mm: u32, extent_cm: u32) -> Self {
        Self {
            step_mm,
            extent_cm: extent_cm.clamp(20, 100),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.step_mm > 0
    }

    fn block(&self) -> String {
        let mut out = String::from("\n  % tikzdrag preview grid\n");
        if !self.is_enabled() {
            return out;
        }
        let half = self.extent_cm as f64 / 2.0;
        let (lo, hi) = (format_number(-half), format_number(half));
        if self.step_mm != 10 {
            let step = format_number(self.step_mm as f64 / 10.0);
            out.push_str(&format!(
                "  \\draw[step={step}, gray!18, very thin] ({lo},{lo}) grid ({hi},{hi});\n"
            ));
        }
        out.push_str(&format!("  \\draw[step=1, gray!38, thin] ({lo},{lo}) grid ({hi},{hi});\n"));
        out.push_str(&format!("  \\draw[gray!50, thin] ({lo},0) -- ({hi},0);\n"));
        out.push_str(&format!("  \\draw[gray!50, thin] (0,{lo}) -- (0,{hi});\n"));
        out
    }
}

/// The three calibration marker fills
pub fn marker_block() -> String {
    let mut out = String::from("\n  % tikzdrag calibration markers (top layer)\n");
    for marker in Marker::ALL {
        let [r, g, b] = marker.rgb();
        let at = marker.position();
        out.push_str(&format!(
            "  \\fill[draw=none,fill={{rgb,255:red,{r};green,{g};blue,{b}}}] ({},{}) circle[radius=1.2pt];\n",
            format_number(at.x),
            format_number(at.y)
        ));
    }
    out
}

/// Whether the source has a drawing block markers can go into
pub fn has_drawing_block(source: &str) -> bool {
    begin_tikz().is_match(source) && source.contains(END_TIKZ)
}

/// Copy of `source` with grid and markers injected; unchanged without a drawing block
pub fn prepare_for_render(source: &str, grid: GridSettings) -> String {
    let Some(begin) = begin_tikz().find(source) else {
        log::debug!("no tikzpicture block, rendering without markers");
        return source.to_string();
    };
    let Some(end) = source.rfind(END_TIKZ) else {
        log::debug!("no closing tikzpicture, rendering without markers");
        return source.to_string();
    };
    if end < begin.end() {
        return source.to_string();
    }

    let grid_block = grid.block();
    let markers = marker_block();
    let mut out = String::with_capacity(source.len() + grid_block.len() + markers.len());
    out.push_str(&source[..begin.end()]);
    out.push_str(&grid_block);
    out.push_str(&source[begin.end()..end]);
    out.push_str(&markers);
    out.push_str(&source[end..]);
    out
}

/// Standalone document around a drawing body
pub fn wrap_tikz_document(body: &str) -> String {
    format!(
        "\\documentclass[tikz,border=10pt]{{standalone}}\n\
         \\usepackage{{tikz}}\n\
         \\begin{{document}}\n\
         \\begin{{tikzpicture}}\n\
         {body}\
         \\end{{tikzpicture}}\n\
         \\end{{document}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    #[test]
    fn test_wrap_document() {
        let doc = wrap_tikz_document("  \\draw (0,0) -- (1,1);\n");
        assert!(doc.starts_with("\\documentclass[tikz,border=10pt]{standalone}\n"));
        assert!(doc.contains("\\begin{tikzpicture}\n  \\draw (0,0) -- (1,1);\n\\end{tikzpicture}\n"));
        assert!(doc.ends_with("\\end{document}\n"));
    }

    #[test]
    fn test_markers_go_before_last_end() {
        let doc = wrap_tikz_document("  \\draw (0,0) circle (1);\n");
        let prepared = prepare_for_render(&doc, GridSettings::default());
        let markers = prepared.find("rgb,255:red,253;green,17;blue,251").expect("origin marker");
        let draw = prepared.find("circle (1)").expect("user drawing");
        let end = prepared.rfind(END_TIKZ).expect("end");
        assert!(draw < markers && markers < end);
        assert!(prepared.contains("{rgb,255:red,19;green,251;blue,233}] (1,0) circle[radius=1.2pt];"));
        assert!(prepared.contains("{rgb,255:red,241;green,251;blue,17}] (0,1) circle[radius=1.2pt];"));
    }

    #[test]
    fn test_grid_follows_begin_with_options() {
        let src = "\\begin{tikzpicture}[scale=2]\n\\draw (0,0);\n\\end{tikzpicture}";
        let prepared = prepare_for_render(src, GridSettings::new(5, 20));
        assert!(prepared.starts_with("\\begin{tikzpicture}[scale=2]\n  % tikzdrag preview grid\n"));
        assert!(prepared.contains("\\draw[step=0.5, gray!18, very thin] (-10,-10) grid (10,10);"));
        assert!(prepared.contains("\\draw[step=1, gray!38, thin] (-10,-10) grid (10,10);"));
        assert!(prepared.contains("\\draw[gray!50, thin] (0,-10) -- (0,10);"));
    }

    #[test]
    fn test_centimetre_grid_has_no_fine_lines() {
        let src = wrap_tikz_document("");
        let prepared = prepare_for_render(&src, GridSettings::new(10, 35));
        assert!(!prepared.contains("very thin"));
        assert!(prepared.contains("(-17.5,-17.5) grid (17.5,17.5)"));
    }

    #[test]
    fn test_free_hand_draws_no_grid() {
        let prepared = prepare_for_render(&wrap_tikz_document(""), GridSettings::new(0, 20));
        assert!(!prepared.contains("grid ("));
        assert!(prepared.contains("circle[radius=1.2pt]"));
    }

    #[test]
    fn test_source_without_block_is_untouched() {
        let src = "\\draw (0,0) -- (1,1);";
        assert!(!has_drawing_block(src));
        assert_eq!(prepare_for_render(src, GridSettings::default()), src);
    }

    #[test]
    fn test_blocks_are_newline_terminated_lines() {
        let markers = marker_block();
        assert_eq!(markers.lines().filter(|l| l.contains("\\fill[")).count(), 3);
        assert!(markers.ends_with("circle[radius=1.2pt];\n"));

        let grid = GridSettings::new(5, 20).block();
        assert_eq!(grid.lines().filter(|l| l.contains("\\draw[")).count(), 4);
        assert!(grid.ends_with("(0,-10) -- (0,10);\n"));
    }

    #[test]
    fn test_extent_is_clamped() {
        assert_eq!(GridSettings::new(10, 5).extent_cm, 20);
        assert_eq!(GridSettings::new(10, 300).extent_cm, 100);
    }

    #[test]
    fn test_injected_markers_are_not_extracted_from_user_text() {
        // Extraction runs on the text as typed; the marker literals only exist in the render copy
        let doc = wrap_tikz_document("  \\draw (2,3) -- (4,5);\n");
        assert_eq!(extract(&doc).points.len(), 2);
        assert!(extract(&prepare_for_render(&doc, GridSettings::default())).points.len() > 2);
    }
}
