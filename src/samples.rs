//! Built-in example documents

use crate::compile::wrap_tikz_document;
use crate::error::{Error, Result};

/// Example name and picture body
const EXAMPLES: &[(&str, &str)] = &[
    ("line", "  \\draw[thick] (0,0) -- (4,2);\n"),
    (
        "polyline",
        "  \\draw[blue,dashed,thick,->] (0,0) -- (1,1.5) -- (2.2,0.3) -- (3.8,1.8);\n",
    ),
    ("circle", "  \\draw[thick] (0,0) circle (1.5);\n"),
    ("rectangle", "  \\draw[thick] (-1.5,-1) rectangle (2,1.2);\n"),
    ("ellipse", "  \\draw[thick] (0,0) ellipse (2 and 1);\n"),
    (
        "bezier",
        "  \\draw[blue,thick] (0,0) .. controls (1.5,2.0) and (3.0,-1.0) .. (4.0,1.0);\n",
    ),
    (
        "mixed",
        concat!(
            "  \\draw[->,thick] (-1.5,0) -- (10.5,0);\n",
            "  \\draw[->,thick] (0,-1.5) -- (0,6.0);\n",
            "  \\draw[blue,dashed,thick,->] (0.5,0.4) -- (2.0,2.2) -- (4.2,0.9) -- (6.8,2.8);\n",
            "  \\draw[thick] (2.4,1.1) circle (0.9);\n",
            "  \\draw[thick] (6.6,2.7) ellipse (1.8 and 0.8);\n",
            "  \\draw[thick] (7.4,-0.8) rectangle (9.8,1.4);\n",
            "  \\draw[red,thick] (1.0,4.2) .. controls (3.2,5.4) and (5.9,2.2) .. (8.8,4.8);\n",
            "  \\node at (9.3,5.4) {KTikZ};\n",
        ),
    ),
];

/// Names accepted by [`example`], in menu order
pub fn example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES.iter().map(|(name, _)| *name)
}

/// Full standalone document for one example
pub fn example(name: &str) -> Result<String> {
    EXAMPLES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, body)| wrap_tikz_document(body))
        .ok_or_else(|| Error::UnknownExample(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    #[test]
    fn test_every_example_has_handles() {
        for name in example_names() {
            let doc = example(name).unwrap();
            let shapes = extract(&doc);
            assert!(!shapes.is_empty(), "{name} has no editable shapes");
        }
    }

    #[test]
    fn test_mixed_example_covers_every_kind() {
        let shapes = extract(&example("mixed").unwrap());
        assert_eq!(shapes.circles.len(), 1);
        assert_eq!(shapes.ellipses.len(), 1);
        assert_eq!(shapes.rectangles.len(), 1);
        assert_eq!(shapes.curves.len(), 1);
        assert!(!shapes.points.is_empty());
    }

    #[test]
    fn test_lookup_ignores_case_and_rejects_unknown() {
        assert!(example("Bezier").is_ok());
        assert!(matches!(example("spiral"), Err(Error::UnknownExample(name)) if name == "spiral"));
    }
}
