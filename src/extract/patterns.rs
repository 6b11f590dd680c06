//! Regular expressions for the recognised drawing grammar
//!
//! Every numeric literal is a named capture so its byte span can be read
//! straight off the match.

use std::sync::OnceLock;

use regex::Regex;

/// Optional sign, digits with optional fraction (or a bare fraction), optional exponent
const NUM: &str = r"[+-]?(?:\d+(?:\.\d+)?|\.\d+)(?:[eE][+-]?\d+)?";

/// `( x , y )` with named captures `{x}` and `{y}`
fn pair(x: &str, y: &str) -> String {
    format!(r"\(\s*(?P<{x}>{NUM})\s*,\s*(?P<{y}>{NUM})\s*\)")
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

pub fn point() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(&pair("x", "y")))
}

pub fn circle() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(&format!(
            r"{}\s*circle\s*\(\s*(?P<r>{NUM})\s*\)",
            pair("cx", "cy")
        ))
    })
}

pub fn ellipse() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(&format!(
            r"{}\s*ellipse\s*\(\s*(?P<rx>{NUM})\s*and\s*(?P<ry>{NUM})\s*\)",
            pair("cx", "cy")
        ))
    })
}

pub fn rectangle() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(&format!(
            r"{}\s*rectangle\s*{}",
            pair("x1", "y1"),
            pair("x2", "y2")
        ))
    })
}

/// Curve segment; the leading `(x0, y0)` group is optional
pub fn curve() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(&format!(
            r"(?:{}\s*)?\.\.\s*controls\s*{}\s*and\s*{}\s*\.\.\s*{}",
            pair("x0", "y0"),
            pair("x1", "y1"),
            pair("x2", "y2"),
            pair("x3", "y3")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patterns_compile() {
        assert!(point().is_match("(1, 2)"));
        assert!(circle().is_match("(0,0) circle (1.5)"));
        assert!(ellipse().is_match("(0,0) ellipse (2 and 1)"));
        assert!(rectangle().is_match("(-1.5,-1) rectangle (2,1.2)"));
        assert!(curve().is_match(".. controls (1,1) and (2,2) .. (3,3)"));
    }

    #[test]
    fn test_number_forms_accepted_by_point() {
        for text in ["(+1,-2)", "(.5, 3.)", "(1e3,2E-2)", "( 0.25 , 4 )"] {
            let matched = point().is_match(text);
            // "3." is not a literal in this grammar
            assert_eq!(matched, text != "(.5, 3.)", "{text}");
        }
    }

    #[test]
    fn test_circle_requires_adjacent_point() {
        assert!(!circle().is_match("(0,0) -- circle (1)"));
        assert!(circle().is_match("(0,0)circle(1)"));
    }
}
