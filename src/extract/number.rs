//! Numeric literal parsing and the canonical write-back format

/// Parse one numeric literal captured by the grammar
///
/// Returns `None` for anything `f64` cannot represent as a finite value,
/// which makes the caller drop the whole match.
pub fn parse_literal(literal: &str) -> Option<f64> {
    literal.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Canonical rendering used for every write-back
///
/// Four fractional digits, trailing zeros and a dangling decimal point
/// stripped, and `-0` normalised to `0`.
pub fn format_number(value: f64) -> String {
    let mut s = format!("{value:.4}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_strips_trailing_zeros() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(1.25), "1.25");
        assert_eq!(format_number(-3.1), "-3.1");
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(100.0), "100");
    }

    #[test]
    fn test_format_rounds_to_four_digits() {
        assert_eq!(format_number(1.23456), "1.2346");
        assert_eq!(format_number(0.00004), "0");
        assert_eq!(format_number(2.99999), "3");
    }

    #[test]
    fn test_format_normalises_negative_zero() {
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-0.00001), "0");
    }

    #[test]
    fn test_format_is_idempotent_through_parse() {
        let samples = [
            0.0, 1.0, -1.0, 0.1, 0.2 + 0.1, 1.23456789, -7.77775, 1e-7, 12345.678901, -0.49999,
            3.0e5, 2.0 / 3.0,
        ];
        for v in samples {
            let once = format_number(v);
            let reparsed = parse_literal(&once).expect("canonical output parses");
            assert_eq!(format_number(reparsed), once, "value {v}");
        }
    }

    #[test]
    fn test_parse_literal_forms() {
        assert_eq!(parse_literal("+1.5"), Some(1.5));
        assert_eq!(parse_literal(".5"), Some(0.5));
        assert_eq!(parse_literal("-2e3"), Some(-2000.0));
        assert_eq!(parse_literal("1E-2"), Some(0.01));
        assert_eq!(parse_literal("1e999"), None);
        assert_eq!(parse_literal("١٢"), None);
    }
}
