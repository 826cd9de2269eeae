//! Numeric literal parsing and double formatting

/// Largest magnitude printed with a fixed `.0` suffix
const FIXED_FORMAT_LIMIT: f64 = 1e16;

/// Result of interpreting a numeral lexeme
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeral {
    Integer(i32),
    Double(f64),
}

/// Runtime number produced when coercing text operands
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Double(f64),
}

/// Parse a numeral as a 32-bit integer first, then as a double.
///
/// Returns `None` for text that is neither, such as `1.2.3` or a lone `-`.
pub fn parse_numeral(text: &str) -> Option<Numeral> {
    if let Ok(value) = text.parse::<i32>() {
        return Some(Numeral::Integer(value));
    }
    parse_plain_double(text).map(Numeral::Double)
}

/// Parse operand text as a 64-bit integer, falling back to a double.
///
/// Surrounding whitespace is ignored so parameter values such as `" 5"`
/// still coerce.
pub fn parse_integer_then_double(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(value) = text.parse::<i64>() {
        return Some(Number::Integer(value));
    }
    parse_plain_double(text).map(Number::Double)
}

fn parse_plain_double(text: &str) -> Option<f64> {
    // Rust accepts "inf"/"nan" spellings that are never numerals here
    let plain = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    if !plain || !text.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Render a double the way templates print it.
///
/// Integral values keep one fractional digit (`5.0`), everything else uses
/// the shortest round-tripping representation without exponent notation.
pub fn format_double(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < FIXED_FORMAT_LIMIT {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeral_prefers_integer() {
        assert_eq!(parse_numeral("42"), Some(Numeral::Integer(42)));
        assert_eq!(parse_numeral("-7"), Some(Numeral::Integer(-7)));
        assert_eq!(parse_numeral("3.25"), Some(Numeral::Double(3.25)));
        assert_eq!(parse_numeral("-.5"), Some(Numeral::Double(-0.5)));
    }

    #[test]
    fn test_parse_numeral_overflowing_integer_becomes_double() {
        assert_eq!(
            parse_numeral("3000000000"),
            Some(Numeral::Double(3_000_000_000.0))
        );
    }

    #[test]
    fn test_parse_numeral_rejects_malformed() {
        assert_eq!(parse_numeral("1.2.3"), None);
        assert_eq!(parse_numeral("-"), None);
        assert_eq!(parse_numeral("."), None);
        assert_eq!(parse_numeral("1-2"), None);
        assert_eq!(parse_numeral("inf"), None);
    }

    #[test]
    fn test_parse_integer_then_double() {
        assert_eq!(parse_integer_then_double("5"), Some(Number::Integer(5)));
        assert_eq!(
            parse_integer_then_double("3000000000"),
            Some(Number::Integer(3_000_000_000))
        );
        assert_eq!(parse_integer_then_double(" 2.5 "), Some(Number::Double(2.5)));
        assert_eq!(parse_integer_then_double("1e3"), Some(Number::Double(1000.0)));
        assert_eq!(parse_integer_then_double("five"), None);
        assert_eq!(parse_integer_then_double("NaN"), None);
        assert_eq!(parse_integer_then_double(""), None);
    }

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(5.0), "5.0");
        assert_eq!(format_double(-2.0), "-2.0");
        assert_eq!(format_double(0.25), "0.25");
        assert_eq!(format_double(1.5e20), "150000000000000000000");
        assert_eq!(format_double(f64::INFINITY), "inf");
    }
}
