//! Invariant-culture scalar formatting and parsing
//!
//! The game server only understands `.` as a decimal separator and
//! `True`/`False` booleans. Rust's formatting machinery never consults the
//! host locale, so everything here is culture-invariant by construction.

use crate::{AsmError, Result};
use std::borrow::Cow;

/// Maximum fractional digits written for a float (`0.0#########`)
pub const MAX_FLOAT_DECIMALS: usize = 10;

/// Format a float with the `0.0#########` pattern.
///
/// At most ten fractional digits, trailing zeros trimmed, but always at
/// least one digit after the point: `1.0` -> `"1.0"`, `0.25` -> `"0.25"`.
pub fn format_float(value: f32) -> String {
    let mut text = round_to_decimals(value, MAX_FLOAT_DECIMALS);
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// Format a float in its shortest form with no forced fraction:
/// `1.0` -> `"1"`, `2.5` -> `"2.5"`.
pub fn format_float_compact(value: f32) -> String {
    round_to_decimals(value, MAX_FLOAT_DECIMALS)
}

fn round_to_decimals(value: f32, max_decimals: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    // Display on floats gives the shortest round-trip digits and never an exponent.
    let shortest = value.to_string();
    let text = match shortest.split_once('.') {
        Some((_, fraction)) if fraction.len() > max_decimals => {
            let exact = shortest.parse::<f64>().unwrap_or_else(|_| f64::from(value));
            format!("{:.*}", max_decimals, exact)
        }
        _ => shortest,
    };

    trim_fraction(text)
}

fn trim_fraction(mut text: String) -> String {
    if text.contains('.') {
        while text.ends_with('0') {
            text.pop();
        }
        if text.ends_with('.') {
            text.pop();
        }
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

pub fn format_int(value: i32) -> String {
    value.to_string()
}

pub fn format_bool(value: bool) -> String {
    if value { "True" } else { "False" }.to_string()
}

pub fn parse_float(text: &str) -> Result<f32> {
    let trimmed = text.trim();
    match trimmed.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid(text, "float")),
    }
}

pub fn parse_int(text: &str) -> Result<i32> {
    text.trim().parse::<i32>().map_err(|_| invalid(text, "integer"))
}

pub fn parse_bool(text: &str) -> Result<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(invalid(text, "boolean"))
    }
}

/// Strip one pair of surrounding double quotes, if both are present.
///
/// Inside the quotes `\"` and `\\` stand for `"` and `\`; any other
/// backslash is kept as written.
pub fn unquote(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    if !(trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"')) {
        return Cow::Borrowed(trimmed);
    }

    let inner = &trimmed[1..trimmed.len() - 1];
    if !inner.contains('\\') {
        return Cow::Borrowed(inner);
    }

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next == '"' || next == '\\' => {
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Wrap text in double quotes, escaping embedded `"` and `\`
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn invalid(text: &str, expected: &'static str) -> AsmError {
    AsmError::InvalidScalar {
        value: text.to_string(),
        expected,
    }
}

/// A primitive that can live in a single INI value
pub trait IniScalar: Clone + PartialEq + std::fmt::Debug {
    /// Human-readable type name used in error messages
    const KIND: &'static str;

    fn to_ini(&self) -> String;

    fn from_ini(text: &str) -> Result<Self>;
}

impl IniScalar for f32 {
    const KIND: &'static str = "float";

    fn to_ini(&self) -> String {
        format_float_compact(*self)
    }

    fn from_ini(text: &str) -> Result<Self> {
        parse_float(text)
    }
}

impl IniScalar for i32 {
    const KIND: &'static str = "integer";

    fn to_ini(&self) -> String {
        format_int(*self)
    }

    fn from_ini(text: &str) -> Result<Self> {
        parse_int(text)
    }
}

impl IniScalar for bool {
    const KIND: &'static str = "boolean";

    fn to_ini(&self) -> String {
        format_bool(*self)
    }

    fn from_ini(text: &str) -> Result<Self> {
        parse_bool(text)
    }
}

impl IniScalar for String {
    const KIND: &'static str = "string";

    fn to_ini(&self) -> String {
        self.clone()
    }

    fn from_ini(text: &str) -> Result<Self> {
        Ok(unquote(text).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_pattern_keeps_one_decimal() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "0.0");
        assert_eq!(format_float(1500.0), "1500.0");
    }

    #[test]
    fn test_float_pattern_rounds_to_ten_decimals() {
        assert_eq!(format_float(0.000_000_000_01), "0.0");
        assert_eq!(format_float(0.000_001), "0.000001");
    }

    #[test]
    fn test_compact_float() {
        assert_eq!(format_float_compact(1.0), "1");
        assert_eq!(format_float_compact(3.0), "3");
        assert_eq!(format_float_compact(0.25), "0.25");
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_float(" 1.5 ").unwrap(), 1.5);
        assert_eq!(parse_float("2").unwrap(), 2.0);
        assert_eq!(parse_int("42").unwrap(), 42);
        assert!(parse_bool("TRUE").unwrap());
        assert!(!parse_bool("false").unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_float("1,5"),
            Err(AsmError::InvalidScalar { expected: "float", .. })
        ));
        assert!(parse_float("NaN").is_err());
        assert!(parse_int("1.0").is_err());
        assert!(parse_bool("yes").is_err());
    }

    #[test]
    fn test_unquote_requires_both_quotes() {
        assert_eq!(unquote("\"Raptor_C\""), "Raptor_C");
        assert_eq!(unquote("\"Raptor_C"), "\"Raptor_C");
        assert_eq!(unquote("Raptor_C"), "Raptor_C");
        assert_eq!(unquote("\"\""), "");
    }

    #[test]
    fn test_quote_escapes_embedded_quotes() {
        let text = r#"Weird"Name\_C"#;
        let quoted = quote(text);
        assert_eq!(quoted, r#""Weird\"Name\\_C""#);
        assert_eq!(unquote(&quoted), text);
        assert_eq!(unquote(r#""C:\Servers\Ark""#), r"C:\Servers\Ark");
    }
}
