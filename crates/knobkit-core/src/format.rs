//! Value formatting and parsing for display.
//!
//! [`Formatter`] converts between [`Value`]s and the strings a GUI shows in
//! value fields, tooltips and curve editors. Each parameter picks its
//! formatter from its kind and bounds; see
//! [`Parameter::display`](crate::Parameter::display).
//!
//! # Example
//!
//! ```ignore
//! use knobkit_core::format::Formatter;
//! use knobkit_core::Value;
//!
//! let f = Formatter::Float { precision: 3 };
//! assert_eq!(f.format(&Value::Double(0.5), &[]), "0.500");
//! assert_eq!(f.parse("1.25", &[]), Some(Value::Double(1.25)));
//! ```

use crate::descriptor::{ChoiceEntry, ParameterKind};
use crate::value::Value;

/// Parameter value formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// Double with fixed precision (e.g., "1.23").
    Float {
        /// Number of decimal places.
        precision: usize,
    },

    /// Whole number.
    Integer,

    /// "On" / "Off".
    Boolean,

    /// Entry symbol of a choice index.
    Choice,

    /// String shown verbatim.
    Text,
}

impl Formatter {
    /// Formatter for a kind. `decimals` only matters for double kinds.
    pub fn for_kind(kind: ParameterKind, decimals: u32) -> Self {
        match kind {
            k if k.is_double() => Formatter::Float {
                precision: decimals as usize,
            },
            k if k.is_integer() => Formatter::Integer,
            ParameterKind::Bool => Formatter::Boolean,
            ParameterKind::Choice => Formatter::Choice,
            _ => Formatter::Text,
        }
    }

    /// Format a value for display.
    ///
    /// A value of the wrong variant for this formatter is rendered with its
    /// own natural format rather than rejected; display never fails.
    pub fn format(&self, value: &Value, entries: &[ChoiceEntry]) -> String {
        match (self, value) {
            (Formatter::Float { precision }, Value::Double(v)) => {
                format!("{:.prec$}", v, prec = *precision)
            }
            (_, Value::Double(v)) => v.to_string(),
            (_, Value::Int(v)) => v.to_string(),
            (_, Value::Bool(v)) => {
                if *v {
                    "On".to_string()
                } else {
                    "Off".to_string()
                }
            }
            (_, Value::Choice(index)) => entries
                .get(*index)
                .map(|e| e.symbol.clone())
                .unwrap_or_else(|| index.to_string()),
            (_, Value::String(s)) => s.clone(),
        }
    }

    /// Parse a display string.
    ///
    /// Returns `None` if the string cannot be parsed.
    pub fn parse(&self, s: &str, entries: &[ChoiceEntry]) -> Option<Value> {
        match self {
            Formatter::Float { .. } => s.trim().parse().ok().map(Value::Double),

            Formatter::Integer => {
                let s = s.trim();
                s.parse::<i32>().ok().or_else(|| {
                    // Accept "3.0" typed into an integer field.
                    let v: f64 = s.parse().ok()?;
                    if v.fract() == 0.0 && v >= i32::MIN as f64 && v <= i32::MAX as f64 {
                        Some(v as i32)
                    } else {
                        None
                    }
                })
                .map(Value::Int)
            }

            Formatter::Boolean => match s.trim().to_lowercase().as_str() {
                "on" | "true" | "yes" | "1" | "enabled" => Some(Value::Bool(true)),
                "off" | "false" | "no" | "0" | "disabled" => Some(Value::Bool(false)),
                _ => None,
            },

            Formatter::Choice => {
                let s = s.trim();
                entries
                    .iter()
                    .position(|e| e.symbol == s)
                    .or_else(|| entries.iter().position(|e| e.symbol.eq_ignore_ascii_case(s)))
                    .or_else(|| s.parse::<usize>().ok().filter(|i| *i < entries.len()))
                    .map(Value::Choice)
            }

            Formatter::Text => Some(Value::String(s.to_string())),
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Formatter::Float { precision: 2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::StringMode;

    fn entries() -> Vec<ChoiceEntry> {
        vec![ChoiceEntry::from("Over"), ChoiceEntry::from("Multiply")]
    }

    #[test]
    fn test_for_kind() {
        assert_eq!(
            Formatter::for_kind(ParameterKind::ColorRGBA, 3),
            Formatter::Float { precision: 3 }
        );
        assert_eq!(Formatter::for_kind(ParameterKind::Vec2Int, 3), Formatter::Integer);
        assert_eq!(
            Formatter::for_kind(ParameterKind::String(StringMode::MultiLine), 0),
            Formatter::Text
        );
    }

    #[test]
    fn test_format_float_precision() {
        let f = Formatter::Float { precision: 1 };
        assert_eq!(f.format(&Value::Double(2.345), &[]), "2.3");
    }

    #[test]
    fn test_format_choice() {
        let f = Formatter::Choice;
        assert_eq!(f.format(&Value::Choice(1), &entries()), "Multiply");
        assert_eq!(f.format(&Value::Choice(7), &entries()), "7");
    }

    #[test]
    fn test_parse_integer() {
        let f = Formatter::Integer;
        assert_eq!(f.parse(" 42 ", &[]), Some(Value::Int(42)));
        assert_eq!(f.parse("3.0", &[]), Some(Value::Int(3)));
        assert_eq!(f.parse("3.5", &[]), None);
    }

    #[test]
    fn test_parse_boolean() {
        let f = Formatter::Boolean;
        assert_eq!(f.parse("On", &[]), Some(Value::Bool(true)));
        assert_eq!(f.parse("no", &[]), Some(Value::Bool(false)));
        assert_eq!(f.parse("maybe", &[]), None);
    }

    #[test]
    fn test_parse_choice() {
        let f = Formatter::Choice;
        assert_eq!(f.parse("multiply", &entries()), Some(Value::Choice(1)));
        assert_eq!(f.parse("0", &entries()), Some(Value::Choice(0)));
        assert_eq!(f.parse("2", &entries()), None);
    }
}
