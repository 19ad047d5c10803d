//! Result formatter: one display string per JSON value.

use serde_json::Value;

/// How a value is turned into display text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formattable<'a> {
    /// Returned unchanged.
    Text(&'a str),
    /// Objects and arrays: indented JSON.
    Structured(&'a Value),
    /// Numbers, booleans and `null`: plain string conversion.
    Scalar(&'a Value),
}

impl<'a> Formattable<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Formattable::Text(s),
            Value::Object(_) | Value::Array(_) => Formattable::Structured(value),
            _ => Formattable::Scalar(value),
        }
    }

    pub fn render(self) -> String {
        match self {
            Formattable::Text(s) => s.to_string(),
            Formattable::Structured(v) => {
                serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
            }
            Formattable::Scalar(v) => v.to_string(),
        }
    }
}

/// Format any JSON value for display. Total and side-effect free.
pub fn format_value(value: &Value) -> String {
    Formattable::classify(value).render()
}
