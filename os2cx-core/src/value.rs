//! # Typed Values
//!
//! Every datum the evaluator prints on its diagnostic channel is one of three
//! shapes: a number, a string or a vector of further values. [`Value`] models
//! exactly those shapes; handlers match on it exhaustively.
//!
//! The [`Display`](fmt::Display) implementation re-creates the literal syntax
//! that would produce the value, so a rendered value can be pasted back into a
//! source description (or passed as a `-D name=<literal>` define) and yields a
//! structurally equal value.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Number(f64),
    String(String),
    Vector(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Value]> {
        match self {
            Value::Vector(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the value's shape, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Vector(_) => "vector",
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Vector(items.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => write_quoted(f, s),
            Value::Vector(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn write_number(f: &mut fmt::Formatter, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("nan")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "inf" } else { "-inf" })
    } else {
        // shortest representation that parses back to the same f64
        write!(f, "{}", n)
    }
}

fn write_quoted(f: &mut fmt::Formatter, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_numbers_without_decoration() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::Number(0.5).to_string(), "0.5");
        assert_eq!(Value::Number(-2.25).to_string(), "-2.25");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::Number(f64::NAN).to_string(), "nan");
    }

    #[test]
    fn test_render_strings_quoted_and_escaped() {
        assert_eq!(Value::from("block").to_string(), "\"block\"");
        assert_eq!(
            Value::from("say \"hi\"\\\n").to_string(),
            "\"say \\\"hi\\\"\\\\\\n\""
        );
    }

    #[test]
    fn test_render_nested_vectors() {
        let value = Value::Vector(vec![
            Value::Number(1.0),
            Value::from(vec!["mm", "kg"]),
            Value::Vector(vec![]),
        ]);
        assert_eq!(value.to_string(), "[1, [\"mm\", \"kg\"], []]");
    }

    #[test]
    fn test_structural_equality() {
        let a = Value::from(vec![1.0, 2.0, 3.0]);
        let b = Value::Vector(vec![
            Value::Number(1.0),
            Value::Number(2.0),
            Value::Number(3.0),
        ]);
        assert_eq!(a, b);
        assert_ne!(a, Value::from(vec![1.0, 2.0]));
        assert_ne!(Value::from("1"), Value::Number(1.0));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::Number(2.0).as_str(), None);
        assert_eq!(Value::Number(2.0).as_number(), Some(2.0));
        assert_eq!(Value::from(vec![1.0]).as_vector().map(|v| v.len()), Some(1));
        assert_eq!(Value::from("x").type_name(), "string");
    }
}
