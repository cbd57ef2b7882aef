//! Runtime value representation
//!
//! Values are tagged: [`Value::Int`], [`Value::Decimal`], [`Value::Str`],
//! [`Value::Bool`] and [`Value::List`]. Integers and decimals mix freely in
//! arithmetic; everything else must match exactly.

use std::fmt;

/// Runtime values in the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Decimal(f64),
    Str(String),
    Bool(bool),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "INT",
            Value::Decimal(_) => "DECIMAL",
            Value::Str(_) => "STRING",
            Value::Bool(_) => "BOOL",
            Value::List(_) => "LIST",
        }
    }

    /// Numeric view of an `Int` or `Decimal`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        self.as_number().is_some()
    }

    /// Form used inside list displays: strings are quoted.
    fn repr(&self) -> String {
        match self {
            Value::Str(s) => format!("'{}'", s),
            other => other.to_string(),
        }
    }
}

/// Decimals always show a fractional part: `7.0`, `8.5`.
pub fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Decimal(d) => f.write_str(&format_decimal(*d)),
            Value::Str(s) => f.write_str(s),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::List(items) => {
                let items: Vec<String> = items.iter().map(Value::repr).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}
