//! Scalar values carried by gauges and samples

use std::fmt;

use serde::Serialize;

/// A single reported value.
///
/// Counters produce `Int`, counts produce `UInt`, statistics produce
/// `Float`. Gauges may produce any variant, including non-numeric ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    /// Numeric view of the value, if it has one
    ///
    /// Booleans map to 1.0 / 0.0; text has no numeric view.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::UInt(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            Self::Text(_) => None,
        }
    }

    /// Whether the value is a number (or a boolean)
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }

    /// NaN or an infinity, which no collector accepts
    pub fn is_non_finite(&self) -> bool {
        matches!(self, Self::Float(v) if !v.is_finite())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::UInt(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", v),
            Self::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident: $($ty:ty => $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(<$conv>::from(v))
                }
            }
        )*
    };
}

impl_from!(Int: i64 => i64, i32 => i64, i16 => i64, i8 => i64);
impl_from!(UInt: u64 => u64, u32 => u64, u16 => u64, u8 => u64);
impl_from!(Float: f64 => f64, f32 => f64);
impl_from!(Bool: bool => bool);
impl_from!(Text: String => String, &str => String);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::UInt(v as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(-3i32), Value::Int(-3));
        assert_eq!(Value::from(7u8), Value::UInt(7));
        assert_eq!(Value::from(12usize), Value::UInt(12));
        assert_eq!(Value::from(1.5f32), Value::Float(1.5));
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from("up"), Value::Text("up".into()));
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(Value::Int(-2).as_f64(), Some(-2.0));
        assert_eq!(Value::Bool(true).as_f64(), Some(1.0));
        assert_eq!(Value::Bool(false).as_f64(), Some(0.0));
        assert_eq!(Value::Text("x".into()).as_f64(), None);
        assert!(!Value::Text("x".into()).is_numeric());
    }

    #[test]
    fn test_non_finite() {
        assert!(Value::Float(f64::NAN).is_non_finite());
        assert!(Value::Float(f64::INFINITY).is_non_finite());
        assert!(!Value::Float(0.5).is_non_finite());
        assert!(!Value::Int(i64::MAX).is_non_finite());
    }

    #[test]
    fn test_serialize_untagged() {
        assert_eq!(serde_json::to_string(&Value::Int(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::Float(0.25)).unwrap(), "0.25");
        assert_eq!(serde_json::to_string(&Value::Bool(false)).unwrap(), "false");
        assert_eq!(serde_json::to_string(&Value::Text("ok".into())).unwrap(), "\"ok\"");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::UInt(42).to_string(), "42");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Text("green".into()).to_string(), "green");
    }
}
