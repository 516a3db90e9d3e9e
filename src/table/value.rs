// src/table/value.rs
use chrono::NaiveDateTime;
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// Text written into null cells by the normalizer.
pub const UNKNOWN: &str = "Unknown";

/// A single cell.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDateTime),
    /// A `date` cell that could not be parsed.
    NullDate,
    /// JSON arrays and objects, kept verbatim until stringified.
    Compound(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Value::Compound(_))
    }

    /// Short type label used in column summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int64",
            Value::Float(_) => "float64",
            Value::Text(_) => "text",
            Value::Date(_) | Value::NullDate => "datetime",
            Value::Compound(_) => "compound",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            J::String(s) => Value::Text(s),
            other => Value::Compound(other),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::NullDate, Value::NullDate) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            // by serialized text, the same form they take once stringified
            (Value::Compound(a), Value::Compound(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

// Floats compare by bit pattern, so equality is total.
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null | Value::NullDate => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::Compound(c) => c.to_string().hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::NullDate => Ok(()),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S")),
            Value::Compound(c) => write!(f, "{}", c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn json_numbers_map_to_int_or_float() {
        assert_eq!(Value::from(json!(7)), Value::Int(7));
        assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::Float(u64::MAX as f64));
        assert!(Value::from(json!(["a"])).is_compound());
        assert!(Value::from(json!({"k": 1})).is_compound());
        assert!(Value::from(json!(null)).is_null());
    }

    #[test]
    fn int_and_text_of_same_digits_are_distinct() {
        let mut set = HashSet::new();
        set.insert(Value::Int(2));
        set.insert(Value::from("2"));
        set.insert(Value::Int(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn compounds_with_reordered_keys_are_distinct() {
        let ab = Value::from(json!({"a": 1, "b": 2}));
        let ba = Value::from(json!({"b": 2, "a": 1}));
        assert_ne!(ab, ba);

        let mut set = HashSet::new();
        set.insert(ab.clone());
        set.insert(ba);
        set.insert(ab);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_matches_csv_rendering() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::NullDate.to_string(), "");
        assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    }
}
