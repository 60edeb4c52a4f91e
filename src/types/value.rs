use std::borrow::Cow;

use indexmap::IndexMap;

/// In-memory representation of a parsed .pbxproj value.
///
/// Project files use Apple's old-style (ASCII) plist dialect. Attribute and
/// object order is significant for deterministic traversal, so maps are
/// `IndexMap`s that preserve file order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string value (quoted or unquoted in the source).
    String(String),
    /// An unquoted digit-only literal that fits in i64.
    Integer(i64),
    /// An ordered key-value map (`{ key = value; ... }`).
    Object(IndexMap<String, Value>),
    /// An ordered list of values (`( item1, item2, ... )`).
    Array(Vec<Value>),
}

impl Value {
    /// Classify an unquoted literal.
    ///
    /// Digit-only literals become integers. Literals with a leading zero
    /// (octal-style modes such as `0755`) or overflowing i64 (an all-digit
    /// object id) stay strings.
    pub fn from_literal(literal: &str) -> Value {
        if literal.is_empty() || !literal.bytes().all(|b| b.is_ascii_digit()) {
            return Value::String(literal.to_string());
        }
        if literal.len() > 1 && literal.starts_with('0') {
            return Value::String(literal.to_string());
        }
        match literal.parse::<i64>() {
            Ok(n) => Value::Integer(n),
            Err(_) => Value::String(literal.to_string()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get a value from an Object by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Render a scalar the way it participates in canonical paths.
    /// Integers render in decimal; containers have no text form.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Integer(n) => Some(Cow::Owned(n.to_string())),
            _ => None,
        }
    }
}
