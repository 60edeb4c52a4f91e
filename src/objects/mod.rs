use std::borrow::Cow;

use indexmap::IndexMap;

use crate::types::{Isa, Value};

/// One object from the project's flat `objects` table: an untyped attribute
/// bag addressed by its id. All cross-references stay id strings; lookups go
/// through the project's object map.
#[derive(Debug, Clone)]
pub struct PbxObject {
    pub isa: String,
    pub props: IndexMap<String, Value>,
}

impl PbxObject {
    pub fn from_props(props: IndexMap<String, Value>) -> Self {
        let isa = props
            .get("isa")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        PbxObject { isa, props }
    }

    /// The kind tag, when it is one the walker knows.
    pub fn kind(&self) -> Option<Isa> {
        self.isa.parse().ok()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.props.get(key).and_then(Value::as_str)
    }

    pub fn get_array(&self, key: &str) -> Option<&[Value]> {
        self.props.get(key).and_then(Value::as_array)
    }

    /// Scalar attribute rendered as text (integers in decimal), the form
    /// canonical paths are built from.
    pub fn attr_text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.props.get(key).and_then(Value::as_text)
    }

    /// True when the attribute is present with non-empty text.
    pub fn has_text(&self, key: &str) -> bool {
        self.attr_text(key).is_some_and(|s| !s.is_empty())
    }
}
