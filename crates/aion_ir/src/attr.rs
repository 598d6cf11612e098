//! Free-form attribute bags attached to cells.
//!
//! A small string-keyed map whose values are either an integer (a literal
//! `value`, a `depth`, slice bounds) or a string (a `memory` name). Kept as
//! a sum type rather than stringly-typed throughout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single attribute value: either an integer or a string.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum AttrValue {
    /// An integer attribute value (e.g. a `CONST`'s `value`, a `SLICE`'s `msb`/`lsb`).
    Int(i64),
    /// A string attribute value (e.g. a `MEMRD`/`MEMWR`'s `memory` name).
    Str(String),
}

impl AttrValue {
    /// Returns the integer value, if this attribute holds one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            AttrValue::Str(_) => None,
        }
    }

    /// Returns the string value, if this attribute holds one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            AttrValue::Int(_) => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

/// A cell's attribute bag: ordered by key for deterministic iteration (e.g. DOT export).
pub type Attributes = BTreeMap<String, AttrValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_str_accessors() {
        let i = AttrValue::Int(5);
        let s = AttrValue::Str("mem0".to_string());
        assert_eq!(i.as_int(), Some(5));
        assert_eq!(i.as_str(), None);
        assert_eq!(s.as_str(), Some("mem0"));
        assert_eq!(s.as_int(), None);
    }

    #[test]
    fn from_conversions() {
        let a: AttrValue = 42i64.into();
        let b: AttrValue = "hello".into();
        assert_eq!(a, AttrValue::Int(42));
        assert_eq!(b, AttrValue::Str("hello".to_string()));
    }
}
