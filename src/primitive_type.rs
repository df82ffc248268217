//! Primitive JSON types as used by the `type` keyword.
use serde_json::{Number, Value};
use std::{convert::TryFrom, fmt, ops::BitOrAssign};

/// A JSON primitive type recognised by the `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PrimitiveType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveType::Array => f.write_str("array"),
            PrimitiveType::Boolean => f.write_str("boolean"),
            PrimitiveType::Integer => f.write_str("integer"),
            PrimitiveType::Null => f.write_str("null"),
            PrimitiveType::Number => f.write_str("number"),
            PrimitiveType::Object => f.write_str("object"),
            PrimitiveType::String => f.write_str("string"),
        }
    }
}

impl TryFrom<&str> for PrimitiveType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "array" => Ok(PrimitiveType::Array),
            "boolean" => Ok(PrimitiveType::Boolean),
            "integer" => Ok(PrimitiveType::Integer),
            "null" => Ok(PrimitiveType::Null),
            "number" => Ok(PrimitiveType::Number),
            "object" => Ok(PrimitiveType::Object),
            "string" => Ok(PrimitiveType::String),
            _ => Err(()),
        }
    }
}

const fn bit(primitive_type: PrimitiveType) -> u8 {
    match primitive_type {
        PrimitiveType::Array => 1,
        PrimitiveType::Boolean => 1 << 1,
        PrimitiveType::Integer => 1 << 2,
        PrimitiveType::Null => 1 << 3,
        PrimitiveType::Number => 1 << 4,
        PrimitiveType::Object => 1 << 5,
        PrimitiveType::String => 1 << 6,
    }
}

/// A compact set of primitive types for the multiple-types form of `type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrimitiveTypesBitMap(u8);

impl PrimitiveTypesBitMap {
    pub(crate) const fn new() -> Self {
        PrimitiveTypesBitMap(0)
    }

    #[must_use]
    pub(crate) const fn add_type(mut self, primitive_type: PrimitiveType) -> Self {
        self.0 |= bit(primitive_type);
        self
    }

    pub(crate) const fn contains_type(self, primitive_type: PrimitiveType) -> bool {
        self.0 & bit(primitive_type) != 0
    }
}

impl BitOrAssign<PrimitiveType> for PrimitiveTypesBitMap {
    fn bitor_assign(&mut self, rhs: PrimitiveType) {
        self.0 |= bit(rhs);
    }
}

impl IntoIterator for PrimitiveTypesBitMap {
    type Item = PrimitiveType;
    type IntoIter = PrimitiveTypesIter;

    fn into_iter(self) -> Self::IntoIter {
        PrimitiveTypesIter {
            map: self,
            remaining: &[
                PrimitiveType::Array,
                PrimitiveType::Boolean,
                PrimitiveType::Integer,
                PrimitiveType::Null,
                PrimitiveType::Number,
                PrimitiveType::Object,
                PrimitiveType::String,
            ],
        }
    }
}

/// Iterator over the types present in a [`PrimitiveTypesBitMap`].
#[derive(Debug)]
pub struct PrimitiveTypesIter {
    map: PrimitiveTypesBitMap,
    remaining: &'static [PrimitiveType],
}

impl Iterator for PrimitiveTypesIter {
    type Item = PrimitiveType;

    fn next(&mut self) -> Option<PrimitiveType> {
        while let Some((first, rest)) = self.remaining.split_first() {
            self.remaining = rest;
            if self.map.contains_type(*first) {
                return Some(*first);
            }
        }
        None
    }
}

/// Whether a JSON number is a mathematical integer.
/// Whole-valued floats count unless the caller asked for strict integers.
#[inline]
pub(crate) fn is_integer(number: &Number, strict: bool) -> bool {
    if number.is_u64() || number.is_i64() {
        true
    } else if strict {
        false
    } else {
        number.as_f64().expect("Always valid").fract() == 0.
    }
}

/// The primitive type of a JSON value, with numbers reported as `Number`.
#[inline]
pub(crate) fn of(instance: &Value) -> PrimitiveType {
    match instance {
        Value::Array(_) => PrimitiveType::Array,
        Value::Bool(_) => PrimitiveType::Boolean,
        Value::Null => PrimitiveType::Null,
        Value::Number(_) => PrimitiveType::Number,
        Value::Object(_) => PrimitiveType::Object,
        Value::String(_) => PrimitiveType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bitmap_roundtrip() {
        let mut map = PrimitiveTypesBitMap::new();
        map |= PrimitiveType::Integer;
        map |= PrimitiveType::String;
        assert!(map.contains_type(PrimitiveType::Integer));
        assert!(map.contains_type(PrimitiveType::String));
        assert!(!map.contains_type(PrimitiveType::Null));
        let collected: Vec<_> = map.into_iter().collect();
        assert_eq!(collected, vec![PrimitiveType::Integer, PrimitiveType::String]);
    }

    #[test]
    fn integer_detection() {
        let whole = json!(1.0);
        let number = whole.as_number().expect("is a number");
        assert!(is_integer(number, false));
        assert!(!is_integer(number, true));
        let exact = json!(1);
        assert!(is_integer(exact.as_number().expect("is a number"), true));
    }
}
