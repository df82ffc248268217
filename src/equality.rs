//! Structural equality over JSON values.
//!
//! `serde_json` equality distinguishes `1` from `1.0`; JSON Schema does not.
//! `enum`, `const` and `uniqueItems` all go through these helpers.
use num_cmp::NumCmp;
use serde_json::{Map, Value};

macro_rules! num_cmp {
    ($left:expr, $right:expr) => {
        if let Some(b) = $right.as_u64() {
            NumCmp::num_eq($left, b)
        } else if let Some(b) = $right.as_i64() {
            NumCmp::num_eq($left, b)
        } else {
            NumCmp::num_eq($left, $right.as_f64().expect("Always valid"))
        }
    };
}

#[inline]
pub(crate) fn equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(left), Value::String(right)) => left == right,
        (Value::Bool(left), Value::Bool(right)) => left == right,
        (Value::Null, Value::Null) => true,
        (Value::Number(left), Value::Number(right)) => {
            if let Some(a) = left.as_u64() {
                num_cmp!(a, right)
            } else if let Some(a) = left.as_i64() {
                num_cmp!(a, right)
            } else {
                let a = left.as_f64().expect("Always valid");
                num_cmp!(a, right)
            }
        }
        (Value::Array(left), Value::Array(right)) => equal_arrays(left, right),
        (Value::Object(left), Value::Object(right)) => equal_objects(left, right),
        (_, _) => false,
    }
}

#[inline]
pub(crate) fn equal_arrays(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right.iter()).all(|(a, b)| equal(a, b))
}

#[inline]
pub(crate) fn equal_objects(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .all(|(key, value)| right.get(key).map_or(false, |other| equal(value, other)))
}

/// Pairwise inequality check used by `uniqueItems`.
#[inline]
pub(crate) fn is_unique(items: &[Value]) -> bool {
    for (index, item) in items.iter().enumerate() {
        for other in items.iter().skip(index + 1) {
            if equal(item, other) {
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::{equal, is_unique};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!(1), &json!(1.0))]
    #[test_case(&json!([2]), &json!([2.0]))]
    #[test_case(&json!([-3]), &json!([-3.0]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1.0}))]
    fn are_equal(left: &Value, right: &Value) {
        assert!(equal(left, right))
    }

    #[test_case(&json!(1), &json!(2.0))]
    #[test_case(&json!([]), &json!(["foo"]))]
    #[test_case(&json!([-3]), &json!([-4.0]))]
    #[test_case(&json!({"a": 1}), &json!({"a": 1.0, "b": 2}))]
    fn are_not_equal(left: &Value, right: &Value) {
        assert!(!equal(left, right))
    }

    #[test]
    fn key_order_is_irrelevant() {
        let left = serde_json::from_str::<Value>(r#"{"a": 1, "b": 2}"#).expect("valid JSON");
        let right = serde_json::from_str::<Value>(r#"{"b": 2, "a": 1}"#).expect("valid JSON");
        assert!(equal(&left, &right));
    }

    #[test_case(&[json!(1), json!(2)], true)]
    #[test_case(&[json!(1), json!(1.0)], false)]
    #[test_case(&[json!({"a": 1}), json!({"a": 1.0})], false)]
    #[test_case(&[], true)]
    fn uniqueness(items: &[Value], expected: bool) {
        assert_eq!(is_unique(items), expected)
    }
}
