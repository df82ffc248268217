//! Numeric comparison helpers for the bound keywords.
//!
//! JSON numbers arrive as `u64`, `i64` or `f64`; comparing across
//! representations through `f64` alone loses precision for large integers, so
//! every combination goes through `num-cmp`.
use num_cmp::NumCmp;
use serde_json::Number;

macro_rules! compare {
    ($method:ident, $left:expr, $right:expr) => {
        if let Some(b) = $right.as_u64() {
            NumCmp::$method($left, b)
        } else if let Some(b) = $right.as_i64() {
            NumCmp::$method($left, b)
        } else {
            NumCmp::$method($left, $right.as_f64().expect("Always valid"))
        }
    };
}

macro_rules! dispatch {
    ($name:ident, $method:ident) => {
        #[inline]
        pub(crate) fn $name(left: &Number, right: &Number) -> bool {
            if let Some(a) = left.as_u64() {
                compare!($method, a, right)
            } else if let Some(a) = left.as_i64() {
                compare!($method, a, right)
            } else {
                let a = left.as_f64().expect("Always valid");
                compare!($method, a, right)
            }
        }
    };
}

dispatch!(num_le, num_le);
dispatch!(num_lt, num_lt);
dispatch!(num_ge, num_ge);
dispatch!(num_gt, num_gt);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(value: serde_json::Value) -> Number {
        value.as_number().expect("is a number").clone()
    }

    #[test]
    fn mixed_representations() {
        let big = number(json!(u64::MAX));
        let float = number(json!(1.5));
        let negative = number(json!(-3));
        assert!(num_le(&float, &big));
        assert!(num_gt(&big, &float));
        assert!(num_lt(&negative, &float));
        assert!(num_ge(&big, &big));
        // u64::MAX as f64 rounds up; num-cmp compares exactly
        assert!(!num_le(&big, &number(json!(u64::MAX as f64 - 4096.0))));
    }
}
