//! # polydraft
//!
//! Multi-draft JSON Schema validation with annotation-aware evaluation.
//! Schemas compile into a validation tree once and can be applied to any
//! number of documents; the keyword order inside the tree is arranged so that
//! `unevaluatedItems`/`unevaluatedProperties` observe what their sibling
//! applicators evaluated.
//!
//! Supports drafts 3, 4, 6, 7, 2019-09, 2020-12 and the "next" draft.
//!
//! ## Usage
//!
//! ```rust
//! use polydraft::{Draft, Validator};
//! use serde_json::json;
//!
//! # fn main() -> Result<(), polydraft::SchemaError> {
//! let schema = json!({"maxLength": 5});
//! let validator = Validator::options()
//!     .with_draft(Draft::Draft7)
//!     .compile(&schema)?;
//!
//! let verdict = validator.validate(&json!("too long here"))?;
//! assert!(!verdict.valid);
//! for error in verdict.errors.unwrap_or_default() {
//!     println!("{}: {}", error.document_path.join("/"), error.message);
//! }
//! # Ok(())
//! # }
//! ```
#![warn(
    clippy::cast_possible_truncation,
    clippy::doc_markdown,
    clippy::explicit_iter_loop,
    clippy::map_unwrap_or,
    clippy::match_same_arms,
    clippy::needless_borrow,
    clippy::print_stdout,
    clippy::redundant_closure,
    clippy::trivially_copy_pass_by_ref,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unreachable_pub,
    variant_size_differences
)]
#![allow(clippy::unnecessary_wraps)]
mod annotations;
mod catalog;
mod compilation;
mod dialect;
mod ecma;
mod equality;
pub mod error;
mod formats;
mod keywords;
pub mod output;
mod paths;
pub mod primitive_type;
mod resolver;
mod validator;

pub use compilation::{options::ValidationOptions, Validator};
pub use dialect::{Draft, Vocabulary};
pub use error::{ErrorKind, ErrorNode, SchemaError, TypeKind};
pub use formats::FormatCheck;
pub use output::{ErrorDetail, Output, Verdict};
pub use paths::JsonPointer;
pub use resolver::{SchemaResolver, SchemaResolverError};

use serde_json::Value;

/// Validate `instance` against `schema` under default options and return the
/// verdict with the error tree.
///
/// ```rust
/// use polydraft::validate;
/// use serde_json::json;
///
/// let verdict = validate(&json!({"type": "string"}), &json!("hello")).unwrap();
/// assert!(verdict.valid);
/// assert!(verdict.errors.is_none());
/// ```
pub fn validate(schema: &Value, instance: &Value) -> Result<Verdict, SchemaError> {
    let validator = Validator::compile(schema)?;
    validator.validate(instance)
}

/// A shortcut for validating `instance` against `schema`. The draft version
/// is detected from `$schema` and defaults to 2020-12.
///
/// ```rust
/// use polydraft::is_valid;
/// use serde_json::json;
///
/// let schema = json!({"maxLength": 5});
/// assert!(is_valid(&schema, &json!("foo")));
/// assert!(!is_valid(&schema, &json!("foo bar baz")));
/// ```
///
/// This function panics if an invalid schema is passed.
#[must_use]
#[inline]
pub fn is_valid(schema: &Value, instance: &Value) -> bool {
    let validator = Validator::compile(schema).expect("Invalid schema");
    validator.is_valid(instance)
}

#[cfg(test)]
pub(crate) mod tests_util {
    use super::{Draft, Validator, Verdict};
    use serde_json::Value;

    pub(crate) fn is_valid(schema: &Value, instance: &Value) {
        let validator = Validator::compile(schema).expect("Is a valid schema");
        assert!(
            validator.is_valid(instance),
            "{} should be valid (via is_valid)",
            instance
        );
        assert!(
            validator
                .validate(instance)
                .expect("No infrastructure errors")
                .valid,
            "{} should be valid (via validate)",
            instance
        );
    }

    pub(crate) fn is_not_valid(schema: &Value, instance: &Value) {
        let validator = Validator::compile(schema).expect("Is a valid schema");
        assert!(
            !validator.is_valid(instance),
            "{} should not be valid (via is_valid)",
            instance
        );
        let verdict = validator
            .validate(instance)
            .expect("No infrastructure errors");
        assert!(!verdict.valid, "{} should not be valid (via validate)", instance);
        assert!(
            !verdict.errors.as_deref().unwrap_or_default().is_empty(),
            "{} must produce errors",
            instance
        );
    }

    pub(crate) fn is_valid_for(draft: Draft, schema: &Value, instance: &Value) {
        let validator = Validator::options()
            .with_draft(draft)
            .compile(schema)
            .expect("Is a valid schema");
        assert!(
            validator.is_valid(instance),
            "{} should be valid under {:?}",
            instance,
            draft
        );
    }

    pub(crate) fn is_not_valid_for(draft: Draft, schema: &Value, instance: &Value) {
        let validator = Validator::options()
            .with_draft(draft)
            .compile(schema)
            .expect("Is a valid schema");
        assert!(
            !validator.is_valid(instance),
            "{} should not be valid under {:?}",
            instance,
            draft
        );
    }

    pub(crate) fn does_not_compile(schema: &Value) {
        assert!(
            Validator::compile(schema).is_err(),
            "{} should not compile",
            schema
        );
    }

    pub(crate) fn does_not_compile_for(draft: Draft, schema: &Value) {
        assert!(
            Validator::options().with_draft(draft).compile(schema).is_err(),
            "{} should not compile under {:?}",
            schema,
            draft
        );
    }

    pub(crate) fn verdict(schema: &Value, instance: &Value) -> Verdict {
        Validator::compile(schema)
            .expect("Is a valid schema")
            .validate(instance)
            .expect("No infrastructure errors")
    }

    pub(crate) fn assert_schema_path(schema: &Value, instance: &Value, expected: &str) {
        let verdict = verdict(schema, instance);
        let errors = verdict.errors.expect("Should have errors");
        let first = errors.first().expect("Should have at least one error");
        let pointer: String = first
            .schema_path
            .iter()
            .map(|chunk| format!("/{}", chunk))
            .collect();
        assert_eq!(pointer, expected);
    }

    pub(crate) fn expect_first_message(schema: &Value, instance: &Value, expected: &str) {
        let verdict = verdict(schema, instance);
        let errors = verdict.errors.expect("Should have errors");
        let first = errors.first().expect("Should have at least one error");
        assert_eq!(first.message, expected);
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid;
    use serde_json::json;

    #[test]
    fn test_is_valid() {
        let schema = json!({"minLength": 5});
        let valid = json!("foobar");
        let invalid = json!("foo");
        assert!(is_valid(&schema, &valid));
        assert!(!is_valid(&schema, &invalid));
    }
}
