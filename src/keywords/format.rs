use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    formats::FormatCheck,
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};
use std::sync::Arc;

/// The assertive side of `format`. Compiled only when the dialect (or the
/// `strict_format` option) makes format failures validation failures, and
/// only for formats the host registered; everything else stays an annotation.
pub(crate) struct FormatValidator {
    format: String,
    check: FormatCheck,
    schema_path: JsonPointer,
}

impl FormatValidator {
    #[inline]
    pub(crate) fn compile(
        format: &str,
        check: FormatCheck,
        schema_path: JsonPointer,
    ) -> CompilationResult {
        Ok(Box::new(FormatValidator {
            format: format.to_string(),
            check,
            schema_path,
        }))
    }
}

impl Validate for FormatValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::String(item) = instance {
            if !(self.check)(item) {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::Format {
                        format: self.format.clone(),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for FormatValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "format: {}", self.format)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let Value::String(format) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("format"),
            "format must be a string",
        )));
    };
    if !context.dialect.assertive_format() {
        return None;
    }
    let check = context.config.formats().get(format)?;
    Some(FormatValidator::compile(
        format,
        Arc::clone(check),
        context.as_pointer_with("format"),
    ))
}

#[cfg(test)]
mod tests {
    use crate::{tests_util, Validator};
    use serde_json::json;
    use std::sync::Arc;

    fn uppercase() -> crate::FormatCheck {
        Arc::new(|value: &str| value.chars().all(char::is_uppercase))
    }

    #[test]
    fn unknown_formats_are_annotations() {
        tests_util::is_valid(&json!({"format": "no-such-format"}), &json!("anything"));
    }

    #[test]
    fn registered_format_asserts_in_draft_7() {
        let validator = Validator::options()
            .with_draft(crate::Draft::Draft7)
            .with_format("shouting", uppercase())
            .compile(&json!({"format": "shouting"}))
            .expect("Is a valid schema");
        assert!(validator.is_valid(&json!("LOUD")));
        assert!(!validator.is_valid(&json!("quiet")));
        // Non-strings are out of scope for format
        assert!(validator.is_valid(&json!(42)));
    }

    #[test]
    fn annotative_by_default_in_2020_12() {
        let validator = Validator::options()
            .with_format("shouting", uppercase())
            .compile(&json!({"format": "shouting"}))
            .expect("Is a valid schema");
        assert!(validator.is_valid(&json!("quiet")));
    }

    #[test]
    fn strict_format_turns_assertion_on() {
        let validator = Validator::options()
            .with_format("shouting", uppercase())
            .strict_format(true)
            .compile(&json!({"format": "shouting"}))
            .expect("Is a valid schema");
        assert!(!validator.is_valid(&json!("quiet")));
    }
}
