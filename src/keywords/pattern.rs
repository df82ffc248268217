use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    ecma,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use fancy_regex::Regex;
use serde_json::{Map, Value};

pub(crate) struct PatternValidator {
    original: String,
    pattern: Regex,
    schema_path: JsonPointer,
}

impl PatternValidator {
    #[inline]
    pub(crate) fn compile(pattern: &str, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(PatternValidator {
            original: pattern.to_string(),
            pattern: ecma::compile_unanchored(pattern)?,
            schema_path,
        }))
    }
}

impl Validate for PatternValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::String(item) = instance {
            if !ecma::is_match(&self.pattern, item) {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::Pattern {
                        pattern: self.original.clone(),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for PatternValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pattern: {}", self.original)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("pattern");
    match schema {
        Value::String(item) => Some(PatternValidator::compile(item, schema_path)),
        _ => Some(Err(SchemaError::invalid_schema(
            schema_path,
            "pattern must be a string",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"pattern": "AB*C"}), &json!("xxABBCxx"); "unanchored match")]
    #[test_case(&json!({"pattern": "^a*$"}), &json!("aaa"))]
    #[test_case(&json!({"pattern": r"\d+"}), &json!("a1b"))]
    fn pattern_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"pattern": "^a*$"}), &json!("abc"))]
    #[test_case(&json!({"pattern": r"\d"}), &json!("abc"))]
    fn pattern_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn invalid_pattern_is_a_schema_error() {
        tests_util::does_not_compile(&json!({"pattern": "a["}))
    }
}
