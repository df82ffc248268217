use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct MinItemsValidator {
    limit: u64,
    schema_path: JsonPointer,
}

impl MinItemsValidator {
    #[inline]
    pub(crate) fn compile(limit: u64, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(MinItemsValidator { limit, schema_path }))
    }
}

impl Validate for MinItemsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Array(items) = instance {
            if (items.len() as u64) < self.limit {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::MinItems { limit: self.limit },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MinItemsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "minItems: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("minItems");
    if let Some(limit) = schema.as_u64() {
        Some(MinItemsValidator::compile(limit, schema_path))
    } else {
        Some(Err(SchemaError::invalid_schema(
            schema_path,
            "minItems must be a non-negative integer",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minItems": 2}), &json!([1, 2]))]
    #[test_case(&json!({"minItems": 0}), &json!([]))]
    fn min_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test]
    fn min_items_is_not_valid() {
        tests_util::is_not_valid(&json!({"minItems": 2}), &json!([1]))
    }
}
