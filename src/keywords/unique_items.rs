use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    equality,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct UniqueItemsValidator {
    schema_path: JsonPointer,
}

impl UniqueItemsValidator {
    #[inline]
    pub(crate) fn compile(schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(UniqueItemsValidator { schema_path }))
    }
}

impl Validate for UniqueItemsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Array(items) = instance {
            if !equality::is_unique(items) {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::UniqueItems,
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for UniqueItemsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("uniqueItems: true")
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Bool(true) => Some(UniqueItemsValidator::compile(
            context.as_pointer_with("uniqueItems"),
        )),
        // `uniqueItems: false` asserts nothing
        Value::Bool(false) => None,
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("uniqueItems"),
            "uniqueItems must be a boolean",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 2, 3]))]
    #[test_case(&json!({"uniqueItems": false}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 2}]))]
    fn unique_items_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1]))]
    #[test_case(&json!({"uniqueItems": true}), &json!([1, 1.0]); "numeric equivalence")]
    #[test_case(&json!({"uniqueItems": true}), &json!([{"a": 1}, {"a": 1}]))]
    fn unique_items_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
