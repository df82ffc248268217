use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, helpers, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Number, Value};

pub(crate) struct MaximumValidator {
    limit: Number,
    schema_path: JsonPointer,
}

impl MaximumValidator {
    #[inline]
    pub(crate) fn compile(limit: Number, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(MaximumValidator { limit, schema_path }))
    }
}

impl Validate for MaximumValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Number(item) = instance {
            if !helpers::num_le(item, &self.limit) {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::Maximum {
                        limit: Value::Number(self.limit.clone()),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MaximumValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "maximum: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("maximum");
    if let Value::Number(limit) = schema {
        Some(MaximumValidator::compile(limit.clone(), schema_path))
    } else {
        Some(Err(SchemaError::invalid_schema(
            schema_path,
            "maximum must be a number",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"maximum": 5}), &json!(4))]
    #[test_case(&json!({"maximum": 5}), &json!(5))]
    #[test_case(&json!({"maximum": 5.2}), &json!(5.2))]
    #[test_case(&json!({"maximum": u64::MAX}), &json!(u64::MAX))]
    fn maximum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"maximum": 5}), &json!(6))]
    #[test_case(&json!({"maximum": 5}), &json!(5.5))]
    fn maximum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }
}
