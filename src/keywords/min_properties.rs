use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct MinPropertiesValidator {
    limit: u64,
    schema_path: JsonPointer,
}

impl MinPropertiesValidator {
    #[inline]
    pub(crate) fn compile(limit: u64, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(MinPropertiesValidator { limit, schema_path }))
    }
}

impl Validate for MinPropertiesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            if (object.len() as u64) < self.limit {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::MinProperties { limit: self.limit },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MinPropertiesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "minProperties: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("minProperties");
    if let Some(limit) = schema.as_u64() {
        Some(MinPropertiesValidator::compile(limit, schema_path))
    } else {
        Some(Err(SchemaError::invalid_schema(
            schema_path,
            "minProperties must be a non-negative integer",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::json;

    #[test]
    fn bounds() {
        tests_util::is_valid(&json!({"minProperties": 1}), &json!({"a": 1}));
        tests_util::is_not_valid(&json!({"minProperties": 1}), &json!({}));
    }
}
