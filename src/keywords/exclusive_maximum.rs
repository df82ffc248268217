use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, helpers, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Number, Value};

pub(crate) struct ExclusiveMaximumValidator {
    limit: Number,
    schema_path: JsonPointer,
}

impl ExclusiveMaximumValidator {
    #[inline]
    pub(crate) fn compile(limit: Number, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(ExclusiveMaximumValidator { limit, schema_path }))
    }
}

impl Validate for ExclusiveMaximumValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Number(item) = instance {
            if !helpers::num_lt(item, &self.limit) {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::ExclusiveMaximum {
                        limit: Value::Number(self.limit.clone()),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for ExclusiveMaximumValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exclusiveMaximum: {}", self.limit)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("exclusiveMaximum");
    if let Value::Number(limit) = schema {
        Some(ExclusiveMaximumValidator::compile(limit.clone(), schema_path))
    } else {
        Some(Err(SchemaError::invalid_schema(
            schema_path,
            "exclusiveMaximum must be a number",
        )))
    }
}
