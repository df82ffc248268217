use crate::{
    annotations::AnnotationState,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::fail,
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::Value;

/// The `false` schema: rejects every value.
pub(crate) struct FalseValidator {
    schema_path: JsonPointer,
}

impl FalseValidator {
    #[inline]
    pub(crate) fn compile(schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(FalseValidator { schema_path }))
    }
}

impl Validate for FalseValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        Ok(fail(
            ev,
            &self.schema_path,
            instance_path,
            ErrorKind::FalseSchema,
            instance,
        ))
    }
}

impl core::fmt::Display for FalseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("false")
    }
}
