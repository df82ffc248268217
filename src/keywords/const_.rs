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

pub(crate) struct ConstValidator {
    expected: Value,
    schema_path: JsonPointer,
}

impl ConstValidator {
    #[inline]
    pub(crate) fn compile(expected: &Value, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(ConstValidator {
            expected: expected.clone(),
            schema_path,
        }))
    }
}

impl Validate for ConstValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if equality::equal(instance, &self.expected) {
            Ok(pass(ev, &self.schema_path, instance_path))
        } else {
            Ok(fail(
                ev,
                &self.schema_path,
                instance_path,
                ErrorKind::Constant {
                    expected_value: self.expected.clone(),
                },
                instance,
            ))
        }
    }
}

impl core::fmt::Display for ConstValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "const: {}", self.expected)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    Some(ConstValidator::compile(
        schema,
        context.as_pointer_with("const"),
    ))
}
