use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct NotValidator {
    original: Value,
    node: SchemaNode,
    schema_path: JsonPointer,
}

impl NotValidator {
    #[inline]
    pub(crate) fn compile(schema: &Value, context: &CompilationContext) -> CompilationResult {
        let subschema_context = context.with_path("not");
        Ok(Box::new(NotValidator {
            original: schema.clone(),
            node: compile_validators(schema, &subschema_context)?,
            schema_path: context.as_pointer_with("not"),
        }))
    }
}

impl Validate for NotValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        // Annotations under a negation never surface
        let (_, valid) = self.node.is_valid_branch(ev, instance, instance_path, state)?;
        if valid {
            Ok(fail(
                ev,
                &self.schema_path,
                instance_path,
                ErrorKind::Not {
                    schema: self.original.clone(),
                },
                instance,
            ))
        } else {
            Ok(pass(ev, &self.schema_path, instance_path))
        }
    }
}

impl core::fmt::Display for NotValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not: {}", self.original)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    Some(NotValidator::compile(schema, context))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"not": {"type": "integer"}}), &json!("x"))]
    #[test_case(&json!({"not": false}), &json!(null))]
    fn not_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"not": {"type": "integer"}}), &json!(1))]
    #[test_case(&json!({"not": true}), &json!(null))]
    #[test_case(&json!({"not": {}}), &json!(null))]
    fn not_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn annotations_do_not_escape_negation() {
        tests_util::is_not_valid(
            &json!({
                "not": {"not": {"properties": {"a": true}}},
                "unevaluatedProperties": false
            }),
            &json!({"a": 1}),
        );
    }
}
