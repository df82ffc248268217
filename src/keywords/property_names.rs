use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// `propertyNames` validates each key as a string value. It does not touch
/// the properties themselves, so it contributes nothing to the evaluated set.
pub(crate) struct PropertyNamesValidator {
    node: SchemaNode,
    schema_path: JsonPointer,
}

impl PropertyNamesValidator {
    #[inline]
    pub(crate) fn compile(schema: &Value, context: &CompilationContext) -> CompilationResult {
        let subschema_context = context.with_path("propertyNames");
        Ok(Box::new(PropertyNamesValidator {
            node: compile_validators(schema, &subschema_context)?,
            schema_path: context.as_pointer_with("propertyNames"),
        }))
    }
}

impl Validate for PropertyNamesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for name in object.keys() {
                let name_value = Value::String(name.clone());
                instance_path.push(name.clone());
                let child = self.node.apply_child(ev, &name_value, instance_path);
                instance_path.pop();
                let child = child?;
                if ev.quiet && !child.valid() {
                    return Ok(ErrorNode::flag(false));
                }
                children.push(child);
            }
            if ev.quiet {
                return Ok(ErrorNode::flag(true));
            }
            return Ok(ErrorNode::aggregate(
                self.schema_path.clone(),
                instance_path.into(),
                children,
            ));
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for PropertyNamesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "propertyNames: {}", format_validators(&self.node))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    Some(PropertyNamesValidator::compile(schema, context))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"ab": 1}))]
    #[test_case(&json!({"propertyNames": true}), &json!({"anything": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({}); "false passes the empty object")]
    fn property_names_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"propertyNames": {"maxLength": 3}}), &json!({"abcd": 1}))]
    #[test_case(&json!({"propertyNames": false}), &json!({"a": 1}))]
    fn property_names_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn names_do_not_count_as_evaluated() {
        tests_util::is_not_valid(
            &json!({
                "$schema": "https://json-schema.org/draft/2019-09/schema",
                "propertyNames": {"minLength": 1},
                "unevaluatedProperties": false
            }),
            &json!({"a": 1}),
        );
    }
}
