use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// `unevaluatedProperties` applies its subschema to exactly the properties no
/// sibling applicator evaluated.
///
/// In contrast to `additionalProperties`, which only sees `properties` and
/// `patternProperties`, this keyword sees through `allOf`, `oneOf`, `anyOf`,
/// `if`/`then`/`else`, `dependentSchemas` and references: the annotation
/// state already contains whatever those evaluated by the time this runs.
pub(crate) struct UnevaluatedPropertiesValidator {
    node: SchemaNode,
    schema_path: JsonPointer,
}

impl UnevaluatedPropertiesValidator {
    #[inline]
    pub(crate) fn compile(schema: &Value, context: &CompilationContext) -> CompilationResult {
        let subschema_context = context.with_path("unevaluatedProperties");
        Ok(Box::new(UnevaluatedPropertiesValidator {
            node: compile_validators(schema, &subschema_context)?,
            schema_path: context.as_pointer_with("unevaluatedProperties"),
        }))
    }
}

impl Validate for UnevaluatedPropertiesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for (name, value) in object {
                if state.is_property_evaluated(name) {
                    continue;
                }
                instance_path.push(name.clone());
                let child = self.node.apply_child(ev, value, instance_path);
                instance_path.pop();
                let child = child?;
                if child.valid() {
                    state.mark_property(name);
                } else if ev.quiet {
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

impl core::fmt::Display for UnevaluatedPropertiesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unevaluatedProperties: {}", format_validators(&self.node))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    Some(UnevaluatedPropertiesValidator::compile(schema, context))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"unevaluatedProperties": false}), &json!({}))]
    #[test_case(&json!({"properties": {"a": true}, "unevaluatedProperties": false}), &json!({"a": 1}))]
    #[test_case(&json!({"patternProperties": {"^x": true}, "unevaluatedProperties": false}), &json!({"x1": 1}))]
    #[test_case(&json!({"allOf": [{"type": "number"}], "unevaluatedProperties": false}), &json!({}); "empty object under a non-object branch")]
    #[test_case(&json!({"allOf": [{"properties": {"a": true}}], "unevaluatedProperties": false}), &json!({"a": 1}))]
    #[test_case(
        &json!({
            "if": {"required": ["kind"], "properties": {"kind": {"const": "a"}}},
            "then": {"properties": {"payload": {"type": "integer"}}},
            "unevaluatedProperties": false
        }),
        &json!({"kind": "a", "payload": 1});
        "then annotations count"
    )]
    #[test_case(&json!({"unevaluatedProperties": {"type": "integer"}}), &json!({"a": 1}))]
    fn unevaluated_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"unevaluatedProperties": false}), &json!({"a": 1}))]
    #[test_case(&json!({"properties": {"a": true}, "unevaluatedProperties": false}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"unevaluatedProperties": {"type": "integer"}}), &json!({"a": "x"}))]
    fn unevaluated_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn sees_through_references() {
        let schema = json!({
            "$defs": {"named": {"properties": {"name": {"type": "string"}}}},
            "$ref": "#/$defs/named",
            "unevaluatedProperties": false
        });
        tests_util::is_valid(&schema, &json!({"name": "x"}));
        tests_util::is_not_valid(&schema, &json!({"name": "x", "other": 1}));
    }

    #[test]
    fn successful_subschema_marks_properties() {
        // Two `unevaluatedProperties` cannot stack, the first evaluates all
        let schema = json!({
            "allOf": [{"unevaluatedProperties": {"type": "integer"}}],
            "unevaluatedProperties": false
        });
        tests_util::is_valid(&schema, &json!({"a": 1}));
    }
}
