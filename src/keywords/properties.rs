use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_key_value_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct PropertiesValidator {
    properties: Vec<(String, SchemaNode)>,
    schema_path: JsonPointer,
}

impl PropertiesValidator {
    #[inline]
    pub(crate) fn compile(
        map: &Map<String, Value>,
        context: &CompilationContext,
    ) -> CompilationResult {
        let properties_context = context.with_path("properties");
        let mut properties = Vec::with_capacity(map.len());
        for (name, subschema) in map {
            let property_context = properties_context.with_path(name.clone());
            properties.push((
                name.clone(),
                compile_validators(subschema, &property_context)?,
            ));
        }
        Ok(Box::new(PropertiesValidator {
            properties,
            schema_path: context.as_pointer_with("properties"),
        }))
    }
}

impl Validate for PropertiesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for (name, node) in &self.properties {
                if let Some(value) = object.get(name) {
                    instance_path.push(name.clone());
                    let child = node.apply_child(ev, value, instance_path);
                    instance_path.pop();
                    state.mark_property(name);
                    let child = child?;
                    if ev.quiet && !child.valid() {
                        return Ok(ErrorNode::flag(false));
                    }
                    children.push(child);
                }
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

impl core::fmt::Display for PropertiesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "properties: {{{}}}", format_key_value_nodes(&self.properties))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Object(map) => Some(PropertiesValidator::compile(map, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("properties"),
            "properties must be an object",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": "x"}))]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"b": 1}); "absent properties pass")]
    #[test_case(&json!({"properties": {"a": false}}), &json!({}); "false schema for absent property")]
    fn properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": 1}))]
    #[test_case(&json!({"properties": {"a": false}}), &json!({"a": 1}))]
    fn properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn nested_error_paths() {
        let verdict = tests_util::verdict(
            &json!({"properties": {"a": {"properties": {"b": {"type": "null"}}}}}),
            &json!({"a": {"b": 1}}),
        );
        let errors = verdict.errors.expect("has errors");
        assert_eq!(errors[0].schema_path, vec!["properties", "a", "properties", "b", "type"]);
        assert_eq!(errors[0].document_path, vec!["a", "b"]);
    }
}
