use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// Draft 3 `properties`. Requiredness lives inside the property subschema as
/// `required: true`; the standalone `required` keyword only appeared in
/// draft 4.
pub(crate) struct PropertiesDraft3Validator {
    properties: Vec<(String, SchemaNode, bool)>,
    schema_path: JsonPointer,
}

impl PropertiesDraft3Validator {
    #[inline]
    pub(crate) fn compile(
        map: &Map<String, Value>,
        context: &CompilationContext,
    ) -> CompilationResult {
        let properties_context = context.with_path("properties");
        let mut properties = Vec::with_capacity(map.len());
        for (name, subschema) in map {
            let required = subschema.get("required").and_then(Value::as_bool) == Some(true);
            let property_context = properties_context.with_path(name.clone());
            properties.push((
                name.clone(),
                compile_validators(subschema, &property_context)?,
                required,
            ));
        }
        Ok(Box::new(PropertiesDraft3Validator {
            properties,
            schema_path: context.as_pointer_with("properties"),
        }))
    }
}

impl Validate for PropertiesDraft3Validator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for (name, node, required) in &self.properties {
                match object.get(name) {
                    Some(value) => {
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
                    None if *required => {
                        if ev.quiet {
                            return Ok(ErrorNode::flag(false));
                        }
                        children.push(ErrorNode::invalid(
                            self.schema_path.with_chunk(name.clone()),
                            instance_path.into(),
                            ErrorKind::Required {
                                property: name.clone(),
                            },
                            instance,
                        ));
                    }
                    None => {}
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

impl core::fmt::Display for PropertiesDraft3Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "properties: {{{}}}",
            self.properties
                .iter()
                .map(|(name, node, _)| format!("{}: {}", name, format_validators(node)))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Object(map) => Some(PropertiesDraft3Validator::compile(map, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("properties"),
            "properties must be an object",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use crate::Draft::Draft3;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"properties": {"a": {"type": "string", "required": true}}}), &json!({"a": "x"}))]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({}); "optional by default")]
    fn properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_for(Draft3, schema, instance)
    }

    #[test_case(&json!({"properties": {"a": {"type": "string", "required": true}}}), &json!({}))]
    #[test_case(&json!({"properties": {"a": {"type": "string"}}}), &json!({"a": 1}))]
    fn properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_for(Draft3, schema, instance)
    }
}
