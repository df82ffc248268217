use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    ecma,
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use ahash::AHashSet;
use fancy_regex::Regex;
use serde_json::{Map, Value};

/// `additionalProperties` applies its subschema to properties that neither
/// `properties` (by exact name) nor `patternProperties` (by regex) cover.
pub(crate) struct AdditionalPropertiesValidator {
    covered_names: AHashSet<String>,
    covered_patterns: Vec<Regex>,
    node: SchemaNode,
    schema_path: JsonPointer,
}

impl AdditionalPropertiesValidator {
    #[inline]
    pub(crate) fn compile(
        parent: &Map<String, Value>,
        schema: &Value,
        context: &CompilationContext,
    ) -> CompilationResult {
        let mut covered_names = AHashSet::new();
        if let Some(Value::Object(properties)) = parent.get("properties") {
            covered_names.extend(properties.keys().cloned());
        }
        let mut covered_patterns = Vec::new();
        if let Some(Value::Object(patterns)) = parent.get("patternProperties") {
            for pattern in patterns.keys() {
                covered_patterns.push(ecma::compile_unanchored(pattern)?);
            }
        }
        let subschema_context = context.with_path("additionalProperties");
        Ok(Box::new(AdditionalPropertiesValidator {
            covered_names,
            covered_patterns,
            node: compile_validators(schema, &subschema_context)?,
            schema_path: context.as_pointer_with("additionalProperties"),
        }))
    }

    fn is_covered(&self, name: &str) -> bool {
        self.covered_names.contains(name)
            || self
                .covered_patterns
                .iter()
                .any(|regex| ecma::is_match(regex, name))
    }
}

impl Validate for AdditionalPropertiesValidator {
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
                if self.is_covered(name) {
                    continue;
                }
                instance_path.push(name.clone());
                let child = self.node.apply_child(ev, value, instance_path);
                instance_path.pop();
                state.mark_property(name);
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

impl core::fmt::Display for AdditionalPropertiesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "additionalProperties: {}", format_validators(&self.node))
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    Some(AdditionalPropertiesValidator::compile(parent, schema, context))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"additionalProperties": false}), &json!({}))]
    #[test_case(&json!({"properties": {"a": {}}, "additionalProperties": false}), &json!({"a": 1}))]
    #[test_case(&json!({"patternProperties": {"^x": {}}, "additionalProperties": false}), &json!({"x1": 1}))]
    #[test_case(&json!({"additionalProperties": {"type": "integer"}}), &json!({"a": 1}))]
    fn additional_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"additionalProperties": false}), &json!({"a": 1}))]
    #[test_case(&json!({"properties": {"a": {}}, "additionalProperties": false}), &json!({"a": 1, "b": 2}))]
    #[test_case(&json!({"additionalProperties": {"type": "integer"}}), &json!({"a": "x"}))]
    fn additional_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn error_paths() {
        let verdict = tests_util::verdict(
            &json!({"properties": {"a": {"type": "string"}}, "additionalProperties": false}),
            &json!({"a": "s", "b": 1}),
        );
        let errors = verdict.errors.expect("has errors");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].schema_path, vec!["additionalProperties"]);
        assert_eq!(errors[0].document_path, vec!["b"]);
    }
}
