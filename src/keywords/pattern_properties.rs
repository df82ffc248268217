use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    ecma,
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use fancy_regex::Regex;
use serde_json::{Map, Value};

pub(crate) struct PatternPropertiesValidator {
    patterns: Vec<(String, Regex, SchemaNode)>,
    schema_path: JsonPointer,
}

impl PatternPropertiesValidator {
    #[inline]
    pub(crate) fn compile(
        map: &Map<String, Value>,
        context: &CompilationContext,
    ) -> CompilationResult {
        let pattern_context = context.with_path("patternProperties");
        let mut patterns = Vec::with_capacity(map.len());
        for (pattern, subschema) in map {
            let subschema_context = pattern_context.with_path(pattern.clone());
            patterns.push((
                pattern.clone(),
                ecma::compile_unanchored(pattern)?,
                compile_validators(subschema, &subschema_context)?,
            ));
        }
        Ok(Box::new(PatternPropertiesValidator {
            patterns,
            schema_path: context.as_pointer_with("patternProperties"),
        }))
    }
}

impl Validate for PatternPropertiesValidator {
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
                for (_, regex, node) in &self.patterns {
                    if ecma::is_match(regex, name) {
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

impl core::fmt::Display for PatternPropertiesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "patternProperties: {{{}}}",
            self.patterns
                .iter()
                .map(|(pattern, _, node)| format!("{}: {}", pattern, format_validators(node)))
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
        Value::Object(map) => Some(PatternPropertiesValidator::compile(map, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("patternProperties"),
            "patternProperties must be an object",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": 1, "bar": "x"}))]
    #[test_case(&json!({"patternProperties": {"o": {"type": "integer"}}}), &json!({"foo": 1}); "unanchored pattern")]
    fn pattern_properties_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"patternProperties": {"^f": {"type": "integer"}}}), &json!({"foo": "x"}))]
    fn pattern_properties_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn invalid_pattern() {
        tests_util::does_not_compile(&json!({"patternProperties": {"a[": {}}}))
    }
}
