use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorKind, ErrorNode, SchemaError},
    paths::{InstancePath, JsonPointer},
    validator::{format_vec_of_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct AnyOfValidator {
    schemas: Vec<SchemaNode>,
    schema_path: JsonPointer,
}

impl AnyOfValidator {
    #[inline]
    pub(crate) fn compile(items: &[Value], context: &CompilationContext) -> CompilationResult {
        let any_of_context = context.with_path("anyOf");
        let mut schemas = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_context = any_of_context.with_path(index.to_string());
            schemas.push(compile_validators(item, &item_context)?);
        }
        Ok(Box::new(AnyOfValidator {
            schemas,
            schema_path: context.as_pointer_with("anyOf"),
        }))
    }
}

impl Validate for AnyOfValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        // The arms run in quiet mode first; their error trees are only needed
        // when every one of them fails
        let mut successes = Vec::new();
        for node in &self.schemas {
            let (branch, valid) = node.is_valid_branch(ev, instance, instance_path, state)?;
            if valid {
                successes.push(branch);
            }
        }
        if !successes.is_empty() {
            for branch in successes {
                state.merge(branch);
            }
            return Ok(if ev.quiet {
                ErrorNode::flag(true)
            } else {
                ErrorNode::valid_at(self.schema_path.clone(), instance_path.into())
            });
        }
        if ev.quiet {
            return Ok(ErrorNode::flag(false));
        }
        let mut children = Vec::with_capacity(self.schemas.len());
        for node in &self.schemas {
            let (_, child) = node.apply_branch(ev, instance, instance_path, state)?;
            children.push(child);
        }
        Ok(ErrorNode::combinator(
            self.schema_path.clone(),
            instance_path.into(),
            false,
            ErrorKind::AnyOf,
            instance,
            children,
        ))
    }
}

impl core::fmt::Display for AnyOfValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anyOf: [{}]", format_vec_of_nodes(&self.schemas))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(items) => Some(AnyOfValidator::compile(items, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("anyOf"),
            "anyOf must be an array of schemas",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn any_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5))]
    #[test_case(&json!({"anyOf": []}), &json!(null); "empty anyOf rejects")]
    fn any_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn annotations_merge_from_every_successful_arm() {
        let schema = json!({
            "anyOf": [
                {"properties": {"a": true}, "required": ["a"]},
                {"properties": {"b": true}, "required": ["b"]}
            ],
            "unevaluatedProperties": false
        });
        tests_util::is_valid(&schema, &json!({"a": 1}));
        tests_util::is_valid(&schema, &json!({"a": 1, "b": 2}));
        tests_util::is_not_valid(&schema, &json!({"a": 1, "c": 3}));
    }

    #[test]
    fn errors_come_from_every_arm() {
        let verdict = tests_util::verdict(
            &json!({"anyOf": [{"type": "integer"}, {"minimum": 2}]}),
            &json!(1.5),
        );
        let errors = verdict.errors.expect("has errors");
        assert_eq!(errors.len(), 1);
        let nested = errors[0].errors.as_ref().expect("arm errors");
        assert_eq!(nested.len(), 2);
    }
}
