use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorKind, ErrorNode, SchemaError},
    paths::{InstancePath, JsonPointer},
    validator::{format_vec_of_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct OneOfValidator {
    schemas: Vec<SchemaNode>,
    schema_path: JsonPointer,
}

impl OneOfValidator {
    #[inline]
    pub(crate) fn compile(items: &[Value], context: &CompilationContext) -> CompilationResult {
        let one_of_context = context.with_path("oneOf");
        let mut schemas = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_context = one_of_context.with_path(index.to_string());
            schemas.push(compile_validators(item, &item_context)?);
        }
        Ok(Box::new(OneOfValidator {
            schemas,
            schema_path: context.as_pointer_with("oneOf"),
        }))
    }
}

impl Validate for OneOfValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let mut matched: Option<AnnotationState> = None;
        let mut multiple = false;
        for node in &self.schemas {
            let (branch, valid) = node.is_valid_branch(ev, instance, instance_path, state)?;
            if valid {
                if matched.is_some() {
                    multiple = true;
                    break;
                }
                matched = Some(branch);
            }
        }
        if multiple {
            return Ok(if ev.quiet {
                ErrorNode::flag(false)
            } else {
                ErrorNode::combinator(
                    self.schema_path.clone(),
                    instance_path.into(),
                    false,
                    ErrorKind::OneOfMultipleValid,
                    instance,
                    Vec::new(),
                )
            });
        }
        match matched {
            Some(branch) => {
                state.merge(branch);
                Ok(if ev.quiet {
                    ErrorNode::flag(true)
                } else {
                    ErrorNode::valid_at(self.schema_path.clone(), instance_path.into())
                })
            }
            None => {
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
                    ErrorKind::OneOfNotValid,
                    instance,
                    children,
                ))
            }
        }
    }
}

impl core::fmt::Display for OneOfValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "oneOf: [{}]", format_vec_of_nodes(&self.schemas))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(items) => Some(OneOfValidator::compile(items, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("oneOf"),
            "oneOf must be an array of schemas",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1))]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(2.5))]
    fn one_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(1.5); "matches none")]
    #[test_case(&json!({"oneOf": [{"type": "integer"}, {"minimum": 2}]}), &json!(3); "matches both")]
    #[test_case(&json!({"oneOf": []}), &json!(null))]
    fn one_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn annotations_come_from_the_single_match() {
        let schema = json!({
            "oneOf": [
                {"properties": {"a": true}, "required": ["a"]},
                {"properties": {"b": true}, "required": ["b"]}
            ],
            "unevaluatedProperties": false
        });
        tests_util::is_valid(&schema, &json!({"a": 1}));
        tests_util::is_not_valid(&schema, &json!({"a": 1, "c": 2}));
    }
}
