use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    paths::{InstancePath, JsonPointer},
    validator::{format_vec_of_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// Draft 3 `extends`: the instance must also satisfy the named schema or
/// schemas. Draft 4 replaced it with `allOf`.
pub(crate) struct ExtendsValidator {
    schemas: Vec<SchemaNode>,
    schema_path: JsonPointer,
}

impl ExtendsValidator {
    #[inline]
    pub(crate) fn compile(items: &[Value], context: &CompilationContext) -> CompilationResult {
        let extends_context = context.with_path("extends");
        let mut schemas = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_context = extends_context.with_path(index.to_string());
            schemas.push(compile_validators(item, &item_context)?);
        }
        Ok(Box::new(ExtendsValidator {
            schemas,
            schema_path: context.as_pointer_with("extends"),
        }))
    }
}

impl Validate for ExtendsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let mut children = Vec::with_capacity(self.schemas.len());
        for node in &self.schemas {
            let (branch, child) = node.apply_branch(ev, instance, instance_path, state)?;
            if child.valid() {
                state.merge(branch);
            } else if ev.quiet {
                return Ok(ErrorNode::flag(false));
            }
            children.push(child);
        }
        if ev.quiet {
            return Ok(ErrorNode::flag(true));
        }
        Ok(ErrorNode::aggregate(
            self.schema_path.clone(),
            instance_path.into(),
            children,
        ))
    }
}

impl core::fmt::Display for ExtendsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "extends: [{}]", format_vec_of_nodes(&self.schemas))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(items) => Some(ExtendsValidator::compile(items, context)),
        Value::Object(_) | Value::Bool(_) => {
            Some(ExtendsValidator::compile(std::slice::from_ref(schema), context))
        }
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("extends"),
            "extends must be a schema or an array of schemas",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use crate::Draft::Draft3;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minimum": 0, "extends": {"maximum": 10}}), &json!(5))]
    #[test_case(&json!({"extends": [{"minimum": 0}, {"maximum": 10}]}), &json!(5))]
    fn extends_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_for(Draft3, schema, instance)
    }

    #[test_case(&json!({"minimum": 0, "extends": {"maximum": 10}}), &json!(11))]
    #[test_case(&json!({"extends": [{"minimum": 0}, {"maximum": 10}]}), &json!(-1))]
    fn extends_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_for(Draft3, schema, instance)
    }
}
