use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    paths::{InstancePath, JsonPointer},
    validator::{format_vec_of_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct AllOfValidator {
    schemas: Vec<SchemaNode>,
    schema_path: JsonPointer,
}

impl AllOfValidator {
    #[inline]
    pub(crate) fn compile(items: &[Value], context: &CompilationContext) -> CompilationResult {
        let all_of_context = context.with_path("allOf");
        let mut schemas = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let item_context = all_of_context.with_path(index.to_string());
            schemas.push(compile_validators(item, &item_context)?);
        }
        Ok(Box::new(AllOfValidator {
            schemas,
            schema_path: context.as_pointer_with("allOf"),
        }))
    }
}

impl Validate for AllOfValidator {
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

impl core::fmt::Display for AllOfValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "allOf: [{}]", format_vec_of_nodes(&self.schemas))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(items) => Some(AllOfValidator::compile(items, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("allOf"),
            "allOf must be an array of schemas",
        ))),
    }
}
