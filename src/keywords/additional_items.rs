use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// `additionalItems` constrains positions beyond the tuple form of `items`.
/// When `items` is absent or a single schema there is nothing left to cover.
pub(crate) struct AdditionalItemsValidator {
    node: SchemaNode,
    skip: usize,
    schema_path: JsonPointer,
}

impl AdditionalItemsValidator {
    #[inline]
    pub(crate) fn compile(
        schema: &Value,
        skip: usize,
        context: &CompilationContext,
    ) -> CompilationResult {
        let subschema_context = context.with_path("additionalItems");
        Ok(Box::new(AdditionalItemsValidator {
            node: compile_validators(schema, &subschema_context)?,
            skip,
            schema_path: context.as_pointer_with("additionalItems"),
        }))
    }
}

impl Validate for AdditionalItemsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Array(items) = instance {
            let mut children = Vec::new();
            for (index, item) in items.iter().enumerate().skip(self.skip) {
                instance_path.push(index);
                let child = self.node.apply_child(ev, item, instance_path);
                instance_path.pop();
                state.mark_item(index);
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

impl core::fmt::Display for AdditionalItemsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "additionalItems: {}", format_validators(&self.node))
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match parent.get("items") {
        Some(Value::Array(items)) => Some(AdditionalItemsValidator::compile(
            schema,
            items.len(),
            context,
        )),
        // A single-schema `items` already covers every position
        _ => None,
    }
}
