use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// `unevaluatedItems` applies its subschema to exactly the indices no sibling
/// applicator evaluated. The dialect resolver orders it after every
/// annotation-producing sibling, so the state it reads is complete.
pub(crate) struct UnevaluatedItemsValidator {
    node: SchemaNode,
    schema_path: JsonPointer,
}

impl UnevaluatedItemsValidator {
    #[inline]
    pub(crate) fn compile(schema: &Value, context: &CompilationContext) -> CompilationResult {
        let subschema_context = context.with_path("unevaluatedItems");
        Ok(Box::new(UnevaluatedItemsValidator {
            node: compile_validators(schema, &subschema_context)?,
            schema_path: context.as_pointer_with("unevaluatedItems"),
        }))
    }
}

impl Validate for UnevaluatedItemsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Array(items) = instance {
            let mut children = Vec::new();
            for (index, item) in items.iter().enumerate() {
                if state.is_item_evaluated(index) {
                    continue;
                }
                instance_path.push(index);
                let child = self.node.apply_child(ev, item, instance_path);
                instance_path.pop();
                let child = child?;
                if child.valid() {
                    state.mark_item(index);
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

impl core::fmt::Display for UnevaluatedItemsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unevaluatedItems: {}", format_validators(&self.node))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    Some(UnevaluatedItemsValidator::compile(schema, context))
}
