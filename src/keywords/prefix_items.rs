use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_vec_of_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct PrefixItemsValidator {
    items: Vec<SchemaNode>,
    schema_path: JsonPointer,
}

impl PrefixItemsValidator {
    #[inline]
    pub(crate) fn compile(schemas: &[Value], context: &CompilationContext) -> CompilationResult {
        let prefix_context = context.with_path("prefixItems");
        let mut items = Vec::with_capacity(schemas.len());
        for (index, subschema) in schemas.iter().enumerate() {
            let item_context = prefix_context.with_path(index.to_string());
            items.push(compile_validators(subschema, &item_context)?);
        }
        Ok(Box::new(PrefixItemsValidator {
            items,
            schema_path: context.as_pointer_with("prefixItems"),
        }))
    }
}

impl Validate for PrefixItemsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Array(items) = instance {
            let mut children = Vec::new();
            for (index, (item, node)) in items.iter().zip(self.items.iter()).enumerate() {
                instance_path.push(index);
                let child = node.apply_child(ev, item, instance_path);
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

impl core::fmt::Display for PrefixItemsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "prefixItems: [{}]", format_vec_of_nodes(&self.items))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::Array(schemas) => Some(PrefixItemsValidator::compile(schemas, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("prefixItems"),
            "prefixItems must be an array of schemas",
        ))),
    }
}
