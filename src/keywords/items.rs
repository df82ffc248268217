use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    dialect::Draft,
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, format_vec_of_nodes, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// The single-schema form: every item validates against one schema. Before
/// 2020-12 this is `items` with an object value; from 2020-12 on, `items`
/// only covers the positions after `prefixItems`.
pub(crate) struct ItemsObjectValidator {
    node: SchemaNode,
    skip: usize,
    schema_path: JsonPointer,
}

impl ItemsObjectValidator {
    #[inline]
    pub(crate) fn compile(
        schema: &Value,
        skip: usize,
        context: &CompilationContext,
    ) -> CompilationResult {
        let subschema_context = context.with_path("items");
        Ok(Box::new(ItemsObjectValidator {
            node: compile_validators(schema, &subschema_context)?,
            skip,
            schema_path: context.as_pointer_with("items"),
        }))
    }
}

impl Validate for ItemsObjectValidator {
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

impl core::fmt::Display for ItemsObjectValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "items: {}", format_validators(&self.node))
    }
}

/// The tuple form of `items` used before 2020-12: the n-th item validates
/// against the n-th schema.
pub(crate) struct ItemsArrayValidator {
    items: Vec<SchemaNode>,
    schema_path: JsonPointer,
}

impl ItemsArrayValidator {
    #[inline]
    pub(crate) fn compile(schemas: &[Value], context: &CompilationContext) -> CompilationResult {
        let items_context = context.with_path("items");
        let mut items = Vec::with_capacity(schemas.len());
        for (index, subschema) in schemas.iter().enumerate() {
            let item_context = items_context.with_path(index.to_string());
            items.push(compile_validators(subschema, &item_context)?);
        }
        Ok(Box::new(ItemsArrayValidator {
            items,
            schema_path: context.as_pointer_with("items"),
        }))
    }
}

impl Validate for ItemsArrayValidator {
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

impl core::fmt::Display for ItemsArrayValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "items: [{}]", format_vec_of_nodes(&self.items))
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    if context.dialect.draft() >= Draft::Draft202012 {
        // `prefixItems` covers the leading positions; `items` is the tail
        let skip = match parent.get("prefixItems") {
            Some(Value::Array(prefix)) => prefix.len(),
            _ => 0,
        };
        return match schema {
            Value::Object(_) | Value::Bool(_) => {
                Some(ItemsObjectValidator::compile(schema, skip, context))
            }
            _ => Some(Err(SchemaError::invalid_schema(
                context.as_pointer_with("items"),
                "items must be a schema",
            ))),
        };
    }
    match schema {
        Value::Array(schemas) => Some(ItemsArrayValidator::compile(schemas, context)),
        Value::Object(_) | Value::Bool(_) => Some(ItemsObjectValidator::compile(schema, 0, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("items"),
            "items must be a schema or an array of schemas",
        ))),
    }
}
