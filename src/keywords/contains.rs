use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    dialect::Draft,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// `contains`, together with the 2019-09 `minContains`/`maxContains` bounds.
/// Matching indices count as evaluated.
pub(crate) struct ContainsValidator {
    node: SchemaNode,
    min_contains: u64,
    max_contains: Option<u64>,
    schema_path: JsonPointer,
}

impl ContainsValidator {
    #[inline]
    pub(crate) fn compile(
        schema: &Value,
        min_contains: u64,
        max_contains: Option<u64>,
        context: &CompilationContext,
    ) -> CompilationResult {
        let subschema_context = context.with_path("contains");
        Ok(Box::new(ContainsValidator {
            node: compile_validators(schema, &subschema_context)?,
            min_contains,
            max_contains,
            schema_path: context.as_pointer_with("contains"),
        }))
    }
}

impl Validate for ContainsValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Array(items) = instance {
            let mut matched = 0_u64;
            for (index, item) in items.iter().enumerate() {
                instance_path.push(index);
                let result = ev.speculative(|ev| {
                    let mut item_state = AnnotationState::new();
                    self.node.apply(ev, item, instance_path, &mut item_state)
                });
                instance_path.pop();
                if result?.valid() {
                    matched += 1;
                    state.mark_item(index);
                }
            }
            if matched < self.min_contains {
                let kind = if self.min_contains == 1 {
                    ErrorKind::Contains
                } else {
                    ErrorKind::MinContains {
                        limit: self.min_contains,
                    }
                };
                return Ok(fail(ev, &self.schema_path, instance_path, kind, instance));
            }
            if let Some(max_contains) = self.max_contains {
                if matched > max_contains {
                    return Ok(fail(
                        ev,
                        &self.schema_path,
                        instance_path,
                        ErrorKind::MaxContains {
                            limit: max_contains,
                        },
                        instance,
                    ));
                }
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for ContainsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contains: {}", format_validators(&self.node))
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let mut min_contains = 1;
    let mut max_contains = None;
    if context.dialect.draft() >= Draft::Draft201909 {
        if let Some(value) = parent.get("minContains") {
            match value.as_u64() {
                Some(value) => min_contains = value,
                None => {
                    return Some(Err(SchemaError::invalid_schema(
                        context.as_pointer_with("minContains"),
                        "minContains must be a non-negative integer",
                    )))
                }
            }
        }
        if let Some(value) = parent.get("maxContains") {
            match value.as_u64() {
                Some(value) => max_contains = Some(value),
                None => {
                    return Some(Err(SchemaError::invalid_schema(
                        context.as_pointer_with("maxContains"),
                        "maxContains must be a non-negative integer",
                    )))
                }
            }
        }
    }
    Some(ContainsValidator::compile(
        schema,
        min_contains,
        max_contains,
        context,
    ))
}
