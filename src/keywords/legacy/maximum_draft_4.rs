use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, helpers, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Number, Value};

/// Draft 3/4 `maximum`, where the sibling `exclusiveMaximum` is a boolean
/// switching the comparison.
pub(crate) struct MaximumDraft4Validator {
    limit: Number,
    exclusive: bool,
    schema_path: JsonPointer,
}

impl MaximumDraft4Validator {
    #[inline]
    pub(crate) fn compile(
        limit: Number,
        exclusive: bool,
        schema_path: JsonPointer,
    ) -> CompilationResult {
        Ok(Box::new(MaximumDraft4Validator {
            limit,
            exclusive,
            schema_path,
        }))
    }
}

impl Validate for MaximumDraft4Validator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Number(item) = instance {
            let valid = if self.exclusive {
                helpers::num_lt(item, &self.limit)
            } else {
                helpers::num_le(item, &self.limit)
            };
            if !valid {
                let kind = if self.exclusive {
                    ErrorKind::ExclusiveMaximum {
                        limit: Value::Number(self.limit.clone()),
                    }
                } else {
                    ErrorKind::Maximum {
                        limit: Value::Number(self.limit.clone()),
                    }
                };
                return Ok(fail(ev, &self.schema_path, instance_path, kind, instance));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MaximumDraft4Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exclusive {
            write!(f, "maximum: {} (exclusive)", self.limit)
        } else {
            write!(f, "maximum: {}", self.limit)
        }
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("maximum");
    let Value::Number(limit) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            schema_path,
            "maximum must be a number",
        )));
    };
    let exclusive = match parent.get("exclusiveMaximum") {
        None => false,
        Some(Value::Bool(value)) => *value,
        Some(_) => {
            return Some(Err(SchemaError::invalid_schema(
                context.as_pointer_with("exclusiveMaximum"),
                "exclusiveMaximum must be a boolean in this draft",
            )))
        }
    };
    Some(MaximumDraft4Validator::compile(
        limit.clone(),
        exclusive,
        schema_path,
    ))
}
