use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, helpers, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Number, Value};

/// Draft 3/4 `minimum`, where the sibling `exclusiveMinimum` is a boolean
/// switching the comparison.
pub(crate) struct MinimumDraft4Validator {
    limit: Number,
    exclusive: bool,
    schema_path: JsonPointer,
}

impl MinimumDraft4Validator {
    #[inline]
    pub(crate) fn compile(
        limit: Number,
        exclusive: bool,
        schema_path: JsonPointer,
    ) -> CompilationResult {
        Ok(Box::new(MinimumDraft4Validator {
            limit,
            exclusive,
            schema_path,
        }))
    }
}

impl Validate for MinimumDraft4Validator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Number(item) = instance {
            let valid = if self.exclusive {
                helpers::num_gt(item, &self.limit)
            } else {
                helpers::num_ge(item, &self.limit)
            };
            if !valid {
                let kind = if self.exclusive {
                    ErrorKind::ExclusiveMinimum {
                        limit: Value::Number(self.limit.clone()),
                    }
                } else {
                    ErrorKind::Minimum {
                        limit: Value::Number(self.limit.clone()),
                    }
                };
                return Ok(fail(ev, &self.schema_path, instance_path, kind, instance));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MinimumDraft4Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exclusive {
            write!(f, "minimum: {} (exclusive)", self.limit)
        } else {
            write!(f, "minimum: {}", self.limit)
        }
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("minimum");
    let Value::Number(limit) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            schema_path,
            "minimum must be a number",
        )));
    };
    let exclusive = match parent.get("exclusiveMinimum") {
        None => false,
        Some(Value::Bool(value)) => *value,
        Some(_) => {
            return Some(Err(SchemaError::invalid_schema(
                context.as_pointer_with("exclusiveMinimum"),
                "exclusiveMinimum must be a boolean in this draft",
            )))
        }
    };
    Some(MinimumDraft4Validator::compile(
        limit.clone(),
        exclusive,
        schema_path,
    ))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use crate::Draft::{Draft3, Draft4};
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"minimum": 5}), &json!(5))]
    #[test_case(&json!({"minimum": 5, "exclusiveMinimum": true}), &json!(6))]
    fn minimum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_for(Draft4, schema, instance)
    }

    #[test_case(&json!({"minimum": 5}), &json!(4))]
    #[test_case(&json!({"minimum": 5, "exclusiveMinimum": true}), &json!(5))]
    fn minimum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_for(Draft4, schema, instance)
    }

    #[test]
    fn same_shape_in_draft_3() {
        tests_util::is_not_valid_for(
            Draft3,
            &json!({"minimum": 5, "exclusiveMinimum": true}),
            &json!(5),
        )
    }
}
