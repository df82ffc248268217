use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass, type_::matches_type},
    paths::{InstancePath, JsonPointer},
    primitive_type::PrimitiveType,
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};
use std::convert::TryFrom;

enum Alternative {
    Type(PrimitiveType),
    Any,
    Schema(SchemaNode),
}

/// Draft 3 `disallow`: the negation of `type`, with the same union shapes.
pub(crate) struct DisallowValidator {
    original: Value,
    alternatives: Vec<Alternative>,
    schema_path: JsonPointer,
}

impl DisallowValidator {
    fn compile_alternative(
        item: &Value,
        index: usize,
        context: &CompilationContext,
    ) -> Result<Alternative, SchemaError> {
        match item {
            Value::String(name) if name == "any" => Ok(Alternative::Any),
            Value::String(name) => PrimitiveType::try_from(name.as_str())
                .map(Alternative::Type)
                .map_err(|()| {
                    SchemaError::invalid_schema(
                        context.as_pointer_with("disallow"),
                        format!("unknown type {:?}", name),
                    )
                }),
            Value::Object(_) | Value::Bool(_) => {
                let disallow_context = context.with_path("disallow");
                let item_context = disallow_context.with_path(index.to_string());
                Ok(Alternative::Schema(compile_validators(item, &item_context)?))
            }
            _ => Err(SchemaError::invalid_schema(
                context.as_pointer_with("disallow"),
                "disallow members must be type names or schemas",
            )),
        }
    }
}

impl Validate for DisallowValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        for alternative in &self.alternatives {
            let matched = match alternative {
                Alternative::Any => true,
                Alternative::Type(disallowed) => matches_type(instance, *disallowed, true),
                Alternative::Schema(node) => {
                    node.is_valid_branch(ev, instance, instance_path, state)?.1
                }
            };
            if matched {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::Disallowed {
                        disallowed: self.original.clone(),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for DisallowValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "disallow: {}", self.original)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let items: Vec<Value> = match schema {
        Value::Array(items) => items.clone(),
        _ => vec![schema.clone()],
    };
    let mut alternatives = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match DisallowValidator::compile_alternative(item, index, context) {
            Ok(alternative) => alternatives.push(alternative),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(DisallowValidator {
        original: schema.clone(),
        alternatives,
        schema_path: context.as_pointer_with("disallow"),
    })))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use crate::Draft::Draft3;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"disallow": "string"}), &json!(1))]
    #[test_case(&json!({"disallow": ["string", "null"]}), &json!(1))]
    #[test_case(&json!({"disallow": [{"minimum": 5}]}), &json!(3); "schema member")]
    fn disallow_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_for(Draft3, schema, instance)
    }

    #[test_case(&json!({"disallow": "string"}), &json!("x"))]
    #[test_case(&json!({"disallow": ["string", "null"]}), &json!(null))]
    #[test_case(&json!({"disallow": "any"}), &json!(1))]
    #[test_case(&json!({"disallow": [{"minimum": 5}]}), &json!(7))]
    fn disallow_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_for(Draft3, schema, instance)
    }
}
