use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorKind, ErrorNode, SchemaError, TypeKind},
    keywords::{fail, pass, type_::matches_type},
    paths::{InstancePath, JsonPointer},
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};
use std::convert::TryFrom;

/// One member of a draft 3 `type` union: a named type, the wildcard `any`,
/// or an inline schema.
enum Alternative {
    Type(PrimitiveType),
    Any,
    Schema(SchemaNode),
}

/// Draft 3 `type`: a type name, or an array mixing type names and schemas.
pub(crate) struct TypeDraft3Validator {
    alternatives: Vec<Alternative>,
    named: PrimitiveTypesBitMap,
    schema_path: JsonPointer,
}

impl TypeDraft3Validator {
    fn compile_alternatives(
        items: &[Value],
        context: &CompilationContext,
    ) -> Result<(Vec<Alternative>, PrimitiveTypesBitMap), SchemaError> {
        let type_context = context.with_path("type");
        let mut alternatives = Vec::with_capacity(items.len());
        let mut named = PrimitiveTypesBitMap::new();
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::String(name) if name == "any" => alternatives.push(Alternative::Any),
                Value::String(name) => match PrimitiveType::try_from(name.as_str()) {
                    Ok(primitive_type) => {
                        named |= primitive_type;
                        alternatives.push(Alternative::Type(primitive_type));
                    }
                    Err(()) => {
                        return Err(SchemaError::invalid_schema(
                            context.as_pointer_with("type"),
                            format!("unknown type {:?}", name),
                        ))
                    }
                },
                Value::Object(_) | Value::Bool(_) => {
                    let item_context = type_context.with_path(index.to_string());
                    alternatives.push(Alternative::Schema(compile_validators(
                        item,
                        &item_context,
                    )?));
                }
                _ => {
                    return Err(SchemaError::invalid_schema(
                        context.as_pointer_with("type"),
                        "type union members must be type names or schemas",
                    ))
                }
            }
        }
        Ok((alternatives, named))
    }
}

impl Validate for TypeDraft3Validator {
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
                Alternative::Type(expected) => matches_type(instance, *expected, true),
                Alternative::Schema(node) => {
                    node.is_valid_branch(ev, instance, instance_path, state)?.1
                }
            };
            if matched {
                return Ok(pass(ev, &self.schema_path, instance_path));
            }
        }
        Ok(fail(
            ev,
            &self.schema_path,
            instance_path,
            ErrorKind::Type {
                kind: TypeKind::Multiple(self.named),
            },
            instance,
        ))
    }
}

impl core::fmt::Display for TypeDraft3Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type: [{}]",
            self.alternatives
                .iter()
                .map(|alternative| match alternative {
                    Alternative::Any => "any".to_string(),
                    Alternative::Type(expected) => expected.to_string(),
                    Alternative::Schema(_) => "{...}".to_string(),
                })
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        // `any` matches every value and compiles to nothing
        Value::String(name) if name == "any" => None,
        Value::String(_) => {
            crate::keywords::type_::compile_with(schema, true, context.as_pointer_with("type"))
        }
        Value::Array(items) => {
            match TypeDraft3Validator::compile_alternatives(items, context) {
                Ok((alternatives, named)) => Some(Ok(Box::new(TypeDraft3Validator {
                    alternatives,
                    named,
                    schema_path: context.as_pointer_with("type"),
                }))),
                Err(error) => Some(Err(error)),
            }
        }
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("type"),
            "type must be a string or an array",
        ))),
    }
}
