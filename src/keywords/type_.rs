use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError, TypeKind},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    primitive_type::{self, PrimitiveType, PrimitiveTypesBitMap},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};
use std::convert::TryFrom;

#[inline]
pub(crate) fn matches_type(instance: &Value, expected: PrimitiveType, strict_integer: bool) -> bool {
    match (instance, expected) {
        (Value::Array(_), PrimitiveType::Array)
        | (Value::Bool(_), PrimitiveType::Boolean)
        | (Value::Null, PrimitiveType::Null)
        | (Value::Number(_), PrimitiveType::Number)
        | (Value::Object(_), PrimitiveType::Object)
        | (Value::String(_), PrimitiveType::String) => true,
        (Value::Number(number), PrimitiveType::Integer) => {
            primitive_type::is_integer(number, strict_integer)
        }
        _ => false,
    }
}

pub(crate) struct SingleTypeValidator {
    expected: PrimitiveType,
    strict_integer: bool,
    schema_path: JsonPointer,
}

impl SingleTypeValidator {
    #[inline]
    pub(crate) fn compile(
        expected: PrimitiveType,
        strict_integer: bool,
        schema_path: JsonPointer,
    ) -> CompilationResult {
        Ok(Box::new(SingleTypeValidator {
            expected,
            strict_integer,
            schema_path,
        }))
    }
}

impl Validate for SingleTypeValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if matches_type(instance, self.expected, self.strict_integer) {
            Ok(pass(ev, &self.schema_path, instance_path))
        } else {
            Ok(fail(
                ev,
                &self.schema_path,
                instance_path,
                ErrorKind::Type {
                    kind: TypeKind::Single(self.expected),
                },
                instance,
            ))
        }
    }
}

impl core::fmt::Display for SingleTypeValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "type: {}", self.expected)
    }
}

pub(crate) struct MultipleTypesValidator {
    types: PrimitiveTypesBitMap,
    strict_integer: bool,
    schema_path: JsonPointer,
}

impl MultipleTypesValidator {
    #[inline]
    pub(crate) fn compile(
        items: &[Value],
        strict_integer: bool,
        schema_path: JsonPointer,
    ) -> Option<CompilationResult> {
        let mut types = PrimitiveTypesBitMap::new();
        for item in items {
            match item {
                Value::String(string) => {
                    if let Ok(primitive_type) = PrimitiveType::try_from(string.as_str()) {
                        types |= primitive_type;
                    } else {
                        return Some(Err(SchemaError::invalid_schema(
                            schema_path.clone(),
                            format!("unknown type {:?}", string),
                        )));
                    }
                }
                _ => {
                    return Some(Err(SchemaError::invalid_schema(
                        schema_path.clone(),
                        "type array members must be strings",
                    )))
                }
            }
        }
        Some(Ok(Box::new(MultipleTypesValidator {
            types,
            strict_integer,
            schema_path,
        })))
    }
}

impl Validate for MultipleTypesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let valid = match instance {
            Value::Number(number) => {
                self.types.contains_type(PrimitiveType::Number)
                    || (self.types.contains_type(PrimitiveType::Integer)
                        && primitive_type::is_integer(number, self.strict_integer))
            }
            _ => self.types.contains_type(primitive_type::of(instance)),
        };
        if valid {
            Ok(pass(ev, &self.schema_path, instance_path))
        } else {
            Ok(fail(
                ev,
                &self.schema_path,
                instance_path,
                ErrorKind::Type {
                    kind: TypeKind::Multiple(self.types),
                },
                instance,
            ))
        }
    }
}

impl core::fmt::Display for MultipleTypesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "type: [{}]",
            self.types
                .into_iter()
                .map(|type_| type_.to_string())
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
    compile_with(
        schema,
        context.config.strict_integer_enabled(),
        context.as_pointer_with("type"),
    )
}

/// Shared with the draft 3/4 variants, where integers are always strict.
pub(crate) fn compile_with(
    schema: &Value,
    strict_integer: bool,
    schema_path: JsonPointer,
) -> Option<CompilationResult> {
    match schema {
        Value::String(item) => compile_single_type(item, strict_integer, schema_path),
        Value::Array(items) => {
            if items.len() == 1 {
                if let Some(Value::String(item)) = items.first() {
                    compile_single_type(item, strict_integer, schema_path)
                } else {
                    Some(Err(SchemaError::invalid_schema(
                        schema_path,
                        "type array members must be strings",
                    )))
                }
            } else {
                MultipleTypesValidator::compile(items, strict_integer, schema_path)
            }
        }
        _ => Some(Err(SchemaError::invalid_schema(
            schema_path,
            "type must be a string or an array of strings",
        ))),
    }
}

fn compile_single_type(
    item: &str,
    strict_integer: bool,
    schema_path: JsonPointer,
) -> Option<CompilationResult> {
    match PrimitiveType::try_from(item) {
        Ok(expected) => Some(SingleTypeValidator::compile(
            expected,
            strict_integer,
            schema_path,
        )),
        Err(()) => Some(Err(SchemaError::invalid_schema(
            schema_path,
            format!("unknown type {:?}", item),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"type": "string"}), &json!("hello"))]
    #[test_case(&json!({"type": "number"}), &json!(42))]
    #[test_case(&json!({"type": "number"}), &json!(42.5))]
    #[test_case(&json!({"type": "integer"}), &json!(42))]
    #[test_case(&json!({"type": "integer"}), &json!(1.0); "whole float counts as integer")]
    #[test_case(&json!({"type": ["number", "null"]}), &json!(null))]
    #[test_case(&json!({"type": ["number", "null"]}), &json!(42))]
    #[test_case(&json!({"type": ["integer"]}), &json!(7); "single-element array form")]
    fn type_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"type": "string"}), &json!(1))]
    #[test_case(&json!({"type": "integer"}), &json!(1.5))]
    #[test_case(&json!({"type": ["object", "array"]}), &json!("s"))]
    fn type_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test_case(&json!({"type": "unicorn"}); "unknown type name")]
    #[test_case(&json!({"type": 1}); "type as number")]
    #[test_case(&json!({"type": [1]}); "type array containing number")]
    fn invalid_type_schema(schema: &Value) {
        tests_util::does_not_compile(schema)
    }

    #[test]
    fn strict_integer_rejects_whole_floats() {
        let validator = crate::Validator::options()
            .strict_integer(true)
            .compile(&json!({"type": "integer"}))
            .expect("Is a valid schema");
        assert!(!validator.is_valid(&json!(1.0)));
        assert!(validator.is_valid(&json!(1)));
    }

    #[test_case(&json!({"type": "integer"}), &json!(1.5), "/type")]
    fn schema_path(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_path(schema, instance, expected)
    }
}
