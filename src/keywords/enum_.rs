use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    equality,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct EnumValidator {
    options: Value,
    items: Vec<Value>,
    schema_path: JsonPointer,
}

impl EnumValidator {
    #[inline]
    pub(crate) fn compile(schema: &Value, items: &[Value], schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(EnumValidator {
            options: schema.clone(),
            items: items.to_vec(),
            schema_path,
        }))
    }
}

impl Validate for EnumValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if self.items.iter().any(|item| equality::equal(instance, item)) {
            Ok(pass(ev, &self.schema_path, instance_path))
        } else {
            Ok(fail(
                ev,
                &self.schema_path,
                instance_path,
                ErrorKind::Enum {
                    options: self.options.clone(),
                },
                instance,
            ))
        }
    }
}

impl core::fmt::Display for EnumValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "enum: {}", self.options)
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("enum");
    if let Value::Array(items) = schema {
        Some(EnumValidator::compile(schema, items, schema_path))
    } else {
        Some(Err(SchemaError::invalid_schema(
            schema_path,
            "enum must be an array",
        )))
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(2))]
    #[test_case(&json!({"enum": [1.0]}), &json!(1); "numeric equivalence")]
    #[test_case(&json!({"enum": [{"a": 1.0}]}), &json!({"a": 1}))]
    #[test_case(&json!({"enum": [null, "x"]}), &json!(null))]
    fn enum_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"enum": [1, 2, 3]}), &json!(4))]
    #[test_case(&json!({"enum": []}), &json!(null); "empty enum rejects all")]
    #[test_case(&json!({"enum": ["1"]}), &json!(1))]
    fn enum_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn invalid_enum_schema() {
        tests_util::does_not_compile(&json!({"enum": "not-an-array"}))
    }
}
