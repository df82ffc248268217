use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use fraction::{BigFraction, BigUint};
use serde_json::{Map, Value};

/// `multipleOf` with an integer divisor; plain remainder arithmetic is exact.
pub(crate) struct MultipleOfIntegerValidator {
    multiple_of: f64,
    schema_path: JsonPointer,
}

impl MultipleOfIntegerValidator {
    #[inline]
    pub(crate) fn compile(multiple_of: f64, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(MultipleOfIntegerValidator {
            multiple_of,
            schema_path,
        }))
    }
}

impl Validate for MultipleOfIntegerValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Number(item) = instance {
            let item = item.as_f64().expect("Always valid");
            if item % self.multiple_of != 0. {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::MultipleOf {
                        multiple_of: self.multiple_of,
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MultipleOfIntegerValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "multipleOf: {}", self.multiple_of)
    }
}

/// `multipleOf` with a fractional divisor; binary floating point cannot
/// represent most decimal fractions, so the quotient is checked as an exact
/// big rational.
pub(crate) struct MultipleOfFloatValidator {
    multiple_of: f64,
    schema_path: JsonPointer,
}

impl MultipleOfFloatValidator {
    #[inline]
    pub(crate) fn compile(multiple_of: f64, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(MultipleOfFloatValidator {
            multiple_of,
            schema_path,
        }))
    }
}

impl Validate for MultipleOfFloatValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Number(item) = instance {
            let item = item.as_f64().expect("Always valid");
            let remainder = (item / self.multiple_of).fract();
            if remainder != 0. {
                // The quotient is not an integer in binary representation;
                // decide exactly with rationals before failing
                let fraction = BigFraction::from(item) / BigFraction::from(self.multiple_of);
                if let Some(denom) = fraction.denom() {
                    if denom != &BigUint::from(1_u8) {
                        return Ok(fail(
                            ev,
                            &self.schema_path,
                            instance_path,
                            ErrorKind::MultipleOf {
                                multiple_of: self.multiple_of,
                            },
                            instance,
                        ));
                    }
                }
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for MultipleOfFloatValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "multipleOf: {}", self.multiple_of)
    }
}

fn compile_impl(
    schema: &Value,
    schema_path: JsonPointer,
) -> Option<CompilationResult> {
    if let Value::Number(multiple_of) = schema {
        let multiple_of = multiple_of.as_f64().expect("Always valid");
        if multiple_of.fract() == 0. {
            Some(MultipleOfIntegerValidator::compile(multiple_of, schema_path))
        } else {
            Some(MultipleOfFloatValidator::compile(multiple_of, schema_path))
        }
    } else {
        Some(Err(SchemaError::invalid_schema(
            schema_path,
            "multipleOf must be a number",
        )))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    compile_impl(schema, context.as_pointer_with("multipleOf"))
}

/// Draft 3 spells this keyword `divisibleBy`; the semantics are identical.
#[inline]
pub(crate) fn compile_divisible_by(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    compile_impl(schema, context.as_pointer_with("divisibleBy"))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"multipleOf": 2}), &json!(4))]
    #[test_case(&json!({"multipleOf": 1.0}), &json!(4.0))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(3.0))]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(1.1))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(1.2))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(1.3))]
    #[test_case(&json!({"multipleOf": 0.02}), &json!(1.02))]
    fn multiple_of_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"multipleOf": 1.0}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.1}), &json!(4.55))]
    #[test_case(&json!({"multipleOf": 0.2}), &json!(4.5))]
    #[test_case(&json!({"multipleOf": 0.02}), &json!(1.01))]
    fn multiple_of_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test_case(&json!({"multipleOf": 2}), &json!(3), "/multipleOf")]
    #[test_case(&json!({"multipleOf": 1.5}), &json!(5), "/multipleOf")]
    fn schema_path(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_path(schema, instance, expected)
    }
}
