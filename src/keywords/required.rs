use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct RequiredValidator {
    required: Vec<String>,
    schema_path: JsonPointer,
}

impl RequiredValidator {
    #[inline]
    pub(crate) fn compile(items: &[Value], schema_path: JsonPointer) -> CompilationResult {
        let mut required = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(string) => required.push(string.clone()),
                _ => {
                    return Err(SchemaError::invalid_schema(
                        schema_path,
                        "required members must be strings",
                    ))
                }
            }
        }
        Ok(Box::new(RequiredValidator {
            required,
            schema_path,
        }))
    }
}

impl Validate for RequiredValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut missing = Vec::new();
            for property in &self.required {
                if !object.contains_key(property) {
                    if ev.quiet {
                        return Ok(ErrorNode::flag(false));
                    }
                    missing.push(ErrorNode::invalid(
                        self.schema_path.clone(),
                        instance_path.into(),
                        ErrorKind::Required {
                            property: property.clone(),
                        },
                        instance,
                    ));
                }
            }
            if !missing.is_empty() {
                return Ok(ErrorNode::aggregate(
                    self.schema_path.clone(),
                    instance_path.into(),
                    missing,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for RequiredValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "required: [{}]", self.required.join(", "))
    }
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let schema_path = context.as_pointer_with("required");
    match schema {
        Value::Array(items) => Some(RequiredValidator::compile(items, schema_path)),
        _ => Some(Err(SchemaError::invalid_schema(
            schema_path,
            "required must be an array of strings",
        ))),
    }
}
