//! `propertyDependencies`: a conditional applicator keyed by the string value
//! of a property. Carried for every draft as a library extension; the "next"
//! draft is the only published text that mentions it.
use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct PropertyDependenciesValidator {
    dependencies: Vec<(String, Vec<(String, SchemaNode)>)>,
    schema_path: JsonPointer,
}

impl PropertyDependenciesValidator {
    #[inline]
    pub(crate) fn compile(
        map: &Map<String, Value>,
        context: &CompilationContext,
    ) -> CompilationResult {
        let keyword_context = context.with_path("propertyDependencies");
        let mut dependencies = Vec::with_capacity(map.len());
        for (property, value) in map {
            let Value::Object(by_value) = value else {
                return Err(SchemaError::invalid_schema(
                    context.as_pointer_with("propertyDependencies"),
                    "propertyDependencies values must be objects",
                ));
            };
            let property_context = keyword_context.with_path(property.clone());
            let mut subschemas = Vec::with_capacity(by_value.len());
            for (expected, subschema) in by_value {
                let subschema_context = property_context.with_path(expected.clone());
                subschemas.push((
                    expected.clone(),
                    compile_validators(subschema, &subschema_context)?,
                ));
            }
            dependencies.push((property.clone(), subschemas));
        }
        Ok(Box::new(PropertyDependenciesValidator {
            dependencies,
            schema_path: context.as_pointer_with("propertyDependencies"),
        }))
    }
}

impl Validate for PropertyDependenciesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for (property, subschemas) in &self.dependencies {
                let Some(Value::String(actual)) = object.get(property) else {
                    continue;
                };
                for (expected, node) in subschemas {
                    if expected != actual {
                        continue;
                    }
                    let (branch, child) = node.apply_branch(ev, instance, instance_path, state)?;
                    if child.valid() {
                        state.merge(branch);
                    } else if ev.quiet {
                        return Ok(ErrorNode::flag(false));
                    }
                    children.push(child);
                }
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

impl core::fmt::Display for PropertyDependenciesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "propertyDependencies: {{{}}}",
            self.dependencies
                .iter()
                .map(|(property, subschemas)| {
                    format!(
                        "{}: {{{}}}",
                        property,
                        subschemas
                            .iter()
                            .map(|(expected, node)| format!(
                                "{}: {}",
                                expected,
                                format_validators(node)
                            ))
                            .collect::<Vec<String>>()
                            .join(", ")
                    )
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
        Value::Object(map) => Some(PropertyDependenciesValidator::compile(map, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("propertyDependencies"),
            "propertyDependencies must be an object",
        ))),
    }
}
