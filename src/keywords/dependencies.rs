//! `dependencies` and its 2019-09 split into `dependentRequired` and
//! `dependentSchemas`. Draft 3 additionally allows a single property name as
//! the dependency value.
use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    dialect::Draft,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::pass,
    paths::{InstancePath, JsonPointer},
    validator::{format_key_value_nodes, BoxedValidator, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

pub(crate) struct DependentRequiredValidator {
    dependencies: Vec<(String, Vec<String>)>,
    schema_path: JsonPointer,
}

impl DependentRequiredValidator {
    fn compile_entry(
        property: &str,
        value: &Value,
        allow_string: bool,
        schema_path: &JsonPointer,
    ) -> Result<Vec<String>, SchemaError> {
        match value {
            Value::Array(names) => {
                let mut required = Vec::with_capacity(names.len());
                for name in names {
                    match name {
                        Value::String(name) => required.push(name.clone()),
                        _ => {
                            return Err(SchemaError::invalid_schema(
                                schema_path.with_chunk(property),
                                "property dependencies must be strings",
                            ))
                        }
                    }
                }
                Ok(required)
            }
            Value::String(name) if allow_string => Ok(vec![name.clone()]),
            _ => Err(SchemaError::invalid_schema(
                schema_path.with_chunk(property),
                "dependency must be an array of property names",
            )),
        }
    }
}

impl Validate for DependentRequiredValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for (property, required) in &self.dependencies {
                if !object.contains_key(property) {
                    continue;
                }
                for name in required {
                    if !object.contains_key(name) {
                        if ev.quiet {
                            return Ok(ErrorNode::flag(false));
                        }
                        children.push(ErrorNode::invalid(
                            self.schema_path.with_chunk(property.clone()),
                            instance_path.into(),
                            ErrorKind::Dependency {
                                property: name.clone(),
                            },
                            instance,
                        ));
                    }
                }
            }
            if !children.is_empty() {
                return Ok(ErrorNode::aggregate(
                    self.schema_path.clone(),
                    instance_path.into(),
                    children,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for DependentRequiredValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dependentRequired: {{{}}}",
            self.dependencies
                .iter()
                .map(|(property, required)| format!("{}: [{}]", property, required.join(", ")))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

pub(crate) struct DependentSchemasValidator {
    dependencies: Vec<(String, SchemaNode)>,
    schema_path: JsonPointer,
}

impl Validate for DependentSchemasValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::Object(object) = instance {
            let mut children = Vec::new();
            for (property, node) in &self.dependencies {
                if !object.contains_key(property) {
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

impl core::fmt::Display for DependentSchemasValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dependentSchemas: {{{}}}",
            format_key_value_nodes(&self.dependencies)
        )
    }
}

fn compile_map(
    map: &Map<String, Value>,
    keyword: &'static str,
    split_schemas: bool,
    allow_string: bool,
    context: &CompilationContext,
) -> Result<(Vec<(String, Vec<String>)>, Vec<(String, SchemaNode)>), SchemaError> {
    let keyword_context = context.with_path(keyword);
    let schema_path = context.as_pointer_with(keyword);
    let mut required = Vec::new();
    let mut schemas = Vec::new();
    for (property, value) in map {
        match value {
            Value::Object(_) | Value::Bool(_) if split_schemas => {
                let subschema_context = keyword_context.with_path(property.clone());
                schemas.push((
                    property.clone(),
                    compile_validators(value, &subschema_context)?,
                ));
            }
            _ => {
                required.push((
                    property.clone(),
                    DependentRequiredValidator::compile_entry(
                        property,
                        value,
                        allow_string,
                        &schema_path,
                    )?,
                ));
            }
        }
    }
    Ok((required, schemas))
}

/// `dependencies`: each value is either a list of required names or a schema.
#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let Value::Object(map) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("dependencies"),
            "dependencies must be an object",
        )));
    };
    let allow_string = context.dialect.draft() == Draft::Draft3;
    let (required, schemas) = match compile_map(map, "dependencies", true, allow_string, context) {
        Ok(compiled) => compiled,
        Err(error) => return Some(Err(error)),
    };
    let mut validators: Vec<BoxedValidator> = Vec::new();
    if !required.is_empty() {
        validators.push(Box::new(DependentRequiredValidator {
            dependencies: required,
            schema_path: context.as_pointer_with("dependencies"),
        }));
    }
    if !schemas.is_empty() {
        validators.push(Box::new(DependentSchemasValidator {
            dependencies: schemas,
            schema_path: context.as_pointer_with("dependencies"),
        }));
    }
    match validators.len() {
        0 => None,
        1 => Some(Ok(validators.pop().expect("Is not empty"))),
        _ => Some(Ok(Box::new(CombinedDependenciesValidator { validators }))),
    }
}

/// Both value shapes in one `dependencies` object.
pub(crate) struct CombinedDependenciesValidator {
    validators: Vec<BoxedValidator>,
}

impl Validate for CombinedDependenciesValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let mut children = Vec::with_capacity(self.validators.len());
        for validator in &self.validators {
            let child = validator.apply(ev, instance, instance_path, state)?;
            if ev.quiet && !child.valid() {
                return Ok(ErrorNode::flag(false));
            }
            children.push(child);
        }
        if ev.quiet {
            return Ok(ErrorNode::flag(true));
        }
        Ok(ErrorNode::aggregate(
            JsonPointer::default(),
            instance_path.into(),
            children,
        ))
    }
}

impl core::fmt::Display for CombinedDependenciesValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "dependencies: {}",
            self.validators
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}

/// 2019-09 `dependentRequired`: only the array-of-names shape.
#[inline]
pub(crate) fn compile_dependent_required(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let Value::Object(map) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("dependentRequired"),
            "dependentRequired must be an object",
        )));
    };
    let schema_path = context.as_pointer_with("dependentRequired");
    let mut dependencies = Vec::with_capacity(map.len());
    for (property, value) in map {
        match DependentRequiredValidator::compile_entry(property, value, false, &schema_path) {
            Ok(required) => dependencies.push((property.clone(), required)),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(DependentRequiredValidator {
        dependencies,
        schema_path,
    })))
}

/// 2019-09 `dependentSchemas`: only the schema shape.
#[inline]
pub(crate) fn compile_dependent_schemas(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let Value::Object(map) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("dependentSchemas"),
            "dependentSchemas must be an object",
        )));
    };
    let keyword_context = context.with_path("dependentSchemas");
    let mut dependencies = Vec::with_capacity(map.len());
    for (property, value) in map {
        let subschema_context = keyword_context.with_path(property.clone());
        match compile_validators(value, &subschema_context) {
            Ok(node) => dependencies.push((property.clone(), node)),
            Err(error) => return Some(Err(error)),
        }
    }
    Some(Ok(Box::new(DependentSchemasValidator {
        dependencies,
        schema_path: context.as_pointer_with("dependentSchemas"),
    })))
}
