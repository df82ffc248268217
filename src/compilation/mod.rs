//! Schema compilation.
//! The main idea is to compile the input JSON Schema to a validators tree
//! that will contain everything needed to perform such validation in runtime.
pub(crate) mod context;
pub(crate) mod options;

use crate::{
    annotations::AnnotationState,
    dialect::{self, Dialect, Draft},
    error::{ErrorNode, SchemaError},
    keywords,
    output::{Output, Verdict},
    paths::{InstancePath, JsonPointer},
    resolver::{Resolver, DEFAULT_ROOT_URL},
    validator::{BoxedValidator, Evaluation, Validate},
};
use context::CompilationContext;
use once_cell::sync::Lazy;
use options::ValidationOptions;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

pub(crate) static DEFAULT_SCOPE: Lazy<Url> =
    Lazy::new(|| Url::parse(DEFAULT_ROOT_URL).expect("Is a valid URL"));

/// The compiled form of one subschema: its ordered keyword checkers plus the
/// location they were compiled at.
#[derive(Debug)]
pub(crate) struct SchemaNode {
    location: JsonPointer,
    entries: Vec<(String, BoxedValidator)>,
}

impl SchemaNode {
    pub(crate) fn new_from_boolean(
        context: &CompilationContext<'_>,
        validator: Option<BoxedValidator>,
    ) -> SchemaNode {
        SchemaNode {
            location: JsonPointer::from(&context.schema_path),
            entries: match validator {
                Some(validator) => vec![(String::new(), validator)],
                None => Vec::new(),
            },
        }
    }

    pub(crate) fn new_from_keywords(
        context: &CompilationContext<'_>,
        entries: Vec<(String, BoxedValidator)>,
    ) -> SchemaNode {
        SchemaNode {
            location: JsonPointer::from(&context.schema_path),
            entries,
        }
    }

    pub(crate) fn entries(&self) -> &[(String, BoxedValidator)] {
        &self.entries
    }

    /// Apply every keyword in order, threading the annotation state so that
    /// later keywords observe what earlier applicators evaluated.
    pub(crate) fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if ev.quiet {
            for (_, validator) in &self.entries {
                if !validator.apply(ev, instance, instance_path, state)?.valid() {
                    return Ok(ErrorNode::flag(false));
                }
            }
            return Ok(ErrorNode::flag(true));
        }
        let mut children = Vec::with_capacity(self.entries.len());
        for (_, validator) in &self.entries {
            let child = validator.apply(ev, instance, instance_path, state)?;
            let failed = !child.valid();
            children.push(child);
            if failed && ev.short_circuit {
                break;
            }
        }
        Ok(ErrorNode::aggregate(
            self.location.clone(),
            JsonPointer::from(instance_path),
            children,
        ))
    }

    /// Apply this node as a branch over the same instance location: the
    /// branch sees the annotations accumulated so far and returns its own
    /// additions for the caller to merge on success.
    pub(crate) fn apply_branch(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        seed: &AnnotationState,
    ) -> Result<(AnnotationState, ErrorNode), SchemaError> {
        let mut branch = seed.clone();
        let node = self.apply(ev, instance, instance_path, &mut branch)?;
        Ok((branch, node))
    }

    /// Apply this node to a child instance location, where annotations start
    /// from scratch.
    pub(crate) fn apply_child(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
    ) -> Result<ErrorNode, SchemaError> {
        let mut state = AnnotationState::new();
        self.apply(ev, instance, instance_path, &mut state)
    }

    /// Boolean-only evaluation of this node as a branch.
    pub(crate) fn is_valid_branch(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        seed: &AnnotationState,
    ) -> Result<(AnnotationState, bool), SchemaError> {
        let mut branch = seed.clone();
        let valid = ev
            .speculative(|ev| self.apply(ev, instance, instance_path, &mut branch))?
            .valid();
        Ok((branch, valid))
    }
}

/// The structure that holds a JSON Schema compiled into a validation tree.
#[derive(Debug)]
pub struct Validator {
    pub(crate) node: SchemaNode,
    config: Arc<ValidationOptions>,
    resolver: Arc<Resolver>,
    dialect: Dialect,
    scope: Url,
}

impl Validator {
    /// Return a default [`ValidationOptions`] that can configure the
    /// compilation flow, e.g. pin the draft version:
    ///
    /// ```rust
    /// # use polydraft::{Draft, Validator};
    /// # let schema = serde_json::json!({});
    /// let validator = Validator::options()
    ///     .with_draft(Draft::Draft7)
    ///     .compile(&schema);
    /// ```
    #[must_use]
    pub fn options() -> ValidationOptions {
        ValidationOptions::default()
    }

    /// Compile the input schema into a validation tree.
    ///
    /// The method is equivalent to `Validator::options().compile(schema)`.
    pub fn compile(schema: &Value) -> Result<Validator, SchemaError> {
        Self::options().compile(schema)
    }

    /// Run validation against `instance` and return the verdict together with
    /// the error tree.
    pub fn validate(&self, instance: &Value) -> Result<Verdict, SchemaError> {
        self.apply(instance).verdict()
    }

    /// Run validation against `instance` but return a boolean result.
    /// Faster than [`Validator::validate`] since no error tree is built.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        let mut ev = Evaluation::new(self, self.scope.clone());
        let instance_path = InstancePath::new();
        let mut state = AnnotationState::new();
        ev.speculative(|ev| self.node.apply(ev, instance, &instance_path, &mut state))
            .map(|node| node.valid())
            .unwrap_or(false)
    }

    /// Apply the schema to `instance` and defer the choice of output shape to
    /// the returned [`Output`].
    #[must_use]
    pub const fn apply<'a, 'b>(&'a self, instance: &'b Value) -> Output<'a, 'b> {
        Output::new(self, instance)
    }

    /// The draft this schema was compiled against.
    #[must_use]
    pub fn draft(&self) -> Draft {
        self.dialect.draft()
    }

    pub(crate) fn config(&self) -> &Arc<ValidationOptions> {
        &self.config
    }

    pub(crate) fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub(crate) fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Evaluate the whole tree and return the raw root node.
    pub(crate) fn apply_root(&self, instance: &Value) -> Result<ErrorNode, SchemaError> {
        let mut ev = Evaluation::new(self, self.scope.clone());
        let instance_path = InstancePath::new();
        let mut state = AnnotationState::new();
        self.node.apply(&mut ev, instance, &instance_path, &mut state)
    }

    pub(crate) fn build(
        node: SchemaNode,
        config: Arc<ValidationOptions>,
        resolver: Arc<Resolver>,
        dialect: Dialect,
        scope: Url,
    ) -> Validator {
        Validator {
            node,
            config,
            resolver,
            dialect,
            scope,
        }
    }
}

/// Compile a JSON schema into a tree of validators.
pub(crate) fn compile_validators<'a>(
    schema: &Value,
    context: &CompilationContext<'a>,
) -> Result<SchemaNode, SchemaError> {
    let context = context.push(schema)?;
    match schema {
        Value::Bool(true) => Ok(SchemaNode::new_from_boolean(&context, None)),
        Value::Bool(false) => Ok(SchemaNode::new_from_boolean(
            &context,
            Some(keywords::boolean::FalseValidator::compile(
                context.clone().into_pointer(),
            )?),
        )),
        Value::Object(object) => {
            // Up to draft 7 any keywords beside `$ref` are ignored
            if context.dialect.draft() <= Draft::Draft7 {
                if let Some(reference) = object.get("$ref") {
                    let Value::String(reference) = reference else {
                        return Err(SchemaError::invalid_schema(
                            context.as_pointer_with("$ref"),
                            "$ref must be a string",
                        ));
                    };
                    let validator = keywords::ref_::compile_ref(reference, &context)?;
                    return Ok(SchemaNode::new_from_keywords(
                        &context,
                        vec![("$ref".to_string(), validator)],
                    ));
                }
            }
            let ordered = dialect::ordered_keywords(&context.dialect, object);
            let mut entries = Vec::with_capacity(ordered.len());
            for spec in ordered.iter() {
                let value = &object[spec.keyword];
                if let Some(result) = (spec.compile)(object, value, &context) {
                    entries.push((spec.keyword.to_string(), result?));
                }
            }
            Ok(SchemaNode::new_from_keywords(&context, entries))
        }
        _ => Err(SchemaError::invalid_schema(
            context.clone().into_pointer(),
            "schema must be a boolean or an object",
        )),
    }
}

pub(crate) fn default_scope_for(draft: Draft, schema: &Value) -> Result<Url, SchemaError> {
    match dialect::id_of(draft, schema) {
        Some(id) => {
            let mut url = Url::options().base_url(Some(&DEFAULT_SCOPE)).parse(id)?;
            if url.fragment().is_some() {
                url.set_fragment(None);
            }
            Ok(url)
        }
        None => Ok(DEFAULT_SCOPE.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::Validator;
    use serde_json::json;

    #[test]
    fn only_keyword() {
        // When only one keyword is specified
        let schema = json!({"type": "string"});
        let validator = Validator::compile(&schema).expect("Is a valid schema");
        // And only this validator is compiled
        assert_eq!(validator.node.entries().len(), 1);
        assert!(validator.is_valid(&json!("AB")));
        assert!(!validator.is_valid(&json!(1)));
    }

    #[test]
    fn wrong_schema_type() {
        let schema = json!([1]);
        assert!(Validator::compile(&schema).is_err());
    }

    #[test]
    fn ignored_keywords_produce_no_validators() {
        let schema = json!({"title": "whatever", "description": "-", "default": 42});
        let validator = Validator::compile(&schema).expect("Is a valid schema");
        assert_eq!(validator.node.entries().len(), 0);
    }

    #[test]
    fn ref_is_exclusive_up_to_draft_7() {
        let schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "$ref": "#/definitions/positive",
            "type": "string",
            "definitions": {"positive": {"minimum": 0}}
        });
        let validator = Validator::compile(&schema).expect("Is a valid schema");
        assert_eq!(validator.node.entries().len(), 1);
        // The `type` sibling is ignored, only the reference applies
        assert!(validator.is_valid(&json!(5)));
        assert!(!validator.is_valid(&json!(-5)));
    }

    #[test]
    fn ref_has_siblings_from_2019_09() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "$ref": "#/$defs/positive",
            "type": "integer",
            "$defs": {"positive": {"minimum": 0}}
        });
        let validator = Validator::compile(&schema).expect("Is a valid schema");
        assert!(validator.is_valid(&json!(5)));
        assert!(!validator.is_valid(&json!(5.5)));
        assert!(!validator.is_valid(&json!(-5)));
    }
}
