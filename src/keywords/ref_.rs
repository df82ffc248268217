//! Reference keywords: `$ref`, the 2019-09 `$recursiveRef` and the 2020-12
//! `$dynamicRef`.
//!
//! Targets compile lazily on first dereference. Compiling them eagerly could
//! loop forever on cyclic schemas, and during evaluation only shared
//! references are available, hence the lock around the compiled node. Every
//! dereference pushes the target's resource onto the dynamic scope stack.
use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    dialect::{Dialect, Draft},
    error::{ErrorNode, SchemaError},
    paths::{InstancePath, JsonPointer},
    validator::{BoxedValidator, CompilationResult, Evaluation, Validate},
};
use ahash::AHashMap;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;
use url::Url;

type CompiledTarget = Arc<(SchemaNode, Url)>;

fn compile_target(
    ev: &Evaluation<'_>,
    dialect: Dialect,
    scope: Url,
    schema: &Value,
    draft_hint: Option<Draft>,
) -> Result<CompiledTarget, SchemaError> {
    let dialect = match draft_hint {
        Some(draft) => Dialect::new(draft, ev.root.config().strict_format_enabled()),
        None => dialect,
    };
    let context = CompilationContext::new(scope.clone(), dialect, Arc::clone(ev.root.config()));
    let node = compile_validators(schema, &context)?;
    Ok(Arc::new((node, scope)))
}

fn apply_target(
    target: &CompiledTarget,
    ev: &mut Evaluation<'_>,
    instance: &Value,
    instance_path: &InstancePath,
    state: &mut AnnotationState,
    schema_path: &JsonPointer,
) -> Result<ErrorNode, SchemaError> {
    let (node, scope) = target.as_ref();
    let (branch, child) = ev.in_scope(scope.clone(), |ev| {
        node.apply_branch(ev, instance, instance_path, state)
    })?;
    if child.valid() {
        state.merge(branch);
    }
    if ev.quiet {
        return Ok(ErrorNode::flag(child.valid()));
    }
    Ok(child.rebase(schema_path))
}

pub(crate) struct RefValidator {
    reference: Url,
    original: String,
    dialect: Dialect,
    /// Precomputed sub-node. It cannot be computed at compile time without
    /// risking infinite loops of references.
    sub_node: RwLock<Option<CompiledTarget>>,
    schema_path: JsonPointer,
}

impl RefValidator {
    #[inline]
    pub(crate) fn compile(reference: &str, context: &CompilationContext) -> CompilationResult {
        Ok(Box::new(RefValidator {
            reference: context.build_url(reference)?,
            original: reference.to_string(),
            dialect: context.dialect,
            sub_node: RwLock::new(None),
            schema_path: context.clone().into_pointer(),
        }))
    }

    fn resolve(&self, ev: &Evaluation<'_>) -> Result<CompiledTarget, SchemaError> {
        if let Some(cached) = self.sub_node.read().as_ref() {
            return Ok(Arc::clone(cached));
        }
        let (scope, schema, draft_hint) = ev.root.resolver().resolve_fragment(
            self.dialect.draft(),
            &self.reference,
            &self.original,
        )?;
        let target = compile_target(ev, self.dialect, scope, &schema, draft_hint)?;
        *self.sub_node.write() = Some(Arc::clone(&target));
        Ok(target)
    }
}

impl Validate for RefValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let target = self.resolve(ev)?;
        apply_target(&target, ev, instance, instance_path, state, &self.schema_path)
    }
}

impl core::fmt::Display for RefValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$ref: {}", self.reference)
    }
}

/// `$recursiveRef: "#"`: behaves as `$ref: "#"` unless some resource in the
/// dynamic scope carries `$recursiveAnchor: true`, in which case the
/// outermost such resource wins.
pub(crate) struct RecursiveRefValidator {
    fallback: Url,
    dialect: Dialect,
    targets: RwLock<AHashMap<String, CompiledTarget>>,
    schema_path: JsonPointer,
}

impl RecursiveRefValidator {
    #[inline]
    pub(crate) fn compile(reference: &str, context: &CompilationContext) -> CompilationResult {
        if reference != "#" {
            return Err(SchemaError::invalid_schema(
                context.as_pointer_with("$recursiveRef"),
                "$recursiveRef only supports \"#\"",
            ));
        }
        Ok(Box::new(RecursiveRefValidator {
            fallback: context.build_url("#")?,
            dialect: context.dialect,
            targets: RwLock::new(AHashMap::new()),
            schema_path: context.clone().into_pointer(),
        }))
    }

    fn resolve(&self, ev: &Evaluation<'_>) -> Result<CompiledTarget, SchemaError> {
        let resolved = ev.root.resolver().resolve_recursive(&ev.scopes);
        let key = resolved
            .as_ref()
            .map_or_else(|| self.fallback.to_string(), |(url, _)| url.to_string());
        if let Some(cached) = self.targets.read().get(&key) {
            return Ok(Arc::clone(cached));
        }
        let target = match resolved {
            Some((scope, schema)) => compile_target(ev, self.dialect, scope, &schema, None)?,
            None => {
                let (scope, schema, draft_hint) =
                    ev.root
                        .resolver()
                        .resolve_fragment(self.dialect.draft(), &self.fallback, "#")?;
                compile_target(ev, self.dialect, scope, &schema, draft_hint)?
            }
        };
        self.targets.write().insert(key, Arc::clone(&target));
        Ok(target)
    }
}

impl Validate for RecursiveRefValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let target = self.resolve(ev)?;
        apply_target(&target, ev, instance, instance_path, state, &self.schema_path)
    }
}

impl core::fmt::Display for RecursiveRefValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("$recursiveRef: #")
    }
}

/// `$dynamicRef`: resolved against the dynamic scope when the fragment is a
/// plain anchor name; the outermost resource with a matching
/// `$dynamicAnchor` wins. Without a match it degrades to `$ref` semantics.
pub(crate) struct DynamicRefValidator {
    reference: Url,
    original: String,
    anchor: Option<String>,
    dialect: Dialect,
    targets: RwLock<AHashMap<String, CompiledTarget>>,
    schema_path: JsonPointer,
}

impl DynamicRefValidator {
    #[inline]
    pub(crate) fn compile(reference: &str, context: &CompilationContext) -> CompilationResult {
        let reference_url = context.build_url(reference)?;
        let anchor = reference_url
            .fragment()
            .filter(|fragment| !fragment.is_empty() && !fragment.starts_with('/'))
            .map(ToString::to_string);
        Ok(Box::new(DynamicRefValidator {
            reference: reference_url,
            original: reference.to_string(),
            anchor,
            dialect: context.dialect,
            targets: RwLock::new(AHashMap::new()),
            schema_path: context.clone().into_pointer(),
        }))
    }

    fn resolve(&self, ev: &Evaluation<'_>) -> Result<CompiledTarget, SchemaError> {
        let resolved = self
            .anchor
            .as_ref()
            .and_then(|anchor| ev.root.resolver().resolve_dynamic(anchor, &ev.scopes));
        let key = resolved
            .as_ref()
            .map_or_else(|| self.reference.to_string(), |(url, _)| url.to_string());
        if let Some(cached) = self.targets.read().get(&key) {
            return Ok(Arc::clone(cached));
        }
        let target = match resolved {
            Some((scope, schema)) => compile_target(ev, self.dialect, scope, &schema, None)?,
            None => {
                let (scope, schema, draft_hint) = ev.root.resolver().resolve_fragment(
                    self.dialect.draft(),
                    &self.reference,
                    &self.original,
                )?;
                compile_target(ev, self.dialect, scope, &schema, draft_hint)?
            }
        };
        self.targets.write().insert(key, Arc::clone(&target));
        Ok(target)
    }
}

impl Validate for DynamicRefValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let target = self.resolve(ev)?;
        apply_target(&target, ev, instance, instance_path, state, &self.schema_path)
    }
}

impl core::fmt::Display for DynamicRefValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "$dynamicRef: {}", self.reference)
    }
}

pub(crate) fn compile_ref(
    reference: &str,
    context: &CompilationContext,
) -> Result<BoxedValidator, SchemaError> {
    RefValidator::compile(reference, context)
}

#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::String(reference) => Some(RefValidator::compile(reference, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("$ref"),
            "$ref must be a string",
        ))),
    }
}

#[inline]
pub(crate) fn compile_recursive(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::String(reference) => Some(RecursiveRefValidator::compile(reference, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("$recursiveRef"),
            "$recursiveRef must be a string",
        ))),
    }
}

#[inline]
pub(crate) fn compile_dynamic(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    match schema {
        Value::String(reference) => Some(DynamicRefValidator::compile(reference, context)),
        _ => Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("$dynamicRef"),
            "$dynamicRef must be a string",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test]
    fn recursive_linked_list() {
        let schema = json!({
            "type": "object",
            "properties": {"next": {"$ref": "#"}}
        });
        tests_util::is_valid(&schema, &json!({"next": {"next": {}}}));
        tests_util::is_not_valid(&schema, &json!({"next": {"next": 1}}));
    }

    #[test]
    fn ref_into_definitions() {
        let schema = json!({
            "properties": {"foo": {"$ref": "#/definitions/foo"}},
            "definitions": {"foo": {"type": "string"}}
        });
        tests_util::is_valid(&schema, &json!({"foo": "bar"}));
        tests_util::assert_schema_path(&schema, &json!({"foo": 42}), "/properties/foo/type");
    }

    #[test]
    fn ref_to_plain_anchor() {
        let schema = json!({
            "$id": "https://example.com/root",
            "allOf": [{"$ref": "#plain"}],
            "$defs": {
                "a": {"$anchor": "plain", "type": "integer"}
            }
        });
        tests_util::is_valid(&schema, &json!(1));
        tests_util::is_not_valid(&schema, &json!("x"));
    }

    #[test]
    fn ref_hash_resolves_to_the_enclosing_resource() {
        // `$ref: "#"` inside a nested `$id` resource targets that resource,
        // not the document root
        let schema = json!({
            "$id": "https://example.com/outer",
            "properties": {
                "inner": {
                    "$id": "https://example.com/inner",
                    "type": "object",
                    "properties": {"next": {"$ref": "#"}}
                }
            }
        });
        tests_util::is_valid(&schema, &json!({"inner": {"next": {}}}));
        tests_util::is_not_valid(&schema, &json!({"inner": {"next": "scalar"}}));
    }

    #[test]
    fn recursive_ref_without_anchor_is_plain_ref() {
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "type": "object",
            "properties": {"next": {"$recursiveRef": "#"}}
        });
        tests_util::is_valid(&schema, &json!({"next": {"next": {}}}));
        tests_util::is_not_valid(&schema, &json!({"next": 1}));
    }

    #[test]
    fn recursive_anchor_retargets_to_the_outermost_resource() {
        // The extended schema references the base, whose $recursiveRef must
        // come back to the extension
        let schema = json!({
            "$schema": "https://json-schema.org/draft/2019-09/schema",
            "$id": "https://example.com/strict",
            "$recursiveAnchor": true,
            "$ref": "https://example.com/base",
            "unevaluatedProperties": false,
            "$defs": {
                "base": {
                    "$id": "https://example.com/base",
                    "$recursiveAnchor": true,
                    "type": "object",
                    "properties": {
                        "child": {"$recursiveRef": "#"}
                    }
                }
            }
        });
        tests_util::is_valid(&schema, &json!({"child": {}}));
        // `extra` is unevaluated in the nested object because the recursive
        // reference lands on the strict outer resource
        tests_util::is_not_valid(&schema, &json!({"child": {"extra": 1}}));
    }

    #[test]
    fn dynamic_ref_picks_the_outermost_dynamic_anchor() {
        let schema = json!({
            "$id": "https://example.com/strict-list",
            "$dynamicAnchor": "T",
            "type": "object",
            "allOf": [{"$ref": "https://example.com/list"}],
            "properties": {"kind": {"const": "object"}},
            "$defs": {
                "list": {
                    "$id": "https://example.com/list",
                    "$dynamicAnchor": "T",
                    "type": "object",
                    "properties": {
                        "next": {"$dynamicRef": "#T"}
                    }
                }
            }
        });
        // The nested `next` resolves `#T` through the dynamic scope back to
        // the outer schema, so the inner object must satisfy it as well
        tests_util::is_valid(&schema, &json!({"kind": "object", "next": {"kind": "object"}}));
        tests_util::is_not_valid(&schema, &json!({"kind": "object", "next": {"kind": "list"}}));
    }

    #[test]
    fn dynamic_ref_falls_back_to_static_resolution() {
        let schema = json!({
            "$id": "https://example.com/root",
            "properties": {
                "a": {"$dynamicRef": "#/$defs/inner"}
            },
            "$defs": {"inner": {"type": "integer"}}
        });
        tests_util::is_valid(&schema, &json!({"a": 1}));
        tests_util::is_not_valid(&schema, &json!({"a": "x"}));
    }

    #[test_case(&json!({"$ref": 42}))]
    #[test_case(&json!({"$ref": ":not-a-url:"}))]
    fn invalid_references(schema: &Value) {
        tests_util::does_not_compile(schema)
    }

    #[test]
    fn unresolvable_reference_is_an_infrastructure_error() {
        let schema = json!({"$ref": "#/definitions/missing"});
        let validator = crate::Validator::compile(&schema).expect("Compiles lazily");
        assert!(validator.validate(&json!(1)).is_err());
    }
}
