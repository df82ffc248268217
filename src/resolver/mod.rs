//! Schema registry and reference resolver.
//!
//! Indexes every named subschema of the root document under its canonical
//! URI, keeps secondary indices for anchors and dynamic anchors, and loads
//! remote documents on demand. Remote loads land in a synchronised store so a
//! compiled validator stays shareable across threads.
pub(crate) mod meta;

use crate::{
    dialect::{draft_from_schema, id_of, Draft},
    ecma,
    error::SchemaError,
    paths::JsonPointer,
};
use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use std::{borrow::Cow, sync::Arc};
use url::Url;

// The anchor name grammar shared by `$anchor` and `$dynamicAnchor`
static ANCHOR_NAME: Lazy<fancy_regex::Regex> = Lazy::new(|| {
    ecma::compile_anchored("[A-Za-z_][-A-Za-z0-9._:]*").expect("Is a valid regex")
});

/// An opaque error type that is returned by resolvers on resolution failures.
pub type SchemaResolverError = anyhow::Error;

/// A resolver that resolves external schema references.
/// Internal references such as `#/$defs` and JSON pointers are handled
/// internally.
///
/// All operations are blocking and it is not possible to return futures.
/// As a workaround, errors can be returned that will contain the schema URLs
/// to resolve and can be resolved outside the validation process if needed.
///
/// # Example
///
/// ```no_run
/// # use serde_json::{json, Value};
/// # use anyhow::anyhow;
/// # use polydraft::{SchemaResolver, SchemaResolverError};
/// # use std::sync::Arc;
/// # use url::Url;
///
/// struct MyCustomResolver;
///
/// impl SchemaResolver for MyCustomResolver {
///     fn resolve(&self, root_schema: &Value, url: &Url, _original_reference: &str) -> Result<Arc<Value>, SchemaResolverError> {
///         match url.scheme() {
///             "json-schema" => {
///                 Err(anyhow!("cannot resolve schema without root schema ID"))
///             },
///             "http" | "https" => {
///                 Ok(Arc::new(json!({ "description": "an external schema" })))
///             }
///             _ => Err(anyhow!("scheme is not supported"))
///         }
///     }
/// }
/// ```
pub trait SchemaResolver: Send + Sync {
    /// Resolve an external schema via an URL.
    ///
    /// Relative URLs are resolved based on the root schema's ID; if there is
    /// no root schema ID available, the scheme `json-schema` is used and any
    /// relative paths are turned into absolutes.
    fn resolve(
        &self,
        root_schema: &Value,
        url: &Url,
        original_reference: &str,
    ) -> Result<Arc<Value>, SchemaResolverError>;
}

pub(crate) struct DefaultResolver;

impl SchemaResolver for DefaultResolver {
    fn resolve(
        &self,
        _root_schema: &Value,
        url: &Url,
        _reference: &str,
    ) -> Result<Arc<Value>, SchemaResolverError> {
        match url.scheme() {
            "http" | "https" => {
                #[cfg(any(feature = "resolve-http", test))]
                {
                    let response = reqwest::blocking::get(url.as_str())?;
                    let document: Value = response.json()?;
                    Ok(Arc::new(document))
                }
                #[cfg(not(any(feature = "resolve-http", test)))]
                Err(anyhow::anyhow!("`resolve-http` feature or a custom resolver is required to resolve external schemas via HTTP"))
            }
            "file" => {
                #[cfg(any(feature = "resolve-file", test))]
                {
                    if let Ok(path) = url.to_file_path() {
                        let f = std::fs::File::open(path)?;
                        let document: Value = serde_json::from_reader(f)?;
                        Ok(Arc::new(document))
                    } else {
                        Err(anyhow::anyhow!("invalid file path"))
                    }
                }
                #[cfg(not(any(feature = "resolve-file", test)))]
                {
                    Err(anyhow::anyhow!("`resolve-file` feature or a custom resolver is required to resolve external schemas via files"))
                }
            }
            "json-schema" => Err(anyhow::anyhow!(
                "cannot resolve relative external schema without root schema ID"
            )),
            _ => Err(anyhow::anyhow!("unknown scheme {}", url.scheme())),
        }
    }
}

pub(crate) const DEFAULT_ROOT_URL: &str = "json-schema:///";

/// Canonical identifiers and anchors found inside one or more documents.
#[derive(Debug, Default)]
pub(crate) struct ResourceIndex {
    // canonical_id -> sub-schema mapping to resolve documents by their ID
    schemas: AHashMap<String, Arc<Value>>,
    // (base URI, anchor name) -> sub-schema
    anchors: AHashMap<(String, String), Arc<Value>>,
    // (base URI, dynamic anchor name) -> sub-schema
    dynamic_anchors: AHashMap<(String, String), Arc<Value>>,
    // bases whose resource root carries `$recursiveAnchor: true`
    recursive_roots: AHashSet<String>,
}

impl ResourceIndex {
    /// Walk `schema` and register every named subschema, anchor and dynamic
    /// anchor under the base URI in effect at its location.
    pub(crate) fn scan(
        &mut self,
        draft: Draft,
        schema: &Value,
        base: &Url,
    ) -> Result<(), SchemaError> {
        self.scan_inner(draft, schema, base, true)
    }

    fn scan_inner(
        &mut self,
        draft: Draft,
        schema: &Value,
        base: &Url,
        resource_root: bool,
    ) -> Result<(), SchemaError> {
        match schema {
            Value::Object(object) => {
                let mut scope = Cow::Borrowed(base);
                let mut at_resource_root = resource_root;
                if let Some(id) = id_of(draft, schema) {
                    let mut new_url = base.join(id)?;
                    // Empty fragments are discouraged and are not
                    // distinguishable from absent fragments
                    if matches!(new_url.fragment(), Some("") | None) {
                        new_url.set_fragment(None);
                        self.schemas
                            .insert(new_url.to_string(), Arc::new(schema.clone()));
                        scope = Cow::Owned(new_url);
                        at_resource_root = true;
                    } else {
                        // A fragment-only `$id` is a location-independent
                        // identifier in drafts up to 7; it does not open a
                        // new resource
                        self.schemas
                            .insert(new_url.to_string(), Arc::new(schema.clone()));
                    }
                }
                let base_key = fragmentless(&scope);
                if draft.has_anchors() {
                    if let Some(anchor) = object.get("$anchor").and_then(Value::as_str) {
                        check_anchor_name(anchor)?;
                        self.anchors
                            .insert((base_key.clone(), anchor.to_string()), Arc::new(schema.clone()));
                    }
                    if let Some(anchor) = object.get("$dynamicAnchor").and_then(Value::as_str) {
                        check_anchor_name(anchor)?;
                        self.anchors
                            .insert((base_key.clone(), anchor.to_string()), Arc::new(schema.clone()));
                        self.dynamic_anchors
                            .insert((base_key.clone(), anchor.to_string()), Arc::new(schema.clone()));
                    }
                }
                if draft == Draft::Draft201909
                    && at_resource_root
                    && object.get("$recursiveAnchor").and_then(Value::as_bool) == Some(true)
                {
                    self.recursive_roots.insert(base_key);
                }
                for (key, subschema) in object {
                    if key == "enum" || key == "const" {
                        continue;
                    }
                    self.scan_inner(draft, subschema, &scope, false)?;
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.scan_inner(draft, item, base, false)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn lookup_schema(&self, url: &str) -> Option<Arc<Value>> {
        self.schemas.get(url).cloned()
    }

    fn lookup_anchor(&self, base: &str, name: &str) -> Option<Arc<Value>> {
        self.anchors.get(&(base.to_string(), name.to_string())).cloned()
    }

    fn lookup_dynamic_anchor(&self, base: &str, name: &str) -> Option<Arc<Value>> {
        self.dynamic_anchors
            .get(&(base.to_string(), name.to_string()))
            .cloned()
    }

    fn has_recursive_root(&self, base: &str) -> bool {
        self.recursive_roots.contains(base)
    }
}

#[derive(Debug, Default)]
struct RemoteStore {
    documents: AHashMap<String, Arc<Value>>,
    index: ResourceIndex,
}

/// The schema registry: the root document plus everything loadable from it.
pub(crate) struct Resolver {
    external: Arc<dyn SchemaResolver>,
    root_schema: Arc<Value>,
    index: ResourceIndex,
    // Loaded remote documents and their identifiers. Filled during evaluation
    // when references are first dereferenced, hence the lock.
    remote: RwLock<RemoteStore>,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("root_schema", &self.root_schema)
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    pub(crate) fn new(
        external: Arc<dyn SchemaResolver>,
        draft: Draft,
        scope: &Url,
        schema: Arc<Value>,
    ) -> Result<Resolver, SchemaError> {
        let mut index = ResourceIndex::default();
        index.scan(draft, &schema, scope)?;
        Ok(Resolver {
            external,
            root_schema: schema,
            index,
            remote: RwLock::new(RemoteStore::default()),
        })
    }

    pub(crate) fn root_schema(&self) -> &Arc<Value> {
        &self.root_schema
    }

    /// Load a document for the given fragmentless `url`. It may be:
    ///   - the root document (`DEFAULT_ROOT_URL`) case;
    ///   - a named subschema of the root document;
    ///   - a bundled meta-schema;
    ///   - a document from a remote location;
    fn resolve_url(
        &self,
        draft: Draft,
        url: &Url,
        orig_ref: &str,
    ) -> Result<Arc<Value>, SchemaError> {
        if url.as_str() == DEFAULT_ROOT_URL {
            return Ok(Arc::clone(&self.root_schema));
        }
        if let Some(value) = self.index.lookup_schema(url.as_str()) {
            return Ok(value);
        }
        if let Some(cached) = self.remote.read().documents.get(url.as_str()) {
            return Ok(Arc::clone(cached));
        }
        let resolved = match meta::bundled(url) {
            Some(document) => document,
            None => self
                .external
                .resolve(&self.root_schema, url, orig_ref)
                .map_err(|error| SchemaError::resolver(url.as_str(), error))?,
        };
        let document_draft = draft_from_schema(&resolved).unwrap_or(draft);
        let mut store = self.remote.write();
        store.index.scan(document_draft, &resolved, url)?;
        store
            .documents
            .insert(url.as_str().to_string(), Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Resolve a URL possibly containing a fragment to a schema value.
    ///
    /// Returns the scope the target lives in and, when the target belongs to
    /// a document declaring its own `$schema`, the draft of that document.
    pub(crate) fn resolve_fragment(
        &self,
        draft: Draft,
        url: &Url,
        orig_ref: &str,
    ) -> Result<(Url, Arc<Value>, Option<Draft>), SchemaError> {
        let mut resource = url.clone();
        resource.set_fragment(None);
        let fragment = percent_encoding::percent_decode_str(url.fragment().unwrap_or(""))
            .decode_utf8()
            .map_err(|_| SchemaError::invalid_reference(orig_ref))?;

        // Location-independent identifiers are searched before trying to
        // resolve by fragmentless URL
        if let Some(document) = self.index.lookup_schema(url.as_str()) {
            return Ok((resource, document, None));
        }
        if !fragment.is_empty() && !fragment.starts_with('/') {
            if let Some(subschema) = self
                .index
                .lookup_anchor(resource.as_str(), &fragment)
                .or_else(|| self.remote.read().index.lookup_anchor(resource.as_str(), &fragment))
            {
                return Ok((resource, subschema, None));
            }
        }

        let document = self.resolve_url(draft, &resource, orig_ref)?;
        let document_draft = draft_from_schema(&document);
        if fragment.is_empty() {
            return Ok((resource, document, document_draft));
        }
        if !fragment.starts_with('/') {
            // The anchor may live in the freshly loaded document
            if let Some(subschema) = self
                .remote
                .read()
                .index
                .lookup_anchor(resource.as_str(), &fragment)
                .or_else(|| {
                    self.remote
                        .read()
                        .index
                        .lookup_schema(url.as_str())
                })
            {
                return Ok((resource, subschema, document_draft));
            }
            return Err(SchemaError::invalid_reference(url.as_str()));
        }
        let effective_draft = document_draft.unwrap_or(draft);
        match pointer(effective_draft, &document, fragment.as_ref()) {
            Some((folders, resolved)) => {
                let joined_folders = join_folders(resource, &folders)?;
                Ok((joined_folders, Arc::new(resolved.clone()), document_draft))
            }
            None => Err(SchemaError::invalid_reference(url.as_str())),
        }
    }

    /// `$recursiveRef: "#"`: the outermost dynamic scope whose resource root
    /// carries `$recursiveAnchor: true`.
    pub(crate) fn resolve_recursive(&self, scopes: &[Url]) -> Option<(Url, Arc<Value>)> {
        let remote = self.remote.read();
        for scope in scopes {
            let base = fragmentless(scope);
            if self.index.has_recursive_root(&base) || remote.index.has_recursive_root(&base) {
                let url = Url::parse(&base).ok()?;
                let document = if base == DEFAULT_ROOT_URL {
                    Arc::clone(&self.root_schema)
                } else {
                    self.index
                        .lookup_schema(&base)
                        .or_else(|| remote.documents.get(&base).cloned())
                        .or_else(|| remote.index.lookup_schema(&base))?
                };
                return Some((url, document));
            }
        }
        None
    }

    /// `$dynamicRef: "#name"`: the outermost dynamic scope whose resource has
    /// a matching `$dynamicAnchor`.
    pub(crate) fn resolve_dynamic(&self, name: &str, scopes: &[Url]) -> Option<(Url, Arc<Value>)> {
        let remote = self.remote.read();
        for scope in scopes {
            let base = fragmentless(scope);
            if let Some(subschema) = self
                .index
                .lookup_dynamic_anchor(&base, name)
                .or_else(|| remote.index.lookup_dynamic_anchor(&base, name))
            {
                let url = Url::parse(&base).ok()?;
                return Some((url, subschema));
            }
        }
        None
    }
}

fn check_anchor_name(anchor: &str) -> Result<(), SchemaError> {
    if ecma::is_match(&ANCHOR_NAME, anchor) {
        Ok(())
    } else {
        Err(SchemaError::invalid_schema(
            JsonPointer::default(),
            format!("invalid anchor name {:?}", anchor),
        ))
    }
}

fn fragmentless(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

fn join_folders(mut resource: Url, folders: &[&str]) -> Result<Url, SchemaError> {
    if folders.len() > 1 {
        for i in folders.iter().skip(1) {
            resource = resource.join(i)?;
        }
    }
    Ok(resource)
}

/// Searching twice is better than unconditionally allocating a String twice
trait MaybeReplaceExt<'a> {
    fn maybe_replace(self, needle: &str, replacement: &str) -> Cow<'a, str>;
}

impl<'a> MaybeReplaceExt<'a> for &'a str {
    fn maybe_replace(self, needle: &str, replacement: &str) -> Cow<'a, str> {
        if memchr::memmem::find(self.as_bytes(), needle.as_bytes()).is_some() {
            self.replace(needle, replacement).into()
        } else {
            self.into()
        }
    }
}

impl<'a> MaybeReplaceExt<'a> for Cow<'a, str> {
    fn maybe_replace(self, needle: &str, replacement: &str) -> Cow<'a, str> {
        if memchr::memmem::find(self.as_bytes(), needle.as_bytes()).is_some() {
            self.replace(needle, replacement).into()
        } else {
            self
        }
    }
}

/// JSON Pointer application which also tracks `$id` folders in the traversed
/// documents, so that relative references inside the target keep working.
pub(crate) fn pointer<'a>(
    draft: Draft,
    document: &'a Value,
    pointer: &str,
) -> Option<(Vec<&'a str>, &'a Value)> {
    if !pointer.starts_with('/') {
        return None;
    }
    let tokens = pointer
        .split('/')
        .skip(1)
        .map(|x| x.maybe_replace("~1", "/").maybe_replace("~0", "~"));
    let mut target = document;
    let mut folders = vec![];

    for token in tokens {
        let target_opt = match *target {
            Value::Object(ref map) => {
                if let Some(id) = id_of(draft, target) {
                    folders.push(id);
                }
                map.get(&*token)
            }
            Value::Array(ref list) => parse_index(&token).and_then(|x| list.get(x)),
            _ => return None,
        };
        if let Some(t) = target_opt {
            target = t;
        } else {
            return None;
        }
    }
    Some((folders, target))
}

fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        None
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_resolver(draft: Draft, schema: &Value) -> Resolver {
        Resolver::new(
            Arc::new(DefaultResolver),
            draft,
            &Url::parse(DEFAULT_ROOT_URL).expect("Is a valid URL"),
            Arc::new(schema.clone()),
        )
        .expect("Valid identifiers")
    }

    #[test]
    fn only_keyword() {
        // When only one keyword is specified
        let schema = json!({"type": "string"});
        let resolver = make_resolver(Draft::Draft7, &schema);
        // Then in the resolver index there should be no schemas
        assert_eq!(resolver.index.schemas.len(), 0);
    }

    #[test]
    fn sub_schema_in_object() {
        // When only one sub-schema is specified inside an object
        let schema = json!({
            "allOf": [{"$ref": "#foo"}],
            "definitions": {
                "A": {"$id": "#foo", "type": "integer"}
            }
        });
        let resolver = make_resolver(Draft::Draft7, &schema);
        // Then in the resolver index there should be only this schema
        assert_eq!(resolver.index.schemas.len(), 1);
        assert_eq!(
            resolver
                .index
                .lookup_schema("json-schema:///#foo")
                .as_deref(),
            schema.pointer("/definitions/A")
        );
    }

    #[test]
    fn root_schema_id() {
        // When the root schema has an ID
        let schema = json!({
            "$id": "http://localhost:1234/tree",
            "definitions": {
                "node": {
                    "$id": "http://localhost:1234/node",
                    "description": "node",
                    "properties": {
                        "subtree": {"$ref": "tree"},
                        "value": {"type": "number"}
                    },
                    "required": ["value"],
                    "type": "object"
                }
            },
            "description": "tree of nodes",
            "properties": {
                "meta": {"type": "string"},
                "nodes": {
                    "items": {"$ref": "node"},
                    "type": "array"
                }
            },
            "required": ["meta", "nodes"],
            "type": "object"
        });
        let resolver = make_resolver(Draft::Draft7, &schema);
        // Then in the resolver index there should be root & sub-schema
        assert_eq!(resolver.index.schemas.len(), 2);
        assert_eq!(
            resolver
                .index
                .lookup_schema("http://localhost:1234/tree")
                .as_deref(),
            schema.pointer("")
        );
        assert_eq!(
            resolver
                .index
                .lookup_schema("http://localhost:1234/node")
                .as_deref(),
            schema.pointer("/definitions/node")
        );
    }

    #[test]
    fn base_uri_change() {
        let schema = json!({
            "$id": "http://localhost:1234/",
            "items": {
                "$id": "folder/",
                "items": {"$ref": "folderInteger.json"}
            }
        });
        let resolver = make_resolver(Draft::Draft7, &schema);
        assert_eq!(resolver.index.schemas.len(), 2);
        assert_eq!(
            resolver
                .index
                .lookup_schema("http://localhost:1234/folder/")
                .as_deref(),
            schema.pointer("/items")
        );
    }

    #[test]
    fn anchors_are_indexed() {
        let schema = json!({
            "$id": "https://example.com/root",
            "$defs": {
                "a": {"$anchor": "plain", "type": "integer"},
                "b": {"$dynamicAnchor": "moving", "type": "string"}
            }
        });
        let resolver = make_resolver(Draft::Draft202012, &schema);
        assert_eq!(
            resolver
                .index
                .lookup_anchor("https://example.com/root", "plain")
                .as_deref(),
            schema.pointer("/$defs/a")
        );
        // A dynamic anchor is also a regular anchor
        assert_eq!(
            resolver
                .index
                .lookup_anchor("https://example.com/root", "moving")
                .as_deref(),
            schema.pointer("/$defs/b")
        );
        assert_eq!(
            resolver
                .index
                .lookup_dynamic_anchor("https://example.com/root", "moving")
                .as_deref(),
            schema.pointer("/$defs/b")
        );
    }

    #[test]
    fn recursive_roots_are_recorded() {
        let schema = json!({
            "$id": "https://example.com/strict-tree",
            "$recursiveAnchor": true,
            "unevaluatedProperties": false
        });
        let resolver = make_resolver(Draft::Draft201909, &schema);
        assert!(resolver.index.has_recursive_root("https://example.com/strict-tree"));
        let (url, document) = resolver
            .resolve_recursive(&[Url::parse("https://example.com/strict-tree").expect("valid")])
            .expect("resolves");
        assert_eq!(url.as_str(), "https://example.com/strict-tree");
        assert_eq!(document.as_ref(), &schema);
    }

    #[test]
    fn dynamic_resolution_picks_outermost() {
        let schema = json!({
            "$id": "https://example.com/outer",
            "$defs": {
                "a": {"$dynamicAnchor": "items", "type": "string"},
                "inner": {
                    "$id": "inner",
                    "$defs": {
                        "b": {"$dynamicAnchor": "items", "type": "number"}
                    }
                }
            }
        });
        let resolver = make_resolver(Draft::Draft202012, &schema);
        let outer = Url::parse("https://example.com/outer").expect("valid");
        let inner = Url::parse("https://example.com/inner").expect("valid");
        let (url, resolved) = resolver
            .resolve_dynamic("items", &[outer, inner])
            .expect("resolves");
        assert_eq!(url.as_str(), "https://example.com/outer");
        assert_eq!(resolved.as_ref(), schema.pointer("/$defs/a").expect("exists"));
    }

    #[test]
    fn resolve_ref() {
        let schema = json!({
            "$ref": "#/definitions/c",
            "definitions": {
                "a": {"type": "integer"},
                "b": {"$ref": "#/definitions/a"},
                "c": {"$ref": "#/definitions/b"}
            }
        });
        let resolver = make_resolver(Draft::Draft7, &schema);
        let url = Url::parse("json-schema:///#/definitions/a").expect("Is a valid URL");
        let (resource, resolved, _) = resolver
            .resolve_fragment(Draft::Draft7, &url, "#/definitions/a")
            .expect("resolves");
        assert_eq!(resource, Url::parse("json-schema:///").expect("Is a valid URL"));
        assert_eq!(resolved.as_ref(), schema.pointer("/definitions/a").expect("exists"));
    }

    #[test]
    fn bundled_meta_schema_is_found() {
        let schema = json!({"$ref": "http://json-schema.org/draft-07/schema#"});
        let resolver = make_resolver(Draft::Draft7, &schema);
        let url = Url::parse("http://json-schema.org/draft-07/schema").expect("Is a valid URL");
        let (_, resolved, draft) = resolver
            .resolve_fragment(Draft::Draft7, &url, "http://json-schema.org/draft-07/schema#")
            .expect("resolves");
        assert!(resolved.get("$schema").is_some());
        assert_eq!(draft, Some(Draft::Draft7));
    }

    #[test]
    fn escaped_pointer_tokens() {
        let schema = json!({"definitions": {"a/b": {"~tilde": {"type": "null"}}}});
        let (folders, target) =
            pointer(Draft::Draft7, &schema, "/definitions/a~1b/~0tilde").expect("resolves");
        assert!(folders.is_empty());
        assert_eq!(target, schema.pointer("/definitions/a~1b/~0tilde").expect("exists"));
    }
}
