use crate::{
    compilation::options::ValidationOptions,
    dialect::{self, Dialect},
    error::SchemaError,
    paths::JsonPointer,
};
use serde_json::Value;
use std::{borrow::Cow, sync::Arc};
use url::{ParseError, Url};

/// Context holds information about the dialect and scope in effect while a
/// subschema is compiled.
#[derive(Debug, Clone)]
pub(crate) struct CompilationContext<'a> {
    pub(crate) scope: Cow<'a, Url>,
    pub(crate) dialect: Dialect,
    pub(crate) config: Arc<ValidationOptions>,
    pub(crate) schema_path: Vec<String>,
}

impl<'a> CompilationContext<'a> {
    pub(crate) fn new(scope: Url, dialect: Dialect, config: Arc<ValidationOptions>) -> Self {
        CompilationContext {
            scope: Cow::Owned(scope),
            dialect,
            config,
            schema_path: Vec::with_capacity(4),
        }
    }

    /// Enter `schema`: apply its `$schema` dialect switch and push a new base
    /// URI scope if it carries an identifier.
    ///
    /// Before push:
    ///    scope = `http://example.com/`
    ///    `build_url("#/definitions/foo")` -> `http://example.com/#/definitions/foo`
    /// After push of a schema with `{"$id": "folder/", ...}`:
    ///    scope = `http://example.com/folder/`
    ///    `build_url("#/definitions/foo")` -> `http://example.com/folder/#/definitions/foo`
    #[inline]
    pub(crate) fn push(&'a self, schema: &Value) -> Result<Self, SchemaError> {
        let dialect = match schema.get("$schema") {
            None => self.dialect,
            Some(Value::String(url)) => match dialect::draft_from_url(url) {
                Some(draft) => Dialect::new(draft, self.config.strict_format_enabled()),
                // Unknown dialect URIs fall back to the caller's default
                None => self.dialect,
            },
            Some(other) => return Err(SchemaError::UnknownDialect(other.to_string())),
        };
        if let Some(id) = dialect::id_of(dialect.draft(), schema) {
            let mut scope = Url::options().base_url(Some(&self.scope)).parse(id)?;
            if let Some("") = scope.fragment() {
                scope.set_fragment(None);
            }
            // Fragment-only identifiers are anchors, not scope changes
            if scope.fragment().is_some() {
                return Ok(CompilationContext {
                    scope: Cow::Borrowed(self.scope.as_ref()),
                    dialect,
                    config: Arc::clone(&self.config),
                    schema_path: self.schema_path.clone(),
                });
            }
            Ok(CompilationContext {
                scope: Cow::Owned(scope),
                dialect,
                config: Arc::clone(&self.config),
                schema_path: self.schema_path.clone(),
            })
        } else {
            Ok(CompilationContext {
                scope: Cow::Borrowed(self.scope.as_ref()),
                dialect,
                config: Arc::clone(&self.config),
                schema_path: self.schema_path.clone(),
            })
        }
    }

    /// A context one schema path component deeper, e.g. under `then` while
    /// compiling `if`.
    pub(crate) fn with_path(&'a self, component: impl Into<String>) -> Self {
        let mut schema_path = self.schema_path.clone();
        schema_path.push(component.into());
        CompilationContext {
            scope: Cow::Borrowed(self.scope.as_ref()),
            dialect: self.dialect,
            config: Arc::clone(&self.config),
            schema_path,
        }
    }

    pub(crate) fn into_pointer(self) -> JsonPointer {
        JsonPointer::from(&self.schema_path)
    }

    pub(crate) fn as_pointer_with(&self, component: impl Into<String>) -> JsonPointer {
        JsonPointer::from(&self.schema_path).with_chunk(component.into())
    }

    /// Build a new URL. Used for `$ref` compilation to keep their full paths.
    pub(crate) fn build_url(&self, reference: &str) -> Result<Url, ParseError> {
        Url::options().base_url(Some(&self.scope)).parse(reference)
    }
}
