use crate::{
    compilation::{compile_validators, context::CompilationContext, default_scope_for, Validator},
    dialect::{self, Dialect, Draft},
    error::SchemaError,
    formats::{FormatCheck, FormatRegistry},
    resolver::{DefaultResolver, Resolver, SchemaResolver},
};
use serde_json::Value;
use std::{fmt, sync::Arc};

/// Full configuration of a compile call: the closed option set of the engine.
///
/// ```rust
/// # use polydraft::{Draft, Validator};
/// # let schema = serde_json::json!({"type": "integer"});
/// let validator = Validator::options()
///     .with_draft(Draft::Draft201909)
///     .strict_integer(true)
///     .compile(&schema)
///     .expect("A valid schema");
/// assert!(!validator.is_valid(&serde_json::json!(1.0)));
/// ```
#[derive(Clone)]
pub struct ValidationOptions {
    draft: Option<Draft>,
    strict_format: bool,
    strict_integer: bool,
    quiet: bool,
    resolver: Arc<dyn SchemaResolver>,
    formats: FormatRegistry,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            draft: None,
            strict_format: false,
            strict_integer: false,
            quiet: false,
            resolver: Arc::new(DefaultResolver),
            formats: FormatRegistry::default(),
        }
    }
}

impl ValidationOptions {
    /// The draft used when the schema does not declare one via `$schema`.
    /// Defaults to [`Draft::Draft202012`].
    pub fn with_draft(&mut self, draft: Draft) -> &mut Self {
        self.draft = Some(draft);
        self
    }

    /// Treat `format` as an assertion even in dialects where it is an
    /// annotation by default (2019-09 and later).
    pub fn strict_format(&mut self, enabled: bool) -> &mut Self {
        self.strict_format = enabled;
        self
    }

    /// Make `type: "integer"` reject whole-valued floats such as `1.0`.
    pub fn strict_integer(&mut self, enabled: bool) -> &mut Self {
        self.strict_integer = enabled;
        self
    }

    /// Short-circuit at the first failure and return a minimal error tree.
    pub fn quiet(&mut self, enabled: bool) -> &mut Self {
        self.quiet = enabled;
        self
    }

    /// Use a custom resolver for external schema references; the registry
    /// calls it on every cache miss that the bundled meta-schemas don't cover.
    pub fn with_resolver(&mut self, resolver: impl SchemaResolver + 'static) -> &mut Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Register a named format predicate.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use polydraft::Validator;
    /// # use serde_json::json;
    /// let validator = Validator::options()
    ///     .with_format("even-length", Arc::new(|value: &str| value.len() % 2 == 0))
    ///     .strict_format(true)
    ///     .compile(&json!({"format": "even-length"}))
    ///     .expect("A valid schema");
    /// assert!(validator.is_valid(&json!("ab")));
    /// assert!(!validator.is_valid(&json!("abc")));
    /// ```
    pub fn with_format(&mut self, name: impl Into<String>, check: FormatCheck) -> &mut Self {
        self.formats.register(name, check);
        self
    }

    /// Compile `schema` under these options.
    pub fn compile(&self, schema: &Value) -> Result<Validator, SchemaError> {
        let config = Arc::new(self.clone());
        let default_draft = self.draft.unwrap_or_default();
        let draft = match schema.get("$schema") {
            None => default_draft,
            Some(Value::String(url)) => dialect::draft_from_url(url).unwrap_or(default_draft),
            Some(other) => return Err(SchemaError::UnknownDialect(other.to_string())),
        };
        let dialect = Dialect::new(draft, self.strict_format);
        let scope = default_scope_for(draft, schema)?;
        let resolver = Arc::new(Resolver::new(
            Arc::clone(&self.resolver),
            draft,
            &scope,
            Arc::new(schema.clone()),
        )?);
        let context = CompilationContext::new(scope.clone(), dialect, Arc::clone(&config));
        let node = compile_validators(schema, &context)?;
        Ok(Validator::build(node, config, resolver, dialect, scope))
    }

    pub(crate) fn strict_integer_enabled(&self) -> bool {
        self.strict_integer
    }

    pub(crate) fn strict_format_enabled(&self) -> bool {
        self.strict_format
    }

    pub(crate) fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub(crate) fn formats(&self) -> &FormatRegistry {
        &self.formats
    }
}

impl fmt::Debug for ValidationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationOptions")
            .field("draft", &self.draft)
            .field("strict_format", &self.strict_format)
            .field("strict_integer", &self.strict_integer)
            .field("quiet", &self.quiet)
            .field("formats", &self.formats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detected_draft_wins_over_default() {
        let schema = json!({"$schema": "http://json-schema.org/draft-06/schema#"});
        let validator = Validator::compile(&schema).expect("Is a valid schema");
        assert_eq!(validator.draft(), Draft::Draft6);
    }

    #[test]
    fn unknown_dialect_uri_falls_back() {
        let schema = json!({"$schema": "http://example.com/custom#", "type": "string"});
        let mut options = Validator::options();
        let validator = options
            .with_draft(Draft::Draft7)
            .compile(&schema)
            .expect("Is a valid schema");
        assert_eq!(validator.draft(), Draft::Draft7);
    }

    #[test]
    fn non_string_dialect_is_an_error() {
        let schema = json!({"$schema": 42});
        assert!(matches!(
            Validator::compile(&schema),
            Err(SchemaError::UnknownDialect(_))
        ));
    }
}
