//! Error types.
//!
//! Two disjoint taxonomies live here. [`SchemaError`] covers infrastructure
//! failures: a malformed schema, an unresolvable reference, a regex that does
//! not compile, a host resolver that gave up. Those abort the validate call.
//! [`ErrorNode`] is the raw validation tree: it is the expected product of a
//! validate call and never aborts anything.
use crate::{
    paths::JsonPointer,
    primitive_type::{PrimitiveType, PrimitiveTypesBitMap},
};
use serde_json::Value;
use std::{error, fmt};

/// The error type for failures that make validation impossible.
///
/// It includes cases when during validation a reference is resolved into an
/// invalid schema, which we can't know upfront because schemas can be in
/// remote locations.
#[derive(Debug)]
pub enum SchemaError {
    /// Invalid schema structure at the given location.
    InvalidSchema {
        /// Where in the schema document the problem is.
        path: JsonPointer,
        /// What exactly is wrong.
        detail: String,
    },
    /// A reference that cannot be resolved to a schema.
    InvalidReference(String),
    /// A regular expression that the engine rejects.
    Regex {
        /// The original ECMA 262 pattern.
        pattern: String,
        /// Engine diagnostics.
        detail: String,
    },
    /// A `$schema` value that is not a string.
    UnknownDialect(String),
    /// The host resolver failed to load a remote document.
    Resolver {
        /// The document that was requested.
        url: String,
        /// The opaque host error.
        source: anyhow::Error,
    },
    /// An identifier that is not a valid URI reference.
    UrlParse(url::ParseError),
}

impl SchemaError {
    pub(crate) fn invalid_schema(path: JsonPointer, detail: impl Into<String>) -> Self {
        SchemaError::InvalidSchema {
            path,
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_reference(reference: impl Into<String>) -> Self {
        SchemaError::InvalidReference(reference.into())
    }

    pub(crate) fn regex(pattern: &str, error: &impl fmt::Display) -> Self {
        SchemaError::Regex {
            pattern: pattern.to_string(),
            detail: error.to_string(),
        }
    }

    pub(crate) fn resolver(url: impl Into<String>, source: anyhow::Error) -> Self {
        SchemaError::Resolver {
            url: url.into(),
            source,
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::InvalidSchema { path, detail } => {
                if path.as_slice().is_empty() {
                    write!(f, "invalid schema: {}", detail)
                } else {
                    write!(f, "invalid schema at {}: {}", path, detail)
                }
            }
            SchemaError::InvalidReference(reference) => {
                write!(f, "unresolvable reference: {}", reference)
            }
            SchemaError::Regex { pattern, detail } => {
                write!(f, "invalid regular expression {:?}: {}", pattern, detail)
            }
            SchemaError::UnknownDialect(value) => {
                write!(f, "invalid $schema: {}", value)
            }
            SchemaError::Resolver { url, source } => {
                write!(f, "failed to resolve {}: {}", url, source)
            }
            SchemaError::UrlParse(error) => error.fmt(f),
        }
    }
}

impl error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SchemaError::Resolver { source, .. } => Some(source.as_ref()),
            SchemaError::UrlParse(error) => Some(error),
            _ => None,
        }
    }
}

impl From<url::ParseError> for SchemaError {
    #[inline]
    fn from(error: url::ParseError) -> Self {
        SchemaError::UrlParse(error)
    }
}

/// Kinds of validation failures a single keyword can produce.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum ErrorKind {
    /// The input value is not valid under any of the given schemas.
    AnyOf,
    /// The input value doesn't match the expected constant.
    Constant { expected_value: Value },
    /// The input array doesn't contain items conforming to the specified schema.
    Contains,
    /// The input value does not respect the defined `contentEncoding`.
    ContentEncoding { content_encoding: String },
    /// The input value does not respect the defined `contentMediaType`.
    ContentMediaType { content_media_type: String },
    /// A property is present although its dependency requirement is not met.
    Dependency { property: String },
    /// The input value matches a disallowed type (draft 3 `disallow`).
    Disallowed { disallowed: Value },
    /// The input value doesn't match any of the specified options.
    Enum { options: Value },
    /// Value is too large.
    ExclusiveMaximum { limit: Value },
    /// Value is too small.
    ExclusiveMinimum { limit: Value },
    /// Everything is invalid for the `false` schema.
    FalseSchema,
    /// The input doesn't match the specified format.
    Format { format: String },
    /// Value is too large.
    Maximum { limit: Value },
    /// Too many items matched `contains`.
    MaxContains { limit: u64 },
    /// Too many items in an array.
    MaxItems { limit: u64 },
    /// String is too long.
    MaxLength { limit: u64 },
    /// Too many properties in an object.
    MaxProperties { limit: u64 },
    /// Value is too small.
    Minimum { limit: Value },
    /// Too few items matched `contains`.
    MinContains { limit: u64 },
    /// Too few items in an array.
    MinItems { limit: u64 },
    /// String is too short.
    MinLength { limit: u64 },
    /// Not enough properties in an object.
    MinProperties { limit: u64 },
    /// The number is not a multiple of the divisor.
    MultipleOf { multiple_of: f64 },
    /// Negated schema failed validation.
    Not { schema: Value },
    /// The given value is valid under more than one of the given schemas.
    OneOfMultipleValid,
    /// The given value is not valid under any of the given schemas.
    OneOfNotValid,
    /// The input doesn't match the pattern.
    Pattern { pattern: String },
    /// A required property is missing.
    Required { property: String },
    /// The input value doesn't match the required types.
    Type { kind: TypeKind },
    /// The input array has non-unique elements.
    UniqueItems,
}

/// One or multiple types expected by the `type` keyword.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum TypeKind {
    Single(PrimitiveType),
    Multiple(PrimitiveTypesBitMap),
}

impl ErrorKind {
    /// Render the human-readable message for a failure over `instance`.
    pub(crate) fn message(&self, instance: Option<&Value>) -> String {
        let instance = Rendered(instance);
        match self {
            ErrorKind::AnyOf | ErrorKind::OneOfNotValid => format!(
                "{} is not valid under any of the given schemas",
                instance
            ),
            ErrorKind::Constant { expected_value } => format!("{} was expected", expected_value),
            ErrorKind::Contains => format!(
                "None of {} are valid under the given schema",
                instance
            ),
            ErrorKind::ContentEncoding { content_encoding } => format!(
                "{} is not compliant with {:?} content encoding",
                instance, content_encoding
            ),
            ErrorKind::ContentMediaType { content_media_type } => format!(
                "{} is not compliant with {:?} media type",
                instance, content_media_type
            ),
            ErrorKind::Dependency { property } => {
                format!("{:?} is a dependency of another property", property)
            }
            ErrorKind::Disallowed { disallowed } => {
                format!("{} is disallowed for {}", disallowed, instance)
            }
            ErrorKind::Enum { options } => {
                format!("{} is not one of {}", instance, options)
            }
            ErrorKind::ExclusiveMaximum { limit } => format!(
                "{} is greater than or equal to the maximum of {}",
                instance, limit
            ),
            ErrorKind::ExclusiveMinimum { limit } => format!(
                "{} is less than or equal to the minimum of {}",
                instance, limit
            ),
            ErrorKind::FalseSchema => format!("False schema does not allow {}", instance),
            ErrorKind::Format { format } => format!("{} is not a {:?}", instance, format),
            ErrorKind::Maximum { limit } => {
                format!("{} is greater than the maximum of {}", instance, limit)
            }
            ErrorKind::MaxContains { limit } => format!(
                "{} contains more than {} matching item{}",
                instance,
                limit,
                plural(*limit)
            ),
            ErrorKind::MaxItems { limit } => {
                format!("{} has more than {} item{}", instance, limit, plural(*limit))
            }
            ErrorKind::MaxLength { limit } => format!(
                "{} is longer than {} character{}",
                instance,
                limit,
                plural(*limit)
            ),
            ErrorKind::MaxProperties { limit } => format!(
                "{} has more than {} propert{}",
                instance,
                limit,
                if *limit == 1 { "y" } else { "ies" }
            ),
            ErrorKind::Minimum { limit } => {
                format!("{} is less than the minimum of {}", instance, limit)
            }
            ErrorKind::MinContains { limit } => format!(
                "{} contains less than {} matching item{}",
                instance,
                limit,
                plural(*limit)
            ),
            ErrorKind::MinItems { limit } => {
                format!("{} has less than {} item{}", instance, limit, plural(*limit))
            }
            ErrorKind::MinLength { limit } => format!(
                "{} is shorter than {} character{}",
                instance,
                limit,
                plural(*limit)
            ),
            ErrorKind::MinProperties { limit } => format!(
                "{} has less than {} propert{}",
                instance,
                limit,
                if *limit == 1 { "y" } else { "ies" }
            ),
            ErrorKind::MultipleOf { multiple_of } => {
                format!("{} is not a multiple of {}", instance, multiple_of)
            }
            ErrorKind::Not { schema } => format!("{} is not allowed for {}", schema, instance),
            ErrorKind::OneOfMultipleValid => format!(
                "{} is valid under more than one of the given schemas",
                instance
            ),
            ErrorKind::Pattern { pattern } => {
                format!("{} does not match {:?}", instance, pattern)
            }
            ErrorKind::Required { property } => {
                format!("{:?} is a required property", property)
            }
            ErrorKind::Type { kind: TypeKind::Single(expected) } => {
                format!("{} is not of type {:?}", instance, expected.to_string())
            }
            ErrorKind::Type { kind: TypeKind::Multiple(types) } => format!(
                "{} is not of types {}",
                instance,
                types
                    .into_iter()
                    .map(|t| format!("{:?}", t.to_string()))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ErrorKind::UniqueItems => format!("{} has non-unique elements", instance),
        }
    }
}

struct Rendered<'a>(Option<&'a Value>);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("the document"),
        }
    }
}

fn plural(count: u64) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// A node of the raw validation tree.
///
/// Every evaluated keyword yields one node, valid or not; a parent aggregates
/// its children and is invalid if the keyword's combination rule fails. Nodes
/// are immutable once emitted.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub(crate) schema_path: JsonPointer,
    pub(crate) instance_path: JsonPointer,
    pub(crate) kind: Option<ErrorKind>,
    pub(crate) instance: Option<Value>,
    pub(crate) valid: bool,
    pub(crate) children: Vec<ErrorNode>,
}

impl ErrorNode {
    /// A minimal node carrying nothing but the verdict; quiet mode output.
    pub(crate) fn flag(valid: bool) -> Self {
        ErrorNode {
            schema_path: JsonPointer::default(),
            instance_path: JsonPointer::default(),
            kind: None,
            instance: None,
            valid,
            children: Vec::new(),
        }
    }

    pub(crate) fn valid_at(schema_path: JsonPointer, instance_path: JsonPointer) -> Self {
        ErrorNode {
            schema_path,
            instance_path,
            kind: None,
            instance: None,
            valid: true,
            children: Vec::new(),
        }
    }

    pub(crate) fn invalid(
        schema_path: JsonPointer,
        instance_path: JsonPointer,
        kind: ErrorKind,
        instance: &Value,
    ) -> Self {
        ErrorNode {
            schema_path,
            instance_path,
            kind: Some(kind),
            instance: Some(instance.clone()),
            valid: false,
            children: Vec::new(),
        }
    }

    /// A parent whose validity is the conjunction of its children.
    pub(crate) fn aggregate(
        schema_path: JsonPointer,
        instance_path: JsonPointer,
        children: Vec<ErrorNode>,
    ) -> Self {
        let valid = children.iter().all(|child| child.valid);
        ErrorNode {
            schema_path,
            instance_path,
            kind: None,
            instance: None,
            valid,
            children,
        }
    }

    /// A combinator node with an explicit verdict, e.g. `oneOf` or `not`.
    pub(crate) fn combinator(
        schema_path: JsonPointer,
        instance_path: JsonPointer,
        valid: bool,
        kind: ErrorKind,
        instance: &Value,
        children: Vec<ErrorNode>,
    ) -> Self {
        ErrorNode {
            schema_path,
            instance_path,
            kind: Some(kind),
            instance: (!valid).then(|| instance.clone()),
            valid,
            children,
        }
    }

    /// Whether the subtree rooted here found the document valid.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// Where in the schema this node was produced.
    #[must_use]
    pub fn schema_path(&self) -> &JsonPointer {
        &self.schema_path
    }

    /// Where in the document this node was produced.
    #[must_use]
    pub fn instance_path(&self) -> &JsonPointer {
        &self.instance_path
    }

    /// Child nodes, one per evaluated keyword or subschema.
    #[must_use]
    pub fn children(&self) -> &[ErrorNode] {
        &self.children
    }

    /// The rendered failure message; empty for valid or purely structural nodes.
    #[must_use]
    pub fn message(&self) -> String {
        match &self.kind {
            Some(kind) if !self.valid => kind.message(self.instance.as_ref()),
            _ => String::new(),
        }
    }

    /// Prefix every schema path in the subtree, used when errors cross a
    /// reference boundary and must be reported relative to the referrer.
    pub(crate) fn rebase(mut self, prefix: &JsonPointer) -> Self {
        self.schema_path = prefix.extend_with(self.schema_path.as_slice());
        self.children = self
            .children
            .into_iter()
            .map(|child| child.rebase(prefix))
            .collect();
        self
    }

}
