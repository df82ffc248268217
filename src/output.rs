//! Transformation of the raw error tree into the public verdict shape.
use crate::{
    compilation::Validator,
    error::{ErrorNode, SchemaError},
    paths::PathChunk,
};
use serde::Serialize;
use serde_json::Value;

/// The outcome of applying a schema to a document, with the output shape
/// decided by the method called. No evaluation happens before that call.
#[derive(Debug, Clone)]
pub struct Output<'a, 'b> {
    validator: &'a Validator,
    instance: &'b Value,
    embed_values: bool,
}

impl<'a, 'b> Output<'a, 'b> {
    pub(crate) const fn new(validator: &'a Validator, instance: &'b Value) -> Self {
        Output {
            validator,
            instance,
            embed_values: false,
        }
    }

    /// Embed the offending schema and document fragments by value into each
    /// reported error.
    #[must_use]
    pub fn with_embedded_values(mut self) -> Self {
        self.embed_values = true;
        self
    }

    /// Only the validity verdict, no error tree.
    #[must_use]
    pub fn flag(&self) -> bool {
        self.validator.is_valid(self.instance)
    }

    /// The verdict with failing branches of the error tree; valid leaves are
    /// pruned.
    pub fn verdict(&self) -> Result<Verdict, SchemaError> {
        let root = self.validator.apply_root(self.instance)?;
        Ok(self.reformat(&root, false))
    }

    /// The verdict with the full evaluation tree, valid leaves included.
    pub fn verbose(&self) -> Result<Verdict, SchemaError> {
        let root = self.validator.apply_root(self.instance)?;
        Ok(self.reformat(&root, true))
    }

    fn reformat(&self, root: &ErrorNode, verbose: bool) -> Verdict {
        if root.valid() && !verbose {
            return Verdict {
                valid: true,
                errors: None,
            };
        }
        let errors = self.collect(root, verbose);
        Verdict {
            valid: root.valid(),
            errors: Some(errors),
        }
    }

    /// Convert the children of a structural node, hoisting nested structural
    /// nodes so that the public tree only contains keyword-level entries.
    fn collect(&self, node: &ErrorNode, verbose: bool) -> Vec<ErrorDetail> {
        let mut details = Vec::new();
        for child in node.children() {
            if child.valid() && !verbose {
                continue;
            }
            if child.is_structural() {
                details.extend(self.collect(child, verbose));
            } else {
                details.push(self.convert(child, verbose));
            }
        }
        details
    }

    fn convert(&self, node: &ErrorNode, verbose: bool) -> ErrorDetail {
        let nested = self.collect(node, verbose);
        ErrorDetail {
            schema_path: node.schema_path().clone().into_vec(),
            document_path: node.instance_path().clone().into_vec(),
            message: node.message(),
            valid: node.valid(),
            errors: if nested.is_empty() { None } else { Some(nested) },
            schema: self
                .embed_values
                .then(|| lookup(self.validator.resolver().root_schema(), node.schema_path().as_slice()))
                .flatten(),
            document: self
                .embed_values
                .then(|| lookup(self.instance, node.instance_path().as_slice()))
                .flatten(),
        }
    }
}

/// Resolve a path against a document; `None` when the path crosses a
/// reference into another resource.
fn lookup(document: &Value, path: &[PathChunk]) -> Option<Value> {
    let mut target = document;
    for chunk in path {
        target = match chunk {
            PathChunk::Name(name) => target.get(name)?,
            PathChunk::Index(index) => target.get(index)?,
        };
    }
    Some(target.clone())
}

/// The public result of a validate call.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Verdict {
    /// Whether the document conforms to the schema.
    pub valid: bool,
    /// The error tree; `None` when the document is valid.
    pub errors: Option<Vec<ErrorDetail>>,
}

/// One node of the public error tree.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    /// Path of the keyword that produced this node within the schema.
    pub schema_path: Vec<String>,
    /// Path of the affected value within the document.
    pub document_path: Vec<String>,
    /// Human-readable description of the failure; empty on valid nodes in
    /// verbose output.
    pub message: String,
    /// Whether this subtree found its part of the document valid.
    pub valid: bool,
    /// Nested per-subschema results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorDetail>>,
    /// The offending subschema, embedded on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    /// The offending document fragment, embedded on request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Value>,
}

impl ErrorNode {
    /// Structural nodes only group their children; the reformatter hoists
    /// them out of the public tree.
    fn is_structural(&self) -> bool {
        self.kind.is_none()
    }
}
