//! The keyword evaluation contract.
use crate::{
    annotations::AnnotationState,
    compilation::Validator,
    error::{ErrorNode, SchemaError},
    paths::InstancePath,
};
use serde_json::Value;
use std::fmt;
use url::Url;

/// Per-call evaluation state shared by every keyword in a validate call.
///
/// The compiled tree itself stays immutable; everything a call mutates lives
/// here: the dynamic scope used by `$recursiveRef`/`$dynamicRef`, the quiet
/// flag for speculative sub-evaluations, and the short-circuit flag for the
/// public quiet mode.
pub(crate) struct Evaluation<'a> {
    pub(crate) root: &'a Validator,
    /// Base URIs of the schema resources entered so far, outermost first.
    pub(crate) scopes: Vec<Url>,
    /// Errors of the current sub-evaluation will be discarded; skip building
    /// them and only track validity and annotations.
    pub(crate) quiet: bool,
    /// Stop at the first failure (the public `quiet` option).
    pub(crate) short_circuit: bool,
}

impl<'a> Evaluation<'a> {
    pub(crate) fn new(root: &'a Validator, scope: Url) -> Self {
        Evaluation {
            root,
            scopes: vec![scope],
            quiet: false,
            short_circuit: root.config().is_quiet(),
        }
    }

    /// Run `f` with errors suppressed; used for `if` and for combinator arms
    /// whose outcome may be discarded.
    pub(crate) fn speculative<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let was_quiet = self.quiet;
        self.quiet = true;
        let result = f(self);
        self.quiet = was_quiet;
        result
    }

    /// Run `f` with `scope` pushed onto the dynamic scope stack.
    pub(crate) fn in_scope<T>(&mut self, scope: Url, f: impl FnOnce(&mut Self) -> T) -> T {
        self.scopes.push(scope);
        let result = f(self);
        self.scopes.pop();
        result
    }
}

/// A compiled keyword checker.
///
/// `apply` reads the annotation state written by the keywords ordered before
/// it and may extend that state; it returns one error node even on success.
/// Infrastructure failures (an unresolvable reference discovered mid-flight,
/// a failing host callback) abort through `Err` and are not validation
/// errors.
pub(crate) trait Validate: Send + Sync + fmt::Display {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError>;
}

impl fmt::Debug for dyn Validate + Send + Sync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string())
    }
}

pub(crate) type BoxedValidator = Box<dyn Validate + Send + Sync>;
pub(crate) type CompilationResult = Result<BoxedValidator, SchemaError>;

pub(crate) fn format_validators(node: &crate::compilation::SchemaNode) -> String {
    let entries = node.entries();
    match entries.len() {
        0 => "{}".to_string(),
        1 => {
            let name = entries[0].1.to_string();
            match name.as_str() {
                // boolean validators are represented as is, without brackets
                // because they never sit next to other keywords
                "true" | "false" => name,
                _ => format!("{{{}}}", name),
            }
        }
        _ => format!(
            "{{{}}}",
            entries
                .iter()
                .map(|(_, validator)| validator.to_string())
                .collect::<Vec<String>>()
                .join(", ")
        ),
    }
}

pub(crate) fn format_vec_of_nodes(nodes: &[crate::compilation::SchemaNode]) -> String {
    nodes
        .iter()
        .map(format_validators)
        .collect::<Vec<String>>()
        .join(", ")
}

pub(crate) fn format_key_value_nodes(nodes: &[(String, crate::compilation::SchemaNode)]) -> String {
    nodes
        .iter()
        .map(|(name, node)| format!("{}: {}", name, format_validators(node)))
        .collect::<Vec<String>>()
        .join(", ")
}
