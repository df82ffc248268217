use crate::{
    annotations::AnnotationState,
    compilation::{compile_validators, context::CompilationContext, SchemaNode},
    error::{ErrorNode, SchemaError},
    paths::{InstancePath, JsonPointer},
    validator::{format_validators, CompilationResult, Evaluation, Validate},
};
use serde_json::{Map, Value};

/// `if`/`then`/`else`. The condition runs in quiet mode; its errors are never
/// reported, but annotations of a successful condition are kept.
pub(crate) struct IfThenElseValidator {
    condition: SchemaNode,
    then_branch: Option<SchemaNode>,
    else_branch: Option<SchemaNode>,
    schema_path: JsonPointer,
}

impl IfThenElseValidator {
    #[inline]
    pub(crate) fn compile(
        condition: &Value,
        then_branch: Option<&Value>,
        else_branch: Option<&Value>,
        context: &CompilationContext,
    ) -> CompilationResult {
        Ok(Box::new(IfThenElseValidator {
            condition: {
                let if_context = context.with_path("if");
                compile_validators(condition, &if_context)?
            },
            then_branch: then_branch
                .map(|schema| {
                    let then_context = context.with_path("then");
                    compile_validators(schema, &then_context)
                })
                .transpose()?,
            else_branch: else_branch
                .map(|schema| {
                    let else_context = context.with_path("else");
                    compile_validators(schema, &else_context)
                })
                .transpose()?,
            schema_path: context.as_pointer_with("if"),
        }))
    }
}

impl Validate for IfThenElseValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        state: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        let (condition_state, condition_valid) =
            self.condition
                .is_valid_branch(ev, instance, instance_path, state)?;
        let branch = if condition_valid {
            state.merge(condition_state);
            self.then_branch.as_ref()
        } else {
            self.else_branch.as_ref()
        };
        match branch {
            Some(node) => {
                let (branch_state, child) = node.apply_branch(ev, instance, instance_path, state)?;
                if child.valid() {
                    state.merge(branch_state);
                }
                if ev.quiet {
                    return Ok(ErrorNode::flag(child.valid()));
                }
                Ok(ErrorNode::aggregate(
                    self.schema_path.clone(),
                    instance_path.into(),
                    vec![child],
                ))
            }
            None => Ok(if ev.quiet {
                ErrorNode::flag(true)
            } else {
                ErrorNode::valid_at(self.schema_path.clone(), instance_path.into())
            }),
        }
    }
}

impl core::fmt::Display for IfThenElseValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "if: {}", format_validators(&self.condition))?;
        if let Some(then_branch) = &self.then_branch {
            write!(f, ", then: {}", format_validators(then_branch))?;
        }
        if let Some(else_branch) = &self.else_branch {
            write!(f, ", else: {}", format_validators(else_branch))?;
        }
        Ok(())
    }
}

#[inline]
pub(crate) fn compile(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    // Compiled even without `then`/`else`: annotations of a successful `if`
    // still matter for `unevaluated*`
    Some(IfThenElseValidator::compile(
        schema,
        parent.get("then"),
        parent.get("else"),
        context,
    ))
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(4))]
    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(-3); "else is absent")]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(-4))]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(3); "then is absent")]
    #[test_case(&json!({"then": {"multipleOf": 2}}), &json!(3); "then without if is ignored")]
    #[test_case(&json!({"else": {"multipleOf": 2}}), &json!(3); "else without if is ignored")]
    fn conditional_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid(schema, instance)
    }

    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(3))]
    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(-3))]
    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}, "else": {"multipleOf": 3}}), &json!(-4))]
    fn conditional_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid(schema, instance)
    }

    #[test]
    fn condition_annotations_are_kept_on_success() {
        let schema = json!({
            "if": {"properties": {"a": {"type": "integer"}}, "required": ["a"]},
            "unevaluatedProperties": false
        });
        // `if` succeeded and evaluated `a`
        tests_util::is_valid(&schema, &json!({"a": 1}));
        // `if` failed, its annotations are dropped
        tests_util::is_not_valid(&schema, &json!({"a": "x"}));
    }

    #[test_case(&json!({"if": {"minimum": 0}, "else": {"multipleOf": 2}}), &json!(-1), "/else/multipleOf")]
    #[test_case(&json!({"if": {"minimum": 0}, "then": {"multipleOf": 2}}), &json!(3), "/then/multipleOf")]
    fn schema_path(schema: &Value, instance: &Value, expected: &str) {
        tests_util::assert_schema_path(schema, instance, expected)
    }
}
