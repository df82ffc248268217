use crate::{
    compilation::context::CompilationContext,
    keywords::type_,
    validator::CompilationResult,
};
use serde_json::{Map, Value};

/// Draft 4 `type`: same shapes as the modern keyword, but `integer` never
/// accepts whole-valued floats.
#[inline]
pub(crate) fn compile(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    type_::compile_with(schema, true, context.as_pointer_with("type"))
}
