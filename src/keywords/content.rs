//! `contentEncoding` / `contentMediaType`.
//!
//! Assertive in draft 7 only; from 2019-09 on these keywords are pure
//! annotations and compile to nothing. Only `base64` and `application/json`
//! have built-in checks, matching the published drafts.
use crate::{
    annotations::AnnotationState,
    compilation::context::CompilationContext,
    error::{ErrorKind, ErrorNode, SchemaError},
    keywords::{fail, pass},
    paths::{InstancePath, JsonPointer},
    validator::{CompilationResult, Evaluation, Validate},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{Map, Value};

pub(crate) struct ContentEncodingValidator {
    encoding: String,
    schema_path: JsonPointer,
}

impl ContentEncodingValidator {
    #[inline]
    pub(crate) fn compile(encoding: &str, schema_path: JsonPointer) -> CompilationResult {
        Ok(Box::new(ContentEncodingValidator {
            encoding: encoding.to_string(),
            schema_path,
        }))
    }
}

impl Validate for ContentEncodingValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::String(item) = instance {
            if STANDARD.decode(item).is_err() {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::ContentEncoding {
                        content_encoding: self.encoding.clone(),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for ContentEncodingValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contentEncoding: {}", self.encoding)
    }
}

pub(crate) struct ContentMediaTypeValidator {
    media_type: String,
    // Encoded payloads are decoded before the media type check
    base64: bool,
    schema_path: JsonPointer,
}

impl ContentMediaTypeValidator {
    #[inline]
    pub(crate) fn compile(
        media_type: &str,
        base64: bool,
        schema_path: JsonPointer,
    ) -> CompilationResult {
        Ok(Box::new(ContentMediaTypeValidator {
            media_type: media_type.to_string(),
            base64,
            schema_path,
        }))
    }
}

impl Validate for ContentMediaTypeValidator {
    fn apply(
        &self,
        ev: &mut Evaluation<'_>,
        instance: &Value,
        instance_path: &InstancePath,
        _: &mut AnnotationState,
    ) -> Result<ErrorNode, SchemaError> {
        if let Value::String(item) = instance {
            let is_json = if self.base64 {
                match STANDARD.decode(item) {
                    Ok(decoded) => serde_json::from_slice::<Value>(&decoded).is_ok(),
                    // The encoding failure belongs to `contentEncoding`
                    Err(_) => true,
                }
            } else {
                serde_json::from_str::<Value>(item).is_ok()
            };
            if !is_json {
                return Ok(fail(
                    ev,
                    &self.schema_path,
                    instance_path,
                    ErrorKind::ContentMediaType {
                        content_media_type: self.media_type.clone(),
                    },
                    instance,
                ));
            }
        }
        Ok(pass(ev, &self.schema_path, instance_path))
    }
}

impl core::fmt::Display for ContentMediaTypeValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "contentMediaType: {}", self.media_type)
    }
}

#[inline]
pub(crate) fn compile_content_encoding(
    _: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let Value::String(encoding) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("contentEncoding"),
            "contentEncoding must be a string",
        )));
    };
    match encoding.as_str() {
        "base64" => Some(ContentEncodingValidator::compile(
            encoding,
            context.as_pointer_with("contentEncoding"),
        )),
        _ => None,
    }
}

#[inline]
pub(crate) fn compile_media_type(
    parent: &Map<String, Value>,
    schema: &Value,
    context: &CompilationContext,
) -> Option<CompilationResult> {
    let Value::String(media_type) = schema else {
        return Some(Err(SchemaError::invalid_schema(
            context.as_pointer_with("contentMediaType"),
            "contentMediaType must be a string",
        )));
    };
    let base64 = matches!(parent.get("contentEncoding"), Some(Value::String(encoding)) if encoding == "base64");
    match media_type.as_str() {
        "application/json" => Some(ContentMediaTypeValidator::compile(
            media_type,
            base64,
            context.as_pointer_with("contentMediaType"),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::tests_util;
    use crate::Draft::Draft7;
    use serde_json::{json, Value};
    use test_case::test_case;

    #[test_case(&json!({"contentEncoding": "base64"}), &json!("YWJj"))]
    #[test_case(&json!({"contentEncoding": "unknown-encoding"}), &json!("anything"))]
    #[test_case(&json!({"contentMediaType": "application/json"}), &json!("{\"a\": 1}"))]
    #[test_case(&json!({"contentEncoding": "base64", "contentMediaType": "application/json"}), &json!("e30="); "base64 encoded JSON")]
    #[test_case(&json!({"contentMediaType": "application/json"}), &json!(12); "non-strings pass")]
    fn content_is_valid(schema: &Value, instance: &Value) {
        tests_util::is_valid_for(Draft7, schema, instance)
    }

    #[test_case(&json!({"contentEncoding": "base64"}), &json!("not base64!"))]
    #[test_case(&json!({"contentMediaType": "application/json"}), &json!("{"))]
    #[test_case(&json!({"contentEncoding": "base64", "contentMediaType": "application/json"}), &json!("eyJicm9rZW4i"); "valid base64, broken JSON")]
    fn content_is_not_valid(schema: &Value, instance: &Value) {
        tests_util::is_not_valid_for(Draft7, schema, instance)
    }

    #[test]
    fn annotative_from_2019_09() {
        tests_util::is_valid(&json!({"contentEncoding": "base64"}), &json!("not base64!"));
        tests_util::is_valid(&json!({"contentMediaType": "application/json"}), &json!("{"));
    }
}
