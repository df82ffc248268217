//! Bundled meta-schemas.
//!
//! Documents published under `json-schema.org` are embedded so that `$ref`s
//! to meta-schemas and `$schema` validation work without network access. Both
//! the `http://` and `https://` spellings resolve here; every other URI goes
//! through the host resolver.
use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

macro_rules! schema {
    ($name:ident, $path:expr) => {
        static $name: Lazy<Arc<Value>> = Lazy::new(|| {
            Arc::new(serde_json::from_str(include_str!($path)).expect("Invalid schema"))
        });
    };
}

schema!(DRAFT3, "../../meta_schemas/draft3.json");
schema!(DRAFT4, "../../meta_schemas/draft4.json");
schema!(DRAFT6, "../../meta_schemas/draft6.json");
schema!(DRAFT7, "../../meta_schemas/draft7.json");
schema!(DRAFT201909, "../../meta_schemas/draft2019-09/schema.json");
schema!(
    DRAFT201909_APPLICATOR,
    "../../meta_schemas/draft2019-09/meta/applicator.json"
);
schema!(
    DRAFT201909_CONTENT,
    "../../meta_schemas/draft2019-09/meta/content.json"
);
schema!(DRAFT201909_CORE, "../../meta_schemas/draft2019-09/meta/core.json");
schema!(
    DRAFT201909_FORMAT,
    "../../meta_schemas/draft2019-09/meta/format.json"
);
schema!(
    DRAFT201909_META_DATA,
    "../../meta_schemas/draft2019-09/meta/meta-data.json"
);
schema!(
    DRAFT201909_VALIDATION,
    "../../meta_schemas/draft2019-09/meta/validation.json"
);
schema!(DRAFT202012, "../../meta_schemas/draft2020-12/schema.json");
schema!(
    DRAFT202012_APPLICATOR,
    "../../meta_schemas/draft2020-12/meta/applicator.json"
);
schema!(
    DRAFT202012_CONTENT,
    "../../meta_schemas/draft2020-12/meta/content.json"
);
schema!(DRAFT202012_CORE, "../../meta_schemas/draft2020-12/meta/core.json");
schema!(
    DRAFT202012_FORMAT_ANNOTATION,
    "../../meta_schemas/draft2020-12/meta/format-annotation.json"
);
schema!(
    DRAFT202012_META_DATA,
    "../../meta_schemas/draft2020-12/meta/meta-data.json"
);
schema!(
    DRAFT202012_UNEVALUATED,
    "../../meta_schemas/draft2020-12/meta/unevaluated.json"
);
schema!(
    DRAFT202012_VALIDATION,
    "../../meta_schemas/draft2020-12/meta/validation.json"
);
schema!(DRAFTNEXT, "../../meta_schemas/draft-next/schema.json");
schema!(
    DRAFTNEXT_APPLICATOR,
    "../../meta_schemas/draft-next/meta/applicator.json"
);
schema!(
    DRAFTNEXT_CONTENT,
    "../../meta_schemas/draft-next/meta/content.json"
);
schema!(DRAFTNEXT_CORE, "../../meta_schemas/draft-next/meta/core.json");
schema!(
    DRAFTNEXT_FORMAT_ANNOTATION,
    "../../meta_schemas/draft-next/meta/format-annotation.json"
);
schema!(
    DRAFTNEXT_META_DATA,
    "../../meta_schemas/draft-next/meta/meta-data.json"
);
schema!(
    DRAFTNEXT_UNEVALUATED,
    "../../meta_schemas/draft-next/meta/unevaluated.json"
);
schema!(
    DRAFTNEXT_VALIDATION,
    "../../meta_schemas/draft-next/meta/validation.json"
);

static BY_PATH: Lazy<AHashMap<&'static str, &'static Lazy<Arc<Value>>>> = Lazy::new(|| {
    let mut store: AHashMap<&'static str, &'static Lazy<Arc<Value>>> = AHashMap::new();
    store.insert("/draft-03/schema", &DRAFT3);
    store.insert("/draft-04/schema", &DRAFT4);
    store.insert("/draft-06/schema", &DRAFT6);
    store.insert("/draft-07/schema", &DRAFT7);
    store.insert("/draft/2019-09/schema", &DRAFT201909);
    store.insert("/draft/2019-09/meta/applicator", &DRAFT201909_APPLICATOR);
    store.insert("/draft/2019-09/meta/content", &DRAFT201909_CONTENT);
    store.insert("/draft/2019-09/meta/core", &DRAFT201909_CORE);
    store.insert("/draft/2019-09/meta/format", &DRAFT201909_FORMAT);
    store.insert("/draft/2019-09/meta/meta-data", &DRAFT201909_META_DATA);
    store.insert("/draft/2019-09/meta/validation", &DRAFT201909_VALIDATION);
    store.insert("/draft/2020-12/schema", &DRAFT202012);
    store.insert("/draft/2020-12/meta/applicator", &DRAFT202012_APPLICATOR);
    store.insert("/draft/2020-12/meta/content", &DRAFT202012_CONTENT);
    store.insert("/draft/2020-12/meta/core", &DRAFT202012_CORE);
    store.insert(
        "/draft/2020-12/meta/format-annotation",
        &DRAFT202012_FORMAT_ANNOTATION,
    );
    store.insert("/draft/2020-12/meta/meta-data", &DRAFT202012_META_DATA);
    store.insert("/draft/2020-12/meta/unevaluated", &DRAFT202012_UNEVALUATED);
    store.insert("/draft/2020-12/meta/validation", &DRAFT202012_VALIDATION);
    store.insert("/draft/next/schema", &DRAFTNEXT);
    store.insert("/draft/next/meta/applicator", &DRAFTNEXT_APPLICATOR);
    store.insert("/draft/next/meta/content", &DRAFTNEXT_CONTENT);
    store.insert("/draft/next/meta/core", &DRAFTNEXT_CORE);
    store.insert(
        "/draft/next/meta/format-annotation",
        &DRAFTNEXT_FORMAT_ANNOTATION,
    );
    store.insert("/draft/next/meta/meta-data", &DRAFTNEXT_META_DATA);
    store.insert("/draft/next/meta/unevaluated", &DRAFTNEXT_UNEVALUATED);
    store.insert("/draft/next/meta/validation", &DRAFTNEXT_VALIDATION);
    store
});

/// Look `url` up among the bundled documents.
pub(crate) fn bundled(url: &Url) -> Option<Arc<Value>> {
    if !matches!(url.scheme(), "http" | "https") || url.host_str() != Some("json-schema.org") {
        return None;
    }
    BY_PATH.get(url.path()).map(|lazy| Arc::clone(lazy))
}

#[cfg(test)]
mod tests {
    use super::bundled;
    use test_case::test_case;
    use url::Url;

    #[test_case("http://json-schema.org/draft-04/schema")]
    #[test_case("https://json-schema.org/draft-07/schema")]
    #[test_case("https://json-schema.org/draft/2019-09/schema")]
    #[test_case("https://json-schema.org/draft/2020-12/schema")]
    #[test_case("https://json-schema.org/draft/2020-12/meta/core")]
    #[test_case("https://json-schema.org/draft/next/schema")]
    fn known_documents(url: &str) {
        let url = Url::parse(url).expect("Is a valid URL");
        assert!(bundled(&url).is_some());
    }

    #[test_case("https://json-schema.org/draft/1999-01/schema")]
    #[test_case("https://example.com/draft-07/schema")]
    #[test_case("file:///draft-07/schema")]
    fn unknown_documents(url: &str) {
        let url = Url::parse(url).expect("Is a valid URL");
        assert!(bundled(&url).is_none());
    }

    #[test]
    fn parses_lazily() {
        let url = Url::parse("https://json-schema.org/draft/2020-12/meta/validation")
            .expect("Is a valid URL");
        let document = bundled(&url).expect("bundled");
        assert_eq!(
            document
                .get("$id")
                .and_then(serde_json::Value::as_str),
            Some("https://json-schema.org/draft/2020-12/meta/validation")
        );
    }
}
