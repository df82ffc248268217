//! Draft identifiers, vocabularies and keyword ordering.
//!
//! A [`Dialect`] is a draft plus the set of enabled vocabularies. Applying a
//! dialect to a schema object produces the ordered keyword sequence the
//! compiler walks: the catalog filtered down to keys present in the object,
//! topologically sorted so that every keyword runs after the siblings in its
//! dependency set. Annotation-consuming keywords (`unevaluatedItems`,
//! `unevaluatedProperties`) rely on that order.
use crate::catalog::{self, KeywordSpec};
use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::sync::Arc;

/// JSON Schema draft version.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord)]
pub enum Draft {
    /// JSON Schema Draft 3
    Draft3,
    /// JSON Schema Draft 4
    Draft4,
    /// JSON Schema Draft 6
    Draft6,
    /// JSON Schema Draft 7
    Draft7,
    /// JSON Schema Draft 2019-09
    Draft201909,
    /// JSON Schema Draft 2020-12
    Draft202012,
    /// The "next" draft, as published on json-schema.org
    DraftNext,
}

impl Default for Draft {
    fn default() -> Self {
        Draft::Draft202012
    }
}

impl Draft {
    /// The keyword holding the canonical identifier of a schema resource.
    pub(crate) const fn id_keyword(self) -> &'static str {
        match self {
            Draft::Draft3 | Draft::Draft4 => "id",
            _ => "$id",
        }
    }

    /// Whether `$anchor` / `$dynamicAnchor` style location-independent
    /// identifiers exist in this draft. Earlier drafts spell anchors as
    /// fragment-only `$id` values instead.
    pub(crate) const fn has_anchors(self) -> bool {
        matches!(self, Draft::Draft201909 | Draft::Draft202012 | Draft::DraftNext)
    }

    /// Whether `format` fails validation by default in this draft.
    pub(crate) const fn assertive_format(self) -> bool {
        matches!(self, Draft::Draft3 | Draft::Draft4 | Draft::Draft6 | Draft::Draft7)
    }

    /// The vocabularies this draft enables by default, with the URIs they are
    /// published under. Drafts before 2019-09 predate vocabularies and map
    /// everything onto their meta-schema URI.
    #[must_use]
    pub fn vocabularies(self) -> Vec<(Vocabulary, &'static str)> {
        [
            Vocabulary::Core,
            Vocabulary::Applicator,
            Vocabulary::Validation,
            Vocabulary::Unevaluated,
            if self.assertive_format() {
                Vocabulary::FormatAssertion
            } else {
                Vocabulary::FormatAnnotation
            },
            Vocabulary::Content,
            Vocabulary::MetaData,
        ]
        .into_iter()
        .map(|vocabulary| (vocabulary, vocabulary.uri(self)))
        .collect()
    }
}

/// Get the `Draft` from a `$schema` URL.
#[inline]
pub(crate) fn draft_from_url(url: &str) -> Option<Draft> {
    let normalized = url
        .trim_end_matches('#')
        .strip_prefix("https://")
        .or_else(|| url.trim_end_matches('#').strip_prefix("http://"))?;
    match normalized {
        "json-schema.org/draft/next/schema" => Some(Draft::DraftNext),
        "json-schema.org/draft/2020-12/schema" => Some(Draft::Draft202012),
        "json-schema.org/draft/2019-09/schema" => Some(Draft::Draft201909),
        "json-schema.org/draft-07/schema" => Some(Draft::Draft7),
        "json-schema.org/draft-06/schema" => Some(Draft::Draft6),
        "json-schema.org/draft-04/schema" => Some(Draft::Draft4),
        "json-schema.org/draft-03/schema" => Some(Draft::Draft3),
        _ => None,
    }
}

/// Get the `Draft` from a schema document, if it declares one.
#[inline]
pub(crate) fn draft_from_schema(schema: &Value) -> Option<Draft> {
    schema
        .get("$schema")
        .and_then(Value::as_str)
        .and_then(draft_from_url)
}

#[inline]
pub(crate) fn id_of(draft: Draft, schema: &Value) -> Option<&str> {
    if let Value::Object(object) = schema {
        object.get(draft.id_keyword()).and_then(Value::as_str)
    } else {
        None
    }
}

/// A named set of keywords defined by a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    /// `$id`, `$ref`, `$defs` and friends.
    Core,
    /// Keywords applying subschemas to parts of the instance.
    Applicator,
    /// Plain assertions: `type`, `enum`, bounds.
    Validation,
    /// `unevaluatedItems` / `unevaluatedProperties`.
    Unevaluated,
    /// `format` as an annotation.
    FormatAnnotation,
    /// `format` as an assertion.
    FormatAssertion,
    /// `contentEncoding` / `contentMediaType` / `contentSchema`.
    Content,
    /// `title`, `description` and other informational keywords.
    MetaData,
    /// Keywords this library carries beyond the published drafts.
    Extension,
}

impl Vocabulary {
    /// The identifier of this vocabulary within `draft`. Drafts before
    /// 2019-09 predate vocabularies; their keywords all map onto the draft
    /// meta-schema URI.
    pub(crate) fn uri(self, draft: Draft) -> &'static str {
        match draft {
            Draft::Draft3 => "http://json-schema.org/draft-03/schema",
            Draft::Draft4 => "http://json-schema.org/draft-04/schema",
            Draft::Draft6 => "http://json-schema.org/draft-06/schema",
            Draft::Draft7 => "http://json-schema.org/draft-07/schema",
            Draft::Draft201909 => match self {
                Vocabulary::Core => "https://json-schema.org/draft/2019-09/vocab/core",
                Vocabulary::Applicator => "https://json-schema.org/draft/2019-09/vocab/applicator",
                Vocabulary::Validation => "https://json-schema.org/draft/2019-09/vocab/validation",
                // 2019-09 has no separate unevaluated vocabulary yet
                Vocabulary::Unevaluated => "https://json-schema.org/draft/2019-09/vocab/applicator",
                Vocabulary::FormatAnnotation | Vocabulary::FormatAssertion => {
                    "https://json-schema.org/draft/2019-09/vocab/format"
                }
                Vocabulary::Content => "https://json-schema.org/draft/2019-09/vocab/content",
                Vocabulary::MetaData => "https://json-schema.org/draft/2019-09/vocab/meta-data",
                Vocabulary::Extension => "tag:polydraft:extension",
            },
            Draft::Draft202012 => match self {
                Vocabulary::Core => "https://json-schema.org/draft/2020-12/vocab/core",
                Vocabulary::Applicator => "https://json-schema.org/draft/2020-12/vocab/applicator",
                Vocabulary::Validation => "https://json-schema.org/draft/2020-12/vocab/validation",
                Vocabulary::Unevaluated => "https://json-schema.org/draft/2020-12/vocab/unevaluated",
                Vocabulary::FormatAnnotation => {
                    "https://json-schema.org/draft/2020-12/vocab/format-annotation"
                }
                Vocabulary::FormatAssertion => {
                    "https://json-schema.org/draft/2020-12/vocab/format-assertion"
                }
                Vocabulary::Content => "https://json-schema.org/draft/2020-12/vocab/content",
                Vocabulary::MetaData => "https://json-schema.org/draft/2020-12/vocab/meta-data",
                Vocabulary::Extension => "tag:polydraft:extension",
            },
            Draft::DraftNext => match self {
                Vocabulary::Core => "https://json-schema.org/draft/next/vocab/core",
                Vocabulary::Applicator => "https://json-schema.org/draft/next/vocab/applicator",
                Vocabulary::Validation => "https://json-schema.org/draft/next/vocab/validation",
                Vocabulary::Unevaluated => "https://json-schema.org/draft/next/vocab/unevaluated",
                Vocabulary::FormatAnnotation => {
                    "https://json-schema.org/draft/next/vocab/format-annotation"
                }
                Vocabulary::FormatAssertion => {
                    "https://json-schema.org/draft/next/vocab/format-assertion"
                }
                Vocabulary::Content => "https://json-schema.org/draft/next/vocab/content",
                Vocabulary::MetaData => "https://json-schema.org/draft/next/vocab/meta-data",
                Vocabulary::Extension => "tag:polydraft:extension",
            },
        }
    }

    const fn bit(self) -> u16 {
        match self {
            Vocabulary::Core => 1,
            Vocabulary::Applicator => 1 << 1,
            Vocabulary::Validation => 1 << 2,
            Vocabulary::Unevaluated => 1 << 3,
            Vocabulary::FormatAnnotation => 1 << 4,
            Vocabulary::FormatAssertion => 1 << 5,
            Vocabulary::Content => 1 << 6,
            Vocabulary::MetaData => 1 << 7,
            Vocabulary::Extension => 1 << 8,
        }
    }
}

/// An enabled-vocabulary bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VocabularySet(u16);

impl VocabularySet {
    pub(crate) const fn all() -> Self {
        VocabularySet(u16::MAX)
    }

    #[must_use]
    pub(crate) const fn with(mut self, vocabulary: Vocabulary) -> Self {
        self.0 |= vocabulary.bit();
        self
    }

    #[must_use]
    pub(crate) const fn without(mut self, vocabulary: Vocabulary) -> Self {
        self.0 &= !vocabulary.bit();
        self
    }

    pub(crate) const fn contains(self, vocabulary: Vocabulary) -> bool {
        self.0 & vocabulary.bit() != 0
    }
}

/// A draft plus the enabled vocabularies: everything needed to decide which
/// keywords are live in a schema object and how they behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    pub(crate) draft: Draft,
    pub(crate) vocabularies: VocabularySet,
}

impl Dialect {
    /// The default dialect of a draft. `strict_format` switches the format
    /// assertion vocabulary on for dialects where it is annotative.
    pub(crate) fn new(draft: Draft, strict_format: bool) -> Self {
        let mut vocabularies = VocabularySet::all().without(Vocabulary::FormatAssertion);
        if draft.assertive_format() || strict_format {
            vocabularies = vocabularies.with(Vocabulary::FormatAssertion);
        }
        Dialect { draft, vocabularies }
    }

    pub(crate) const fn draft(&self) -> Draft {
        self.draft
    }

    /// Whether `format` failures are validation failures under this dialect.
    pub(crate) fn assertive_format(&self) -> bool {
        self.vocabularies.contains(Vocabulary::FormatAssertion)
    }
}

type OrderingKey = (Draft, u16, Vec<&'static str>);

static ORDERING_MEMO: Lazy<RwLock<AHashMap<OrderingKey, Arc<Vec<&'static KeywordSpec>>>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

/// The ordered keyword sequence for a schema object under `dialect`.
///
/// The catalog is filtered to the keys present in `object` and the enabled
/// vocabularies, then layered topologically: each layer contains keywords
/// whose dependencies were already emitted, in catalog (lexicographic) order.
/// Memoised on `(draft, vocabularies, key set)`.
pub(crate) fn ordered_keywords(
    dialect: &Dialect,
    object: &Map<String, Value>,
) -> Arc<Vec<&'static KeywordSpec>> {
    let mut present: Vec<&'static KeywordSpec> = catalog::entries(dialect.draft)
        .iter()
        .filter(|spec| {
            object.contains_key(spec.keyword) && dialect.vocabularies.contains(spec.vocabulary)
        })
        .collect();
    let key = (
        dialect.draft,
        dialect.vocabularies.0,
        present.iter().map(|spec| spec.keyword).collect::<Vec<_>>(),
    );
    if let Some(cached) = ORDERING_MEMO.read().get(&key) {
        return Arc::clone(cached);
    }
    let ordered = Arc::new(topological_sort(&mut present));
    ORDERING_MEMO
        .write()
        .insert(key, Arc::clone(&ordered));
    ordered
}

fn topological_sort(specs: &mut Vec<&'static KeywordSpec>) -> Vec<&'static KeywordSpec> {
    let mut ordered = Vec::with_capacity(specs.len());
    let mut emitted: Vec<&'static str> = Vec::with_capacity(specs.len());
    while !specs.is_empty() {
        let mut progressed = false;
        let mut index = 0;
        while index < specs.len() {
            let spec = specs[index];
            let ready = spec.dependencies.iter().all(|dependency| {
                emitted.contains(dependency)
                    || !specs.iter().any(|other| other.keyword == *dependency)
            });
            if ready {
                emitted.push(spec.keyword);
                ordered.push(specs.remove(index));
                progressed = true;
            } else {
                index += 1;
            }
        }
        if !progressed {
            // A dependency cycle can only come from a defect in the static
            // tables; fall back to catalog order instead of spinning.
            debug_assert!(false, "keyword dependency cycle");
            ordered.append(specs);
            break;
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("http://json-schema.org/draft-07/schema#", Some(Draft::Draft7))]
    #[test_case("http://json-schema.org/draft-06/schema#", Some(Draft::Draft6))]
    #[test_case("http://json-schema.org/draft-04/schema#", Some(Draft::Draft4))]
    #[test_case("http://json-schema.org/draft-03/schema#", Some(Draft::Draft3))]
    #[test_case("https://json-schema.org/draft/2019-09/schema", Some(Draft::Draft201909))]
    #[test_case("https://json-schema.org/draft/2020-12/schema", Some(Draft::Draft202012))]
    #[test_case("https://json-schema.org/draft/next/schema", Some(Draft::DraftNext))]
    #[test_case("http://example.com/custom/schema#", None)]
    fn test_draft_from_url(url: &str, expected: Option<Draft>) {
        assert_eq!(draft_from_url(url), expected)
    }

    #[test]
    fn test_default() {
        assert_eq!(Draft::default(), Draft::Draft202012)
    }

    #[test]
    fn id_keyword_per_draft() {
        assert_eq!(
            id_of(Draft::Draft4, &json!({"id": "http://example.com/a"})),
            Some("http://example.com/a")
        );
        assert_eq!(id_of(Draft::Draft4, &json!({"$id": "http://example.com/a"})), None);
        assert_eq!(
            id_of(Draft::Draft7, &json!({"$id": "http://example.com/a"})),
            Some("http://example.com/a")
        );
    }

    fn keywords_of(dialect: &Dialect, schema: &serde_json::Value) -> Vec<&'static str> {
        let object = schema.as_object().expect("is an object");
        ordered_keywords(dialect, object)
            .iter()
            .map(|spec| spec.keyword)
            .collect()
    }

    #[test]
    fn dependents_come_after_dependencies() {
        let dialect = Dialect::new(Draft::Draft202012, false);
        let order = keywords_of(
            &dialect,
            &json!({
                "unevaluatedProperties": false,
                "additionalProperties": {},
                "patternProperties": {},
                "properties": {},
            }),
        );
        let position = |keyword: &str| {
            order
                .iter()
                .position(|k| *k == keyword)
                .unwrap_or_else(|| panic!("{} missing from {:?}", keyword, order))
        };
        assert!(position("properties") < position("additionalProperties"));
        assert!(position("patternProperties") < position("additionalProperties"));
        assert!(position("additionalProperties") < position("unevaluatedProperties"));
    }

    #[test]
    fn lexicographic_within_a_layer() {
        let dialect = Dialect::new(Draft::Draft7, false);
        let order = keywords_of(&dialect, &json!({"type": "string", "minLength": 1, "pattern": "a"}));
        assert_eq!(order, vec!["minLength", "pattern", "type"]);
    }

    #[test]
    fn later_draft_keywords_are_ignored() {
        let dialect = Dialect::new(Draft::Draft7, false);
        let order = keywords_of(
            &dialect,
            &json!({"type": "object", "unevaluatedProperties": false, "prefixItems": []}),
        );
        assert_eq!(order, vec!["type"]);
    }

    #[test]
    fn memo_returns_same_ordering() {
        let dialect = Dialect::new(Draft::Draft202012, false);
        let schema = json!({"properties": {}, "additionalProperties": false});
        let object = schema.as_object().expect("is an object");
        let first = ordered_keywords(&dialect, object);
        let second = ordered_keywords(&dialect, object);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
