//! The per-draft keyword catalog.
//!
//! Each entry names the vocabulary the keyword belongs to, the sibling
//! keywords whose results must be computed first, and the compile function
//! producing its checker. Tables are kept in lexicographic keyword order;
//! the dialect resolver relies on that order as the stable tie-break when it
//! topologically sorts the keywords present in a schema object.
//!
//! Keywords that establish identity (`$id`, `id`, `$anchor`, `$dynamicAnchor`,
//! `$schema`, `$vocabulary`) and the definition containers (`$defs`,
//! `definitions`) never produce checkers; the compiler and the registry
//! handle them structurally.
use crate::{
    compilation::context::CompilationContext,
    dialect::{Draft, Vocabulary},
    keywords::{self, legacy},
    validator::CompilationResult,
};
use serde_json::{Map, Value};

pub(crate) type CompileFunc =
    fn(&Map<String, Value>, &Value, &CompilationContext<'_>) -> Option<CompilationResult>;

pub(crate) struct KeywordSpec {
    pub(crate) keyword: &'static str,
    pub(crate) vocabulary: Vocabulary,
    pub(crate) dependencies: &'static [&'static str],
    pub(crate) compile: CompileFunc,
}

/// Consumed by a sibling (`then` by `if`, `minContains` by `contains`, the
/// boolean `exclusiveMaximum` by `maximum`) or purely annotative.
fn ignored(
    _: &Map<String, Value>,
    _: &Value,
    _: &CompilationContext<'_>,
) -> Option<CompilationResult> {
    None
}

macro_rules! keyword {
    ($name:literal, $vocabulary:ident, $compile:expr) => {
        KeywordSpec {
            keyword: $name,
            vocabulary: Vocabulary::$vocabulary,
            dependencies: &[],
            compile: $compile,
        }
    };
    ($name:literal, $vocabulary:ident, [$($dependency:literal),+], $compile:expr) => {
        KeywordSpec {
            keyword: $name,
            vocabulary: Vocabulary::$vocabulary,
            dependencies: &[$($dependency),+],
            compile: $compile,
        }
    };
}

const REF_DEPENDENCIES: &[&str] = &["$anchor", "$dynamicAnchor", "$id", "id"];

const UNEVALUATED_ITEMS_DEPENDENCIES: &[&str] = &[
    "$dynamicRef",
    "$recursiveRef",
    "$ref",
    "additionalItems",
    "allOf",
    "anyOf",
    "contains",
    "else",
    "if",
    "items",
    "not",
    "oneOf",
    "prefixItems",
    "then",
    "uniqueItems",
];

const UNEVALUATED_PROPERTIES_DEPENDENCIES: &[&str] = &[
    "$dynamicRef",
    "$recursiveRef",
    "$ref",
    "additionalProperties",
    "allOf",
    "anyOf",
    "dependencies",
    "dependentSchemas",
    "else",
    "if",
    "not",
    "oneOf",
    "patternProperties",
    "properties",
    "propertyDependencies",
    "then",
];

static DRAFT3: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "$ref",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile,
    },
    keyword!("additionalItems", Applicator, ["items"], keywords::additional_items::compile),
    keyword!(
        "additionalProperties",
        Applicator,
        ["patternProperties", "properties"],
        keywords::additional_properties::compile
    ),
    keyword!("dependencies", Applicator, keywords::dependencies::compile),
    keyword!("disallow", Validation, legacy::disallow::compile),
    keyword!("divisibleBy", Validation, keywords::multiple_of::compile_divisible_by),
    keyword!("enum", Validation, keywords::enum_::compile),
    keyword!("exclusiveMaximum", Validation, ["maximum"], ignored),
    keyword!("exclusiveMinimum", Validation, ["minimum"], ignored),
    keyword!("extends", Applicator, legacy::extends::compile),
    keyword!("format", Validation, keywords::format::compile),
    keyword!("items", Applicator, keywords::items::compile),
    keyword!("maxItems", Validation, keywords::max_items::compile),
    keyword!("maxLength", Validation, keywords::max_length::compile),
    keyword!("maximum", Validation, legacy::maximum_draft_4::compile),
    keyword!("minItems", Validation, keywords::min_items::compile),
    keyword!("minLength", Validation, keywords::min_length::compile),
    keyword!("minimum", Validation, legacy::minimum_draft_4::compile),
    keyword!("pattern", Validation, keywords::pattern::compile),
    keyword!("patternProperties", Applicator, keywords::pattern_properties::compile),
    keyword!("properties", Applicator, legacy::properties_draft_3::compile),
    keyword!("propertyDependencies", Extension, keywords::property_dependencies::compile),
    keyword!("type", Validation, legacy::type_draft_3::compile),
    keyword!("uniqueItems", Validation, keywords::unique_items::compile),
];

static DRAFT4: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "$ref",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile,
    },
    keyword!("additionalItems", Applicator, ["items"], keywords::additional_items::compile),
    keyword!(
        "additionalProperties",
        Applicator,
        ["patternProperties", "properties"],
        keywords::additional_properties::compile
    ),
    keyword!("allOf", Applicator, keywords::all_of::compile),
    keyword!("anyOf", Applicator, keywords::any_of::compile),
    keyword!("dependencies", Applicator, keywords::dependencies::compile),
    keyword!("enum", Validation, keywords::enum_::compile),
    keyword!("exclusiveMaximum", Validation, ["maximum"], ignored),
    keyword!("exclusiveMinimum", Validation, ["minimum"], ignored),
    keyword!("format", Validation, keywords::format::compile),
    keyword!("items", Applicator, keywords::items::compile),
    keyword!("maxItems", Validation, keywords::max_items::compile),
    keyword!("maxLength", Validation, keywords::max_length::compile),
    keyword!("maxProperties", Validation, keywords::max_properties::compile),
    keyword!("maximum", Validation, legacy::maximum_draft_4::compile),
    keyword!("minItems", Validation, keywords::min_items::compile),
    keyword!("minLength", Validation, keywords::min_length::compile),
    keyword!("minProperties", Validation, keywords::min_properties::compile),
    keyword!("minimum", Validation, legacy::minimum_draft_4::compile),
    keyword!("multipleOf", Validation, keywords::multiple_of::compile),
    keyword!("not", Applicator, keywords::not::compile),
    keyword!("oneOf", Applicator, keywords::one_of::compile),
    keyword!("pattern", Validation, keywords::pattern::compile),
    keyword!("patternProperties", Applicator, keywords::pattern_properties::compile),
    keyword!("properties", Applicator, keywords::properties::compile),
    keyword!("propertyDependencies", Extension, keywords::property_dependencies::compile),
    keyword!("required", Validation, keywords::required::compile),
    keyword!("type", Validation, legacy::type_draft_4::compile),
    keyword!("uniqueItems", Validation, keywords::unique_items::compile),
];

static DRAFT6: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "$ref",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile,
    },
    keyword!("additionalItems", Applicator, ["items"], keywords::additional_items::compile),
    keyword!(
        "additionalProperties",
        Applicator,
        ["patternProperties", "properties"],
        keywords::additional_properties::compile
    ),
    keyword!("allOf", Applicator, keywords::all_of::compile),
    keyword!("anyOf", Applicator, keywords::any_of::compile),
    keyword!("const", Validation, keywords::const_::compile),
    keyword!("contains", Applicator, keywords::contains::compile),
    keyword!("dependencies", Applicator, keywords::dependencies::compile),
    keyword!("enum", Validation, keywords::enum_::compile),
    keyword!("exclusiveMaximum", Validation, keywords::exclusive_maximum::compile),
    keyword!("exclusiveMinimum", Validation, keywords::exclusive_minimum::compile),
    keyword!("format", Validation, keywords::format::compile),
    keyword!("items", Applicator, keywords::items::compile),
    keyword!("maxItems", Validation, keywords::max_items::compile),
    keyword!("maxLength", Validation, keywords::max_length::compile),
    keyword!("maxProperties", Validation, keywords::max_properties::compile),
    keyword!("maximum", Validation, keywords::maximum::compile),
    keyword!("minItems", Validation, keywords::min_items::compile),
    keyword!("minLength", Validation, keywords::min_length::compile),
    keyword!("minProperties", Validation, keywords::min_properties::compile),
    keyword!("minimum", Validation, keywords::minimum::compile),
    keyword!("multipleOf", Validation, keywords::multiple_of::compile),
    keyword!("not", Applicator, keywords::not::compile),
    keyword!("oneOf", Applicator, keywords::one_of::compile),
    keyword!("pattern", Validation, keywords::pattern::compile),
    keyword!("patternProperties", Applicator, keywords::pattern_properties::compile),
    keyword!("properties", Applicator, keywords::properties::compile),
    keyword!("propertyDependencies", Extension, keywords::property_dependencies::compile),
    keyword!("propertyNames", Applicator, keywords::property_names::compile),
    keyword!("required", Validation, keywords::required::compile),
    keyword!("type", Validation, keywords::type_::compile),
    keyword!("uniqueItems", Validation, keywords::unique_items::compile),
];

static DRAFT7: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "$ref",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile,
    },
    keyword!("additionalItems", Applicator, ["items"], keywords::additional_items::compile),
    keyword!(
        "additionalProperties",
        Applicator,
        ["patternProperties", "properties"],
        keywords::additional_properties::compile
    ),
    keyword!("allOf", Applicator, keywords::all_of::compile),
    keyword!("anyOf", Applicator, keywords::any_of::compile),
    keyword!("const", Validation, keywords::const_::compile),
    keyword!("contains", Applicator, keywords::contains::compile),
    keyword!("contentEncoding", Content, keywords::content::compile_content_encoding),
    keyword!(
        "contentMediaType",
        Content,
        ["contentEncoding"],
        keywords::content::compile_media_type
    ),
    keyword!("dependencies", Applicator, keywords::dependencies::compile),
    keyword!("else", Applicator, ["if"], ignored),
    keyword!("enum", Validation, keywords::enum_::compile),
    keyword!("exclusiveMaximum", Validation, keywords::exclusive_maximum::compile),
    keyword!("exclusiveMinimum", Validation, keywords::exclusive_minimum::compile),
    keyword!("format", Validation, keywords::format::compile),
    keyword!("if", Applicator, keywords::if_::compile),
    keyword!("items", Applicator, keywords::items::compile),
    keyword!("maxItems", Validation, keywords::max_items::compile),
    keyword!("maxLength", Validation, keywords::max_length::compile),
    keyword!("maxProperties", Validation, keywords::max_properties::compile),
    keyword!("maximum", Validation, keywords::maximum::compile),
    keyword!("minItems", Validation, keywords::min_items::compile),
    keyword!("minLength", Validation, keywords::min_length::compile),
    keyword!("minProperties", Validation, keywords::min_properties::compile),
    keyword!("minimum", Validation, keywords::minimum::compile),
    keyword!("multipleOf", Validation, keywords::multiple_of::compile),
    keyword!("not", Applicator, keywords::not::compile),
    keyword!("oneOf", Applicator, keywords::one_of::compile),
    keyword!("pattern", Validation, keywords::pattern::compile),
    keyword!("patternProperties", Applicator, keywords::pattern_properties::compile),
    keyword!("properties", Applicator, keywords::properties::compile),
    keyword!("propertyDependencies", Extension, keywords::property_dependencies::compile),
    keyword!("propertyNames", Applicator, keywords::property_names::compile),
    keyword!("required", Validation, keywords::required::compile),
    keyword!("then", Applicator, ["if"], ignored),
    keyword!("type", Validation, keywords::type_::compile),
    keyword!("uniqueItems", Validation, keywords::unique_items::compile),
];

static DRAFT201909: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "$recursiveRef",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile_recursive,
    },
    KeywordSpec {
        keyword: "$ref",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile,
    },
    keyword!("additionalItems", Applicator, ["items"], keywords::additional_items::compile),
    keyword!(
        "additionalProperties",
        Applicator,
        ["patternProperties", "properties"],
        keywords::additional_properties::compile
    ),
    keyword!("allOf", Applicator, keywords::all_of::compile),
    keyword!("anyOf", Applicator, keywords::any_of::compile),
    keyword!("const", Validation, keywords::const_::compile),
    keyword!("contains", Applicator, keywords::contains::compile),
    keyword!("contentEncoding", Content, ignored),
    keyword!("contentMediaType", Content, ignored),
    keyword!("contentSchema", Content, ignored),
    keyword!("dependentRequired", Validation, keywords::dependencies::compile_dependent_required),
    keyword!("dependentSchemas", Applicator, keywords::dependencies::compile_dependent_schemas),
    keyword!("else", Applicator, ["if"], ignored),
    keyword!("enum", Validation, keywords::enum_::compile),
    keyword!("exclusiveMaximum", Validation, keywords::exclusive_maximum::compile),
    keyword!("exclusiveMinimum", Validation, keywords::exclusive_minimum::compile),
    keyword!("format", FormatAnnotation, keywords::format::compile),
    keyword!("if", Applicator, keywords::if_::compile),
    keyword!("items", Applicator, keywords::items::compile),
    keyword!("maxContains", Validation, ["contains"], ignored),
    keyword!("maxItems", Validation, keywords::max_items::compile),
    keyword!("maxLength", Validation, keywords::max_length::compile),
    keyword!("maxProperties", Validation, keywords::max_properties::compile),
    keyword!("maximum", Validation, keywords::maximum::compile),
    keyword!("minContains", Validation, ["contains"], ignored),
    keyword!("minItems", Validation, keywords::min_items::compile),
    keyword!("minLength", Validation, keywords::min_length::compile),
    keyword!("minProperties", Validation, keywords::min_properties::compile),
    keyword!("minimum", Validation, keywords::minimum::compile),
    keyword!("multipleOf", Validation, keywords::multiple_of::compile),
    keyword!("not", Applicator, keywords::not::compile),
    keyword!("oneOf", Applicator, keywords::one_of::compile),
    keyword!("pattern", Validation, keywords::pattern::compile),
    keyword!("patternProperties", Applicator, keywords::pattern_properties::compile),
    keyword!("properties", Applicator, keywords::properties::compile),
    keyword!("propertyDependencies", Extension, keywords::property_dependencies::compile),
    keyword!("propertyNames", Applicator, keywords::property_names::compile),
    keyword!("required", Validation, keywords::required::compile),
    keyword!("then", Applicator, ["if"], ignored),
    keyword!("type", Validation, keywords::type_::compile),
    KeywordSpec {
        keyword: "unevaluatedItems",
        vocabulary: Vocabulary::Unevaluated,
        dependencies: UNEVALUATED_ITEMS_DEPENDENCIES,
        compile: keywords::unevaluated_items::compile,
    },
    KeywordSpec {
        keyword: "unevaluatedProperties",
        vocabulary: Vocabulary::Unevaluated,
        dependencies: UNEVALUATED_PROPERTIES_DEPENDENCIES,
        compile: keywords::unevaluated_properties::compile,
    },
    keyword!("uniqueItems", Validation, keywords::unique_items::compile),
];

static DRAFT202012: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "$dynamicRef",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile_dynamic,
    },
    KeywordSpec {
        keyword: "$ref",
        vocabulary: Vocabulary::Core,
        dependencies: REF_DEPENDENCIES,
        compile: keywords::ref_::compile,
    },
    keyword!(
        "additionalProperties",
        Applicator,
        ["patternProperties", "properties"],
        keywords::additional_properties::compile
    ),
    keyword!("allOf", Applicator, keywords::all_of::compile),
    keyword!("anyOf", Applicator, keywords::any_of::compile),
    keyword!("const", Validation, keywords::const_::compile),
    keyword!("contains", Applicator, keywords::contains::compile),
    keyword!("contentEncoding", Content, ignored),
    keyword!("contentMediaType", Content, ignored),
    keyword!("contentSchema", Content, ignored),
    keyword!("dependentRequired", Validation, keywords::dependencies::compile_dependent_required),
    keyword!("dependentSchemas", Applicator, keywords::dependencies::compile_dependent_schemas),
    keyword!("else", Applicator, ["if"], ignored),
    keyword!("enum", Validation, keywords::enum_::compile),
    keyword!("exclusiveMaximum", Validation, keywords::exclusive_maximum::compile),
    keyword!("exclusiveMinimum", Validation, keywords::exclusive_minimum::compile),
    keyword!("format", FormatAnnotation, keywords::format::compile),
    keyword!("if", Applicator, keywords::if_::compile),
    keyword!("items", Applicator, ["prefixItems"], keywords::items::compile),
    keyword!("maxContains", Validation, ["contains"], ignored),
    keyword!("maxItems", Validation, keywords::max_items::compile),
    keyword!("maxLength", Validation, keywords::max_length::compile),
    keyword!("maxProperties", Validation, keywords::max_properties::compile),
    keyword!("maximum", Validation, keywords::maximum::compile),
    keyword!("minContains", Validation, ["contains"], ignored),
    keyword!("minItems", Validation, keywords::min_items::compile),
    keyword!("minLength", Validation, keywords::min_length::compile),
    keyword!("minProperties", Validation, keywords::min_properties::compile),
    keyword!("minimum", Validation, keywords::minimum::compile),
    keyword!("multipleOf", Validation, keywords::multiple_of::compile),
    keyword!("not", Applicator, keywords::not::compile),
    keyword!("oneOf", Applicator, keywords::one_of::compile),
    keyword!("pattern", Validation, keywords::pattern::compile),
    keyword!("patternProperties", Applicator, keywords::pattern_properties::compile),
    keyword!("prefixItems", Applicator, keywords::prefix_items::compile),
    keyword!("properties", Applicator, keywords::properties::compile),
    keyword!("propertyDependencies", Extension, keywords::property_dependencies::compile),
    keyword!("propertyNames", Applicator, keywords::property_names::compile),
    keyword!("required", Validation, keywords::required::compile),
    keyword!("then", Applicator, ["if"], ignored),
    keyword!("type", Validation, keywords::type_::compile),
    KeywordSpec {
        keyword: "unevaluatedItems",
        vocabulary: Vocabulary::Unevaluated,
        dependencies: UNEVALUATED_ITEMS_DEPENDENCIES,
        compile: keywords::unevaluated_items::compile,
    },
    KeywordSpec {
        keyword: "unevaluatedProperties",
        vocabulary: Vocabulary::Unevaluated,
        dependencies: UNEVALUATED_PROPERTIES_DEPENDENCIES,
        compile: keywords::unevaluated_properties::compile,
    },
    keyword!("uniqueItems", Validation, keywords::unique_items::compile),
];

pub(crate) fn entries(draft: Draft) -> &'static [KeywordSpec] {
    match draft {
        Draft::Draft3 => DRAFT3,
        Draft::Draft4 => DRAFT4,
        Draft::Draft6 => DRAFT6,
        Draft::Draft7 => DRAFT7,
        Draft::Draft201909 => DRAFT201909,
        // The "next" draft publishes `propertyDependencies`; everything else
        // matches 2020-12
        Draft::Draft202012 | Draft::DraftNext => DRAFT202012,
    }
}
