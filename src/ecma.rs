//! Adapter between ECMA 262 regular expressions and the backing engine.
//!
//! JSON Schema prescribes ECMA 262 semantics for `pattern`, `patternProperties`
//! and the `regex` format. `fancy-regex` covers look-arounds and
//! backreferences; the remaining differences (character class shorthands and
//! `\cX` control escapes) are rewritten textually before compilation.
use fancy_regex::Regex;

use crate::error::SchemaError;

/// Compile `pattern` for substring matching, the way `pattern` and
/// `patternProperties` use it.
pub(crate) fn compile_unanchored(pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(&translate(pattern)).map_err(|error| SchemaError::regex(pattern, &error))
}

/// Compile `pattern` so that it must match the whole input.
pub(crate) fn compile_anchored(pattern: &str) -> Result<Regex, SchemaError> {
    let translated = translate(pattern);
    Regex::new(&format!("^(?:{})$", translated))
        .map_err(|error| SchemaError::regex(pattern, &error))
}

pub(crate) fn is_match(regex: &Regex, text: &str) -> bool {
    // Backtracking limits surface as errors; an exhausted engine rejects.
    regex.is_match(text).unwrap_or(false)
}

// ECMA 262 has differences
fn translate(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    // To convert a character group we need to iterate over chars and in case
    // of `\` take a look at the next char to detect whether this group should
    // be converted
    while let Some(current) = chars.next() {
        if current == '\\' {
            match chars.next() {
                Some('d') => out.push_str("[0-9]"),
                Some('D') => out.push_str("[^0-9]"),
                Some('w') => out.push_str("[A-Za-z0-9_]"),
                Some('W') => out.push_str("[^A-Za-z0-9_]"),
                Some('s') => {
                    out.push_str("[ \t\n\r\u{000b}\u{000c}\u{2003}\u{feff}\u{2029}\u{00a0}]")
                }
                Some('S') => {
                    out.push_str("[^ \t\n\r\u{000b}\u{000c}\u{2003}\u{feff}\u{2029}\u{00a0}]")
                }
                Some('c') => {
                    // `\cA`..`\cZ` are control characters in ECMA 262
                    match chars.peek() {
                        Some(letter) if letter.is_ascii_alphabetic() => {
                            let letter = chars.next().expect("Peeked above");
                            out.push((letter.to_ascii_uppercase() as u8 - 64) as char);
                        }
                        _ => out.push_str("\\c"),
                    }
                }
                Some(next) => {
                    // Nothing interesting, push as is
                    out.push(current);
                    out.push(next);
                }
                None => {
                    // An incomplete escape sequence; the engine rejects it on
                    // the next step
                    out.push(current);
                }
            }
        } else {
            out.push(current);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{compile_anchored, compile_unanchored, is_match};
    use test_case::test_case;

    #[test_case(r"^[\w\-\.\+]+$", "CC-BY-4.0", true)]
    #[test_case(r"^[\w\-\.\+]+$", "CC-BY-!", false)]
    #[test_case(r"^\W+$", "1_0", false)]
    #[test_case(r"\\w", r"\w", true)]
    #[test_case(r"a\cJb", "a\nb", true)]
    #[test_case(r"(?=a)a", "a", true; "lookahead is supported")]
    fn regex_matches(pattern: &str, text: &str, is_matching: bool) {
        let compiled = compile_unanchored(pattern).expect("A valid regex");
        assert_eq!(is_match(&compiled, text), is_matching);
    }

    #[test]
    fn unanchored_matches_substring() {
        let compiled = compile_unanchored("b+").expect("A valid regex");
        assert!(is_match(&compiled, "abc"));
    }

    #[test]
    fn anchored_requires_full_match() {
        let compiled = compile_anchored("b+").expect("A valid regex");
        assert!(!is_match(&compiled, "abc"));
        assert!(is_match(&compiled, "bb"));
    }

    #[test_case(r"\")]
    #[test_case(r"a[")]
    fn invalid_patterns(pattern: &str) {
        assert!(compile_unanchored(pattern).is_err())
    }
}
