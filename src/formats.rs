//! Named format predicates plugged in by the host.
//!
//! The engine does not ship format implementations; it only knows how to look
//! a name up and, depending on the dialect, turn the answer into an assertion
//! or an annotation. Unknown formats are always accepted.
use ahash::AHashMap;
use std::{fmt, sync::Arc};

/// A host-provided predicate for a single named format.
pub type FormatCheck = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Default, Clone)]
pub(crate) struct FormatRegistry {
    checks: AHashMap<String, FormatCheck>,
}

impl FormatRegistry {
    pub(crate) fn register(&mut self, name: impl Into<String>, check: FormatCheck) {
        self.checks.insert(name.into(), check);
    }

    pub(crate) fn get(&self, name: &str) -> Option<&FormatCheck> {
        self.checks.get(name)
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.checks.keys().collect();
        names.sort_unstable();
        f.debug_struct("FormatRegistry").field("checks", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{FormatCheck, FormatRegistry};
    use std::sync::Arc;

    #[test]
    fn register_and_lookup() {
        let mut registry = FormatRegistry::default();
        let check: FormatCheck = Arc::new(|value| value.contains('@'));
        registry.register("email", check);
        let found = registry.get("email").expect("registered");
        assert!(found("user@example.com"));
        assert!(!found("not-an-email"));
        assert!(registry.get("unknown").is_none());
    }
}
