//! Property-based tests for name sanitization.

use proptest::prelude::*;
use tv_data::{sanitize, IdentifierSet, PLACEHOLDER};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Same input, same output, every call.
    #[test]
    fn prop_sanitize_is_deterministic(name in ".{0,24}") {
        prop_assert_eq!(sanitize(&name), sanitize(&name));
    }

    /// Output is a non-empty identifier of ASCII letters, digits and single
    /// underscores that does not start with a digit.
    #[test]
    fn prop_sanitize_yields_identifier(name in ".{0,24}") {
        let safe = sanitize(&name);
        let s = safe.as_str();
        prop_assert!(!s.is_empty());
        prop_assert!(s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        prop_assert!(!s.starts_with(|c: char| c.is_ascii_digit()));
        prop_assert!(!s.contains("__") || s == PLACEHOLDER);
        prop_assert!(!s.starts_with('_') || s == PLACEHOLDER);
    }

    /// Sanitizing a sanitized name changes nothing.
    #[test]
    fn prop_sanitize_is_idempotent(name in ".{0,24}") {
        let once = sanitize(&name);
        prop_assert_eq!(sanitize(once.as_str()), once);
    }

    /// Distinct names never share a claimed identifier, even ignoring case.
    #[test]
    fn prop_claims_never_collide(names in prop::collection::vec("[a-cA-C _-]{1,4}", 1..12)) {
        let mut set = IdentifierSet::new("dataset");
        let mut claimed: Vec<String> = Vec::new();
        for name in &names {
            if let Ok(safe) = set.claim(name) {
                let folded = safe.as_str().to_ascii_lowercase();
                prop_assert!(!claimed.contains(&folded));
                claimed.push(folded);
            }
        }
        prop_assert_eq!(set.len(), claimed.len());
    }
}
