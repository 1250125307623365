//! Filename and script-identifier sanitization.
//!
//! [`sanitize`] is pure and deterministic: the page builder and the project
//! builder both derive data file names from it independently, so the same
//! input must always produce the same output.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::error::IdentifierError;

/// Fallback for names with no usable characters.
pub const PLACEHOLDER: &str = "unnamed";

/// A name safe to use as a file stem and as a JavaScript identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SafeName(String);

impl SafeName {
    /// Borrow the sanitized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SafeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Map an arbitrary name to a [`SafeName`].
///
/// ASCII alphanumerics are kept; every other character becomes `_`; runs of
/// `_` collapse to one; leading and trailing `_` are dropped. A leading digit
/// gets an `n` prefix, and an empty result becomes [`PLACEHOLDER`].
pub fn sanitize(name: &str) -> SafeName {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        SafeName(PLACEHOLDER.to_string())
    } else if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        SafeName(format!("n{}", trimmed))
    } else {
        SafeName(trimmed.to_string())
    }
}

/// Tracks sanitized names within one scope and rejects collisions.
///
/// Names are compared ASCII case-insensitively: `Sales.csv` and `sales.csv`
/// are one file on case-insensitive filesystems.
#[derive(Debug, Clone)]
pub struct IdentifierSet {
    kind: &'static str,
    claimed: HashMap<String, String>,
}

impl IdentifierSet {
    /// Create an empty set; `kind` labels error messages ("element", "dataset").
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            claimed: HashMap::new(),
        }
    }

    /// Claim the sanitized form of `original`.
    ///
    /// Claiming the same original twice is [`IdentifierError::Duplicate`];
    /// two different originals whose sanitized forms differ at most in ASCII
    /// case is [`IdentifierError::Ambiguous`].
    pub fn claim(&mut self, original: &str) -> Result<SafeName, IdentifierError> {
        let safe = sanitize(original);
        let key = safe.as_str().to_ascii_lowercase();
        match self.claimed.get(&key) {
            Some(existing) if existing == original => Err(IdentifierError::Duplicate {
                kind: self.kind,
                name: original.to_string(),
            }),
            Some(existing) => Err(IdentifierError::Ambiguous {
                kind: self.kind,
                first: existing.clone(),
                second: original.to_string(),
                sanitized: safe.into_string(),
            }),
            None => {
                self.claimed.insert(key, original.to_string());
                Ok(safe)
            }
        }
    }

    /// Number of claimed names.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing has been claimed.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize("sales data").as_str(), "sales_data");
        assert_eq!(sanitize(":shared").as_str(), "shared");
        assert_eq!(sanitize("a--b//c").as_str(), "a_b_c");
        assert_eq!(sanitize("__x__").as_str(), "x");
        assert_eq!(sanitize("Revenue (EUR)").as_str(), "Revenue_EUR");
    }

    #[test]
    fn test_sanitize_placeholder_and_digits() {
        assert_eq!(sanitize("").as_str(), PLACEHOLDER);
        assert_eq!(sanitize("???").as_str(), PLACEHOLDER);
        assert_eq!(sanitize("2024 report").as_str(), "n2024_report");
        assert_eq!(sanitize("résumé").as_str(), "r_sum");
    }

    #[test]
    fn test_claim_duplicate_and_ambiguous() {
        let mut set = IdentifierSet::new("element");
        assert_eq!(set.claim("My Chart").unwrap().as_str(), "My_Chart");
        assert_eq!(
            set.claim("My Chart").unwrap_err(),
            IdentifierError::Duplicate {
                kind: "element",
                name: "My Chart".to_string()
            }
        );
        match set.claim("My-Chart").unwrap_err() {
            IdentifierError::Ambiguous {
                first,
                second,
                sanitized,
                ..
            } => {
                assert_eq!(first, "My Chart");
                assert_eq!(second, "My-Chart");
                assert_eq!(sanitized, "My_Chart");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_claim_rejects_case_only_difference() {
        let mut set = IdentifierSet::new("dataset");
        assert_eq!(set.claim("Sales").unwrap().as_str(), "Sales");
        match set.claim("sales").unwrap_err() {
            IdentifierError::Ambiguous { first, second, .. } => {
                assert_eq!(first, "Sales");
                assert_eq!(second, "sales");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(matches!(
            set.claim("SALES data").unwrap(),
            safe if safe.as_str() == "SALES_data"
        ));
        assert!(set.claim("sales-DATA").is_err());
    }
}
