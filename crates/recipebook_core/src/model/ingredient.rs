//! Ingredient canonicalization.
//!
//! # Invariants
//! - Canonical names are trimmed and lowercased.
//! - `normalize` is idempotent.
//! - `canonicalize_set` keeps first-seen order so numbered listings stay
//!   stable for the user.

use std::collections::HashSet;

/// Canonicalizes one raw ingredient string.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes, drops empty values and deduplicates ingredient tokens.
pub fn canonicalize_set<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut canonical = Vec::new();
    for token in tokens {
        let value = normalize(token.as_ref());
        if value.is_empty() {
            continue;
        }
        if seen.insert(value.clone()) {
            canonical.push(value);
        }
    }
    canonical
}

#[cfg(test)]
mod tests {
    use super::{canonicalize_set, normalize};

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["  Brown Sugar ", "SALT", "olive oil", "", "  "] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn canonicalize_collapses_case_and_whitespace_variants() {
        assert_eq!(canonicalize_set(&["Salt", "salt", " SALT "]), vec!["salt"]);
    }

    #[test]
    fn canonicalize_keeps_first_seen_order_and_drops_blanks() {
        let tokens = vec![
            "Milk".to_string(),
            "  ".to_string(),
            "Tea Leaves".to_string(),
            "milk".to_string(),
            "Sugar".to_string(),
        ];
        assert_eq!(
            canonicalize_set(&tokens),
            vec!["milk", "tea leaves", "sugar"]
        );
    }
}
