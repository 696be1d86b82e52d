//! URL-safe slugs derived from display names.

/// Derive a slug from a display name.
///
/// Lowercases the input, drops every character outside `[a-z0-9 -]`, turns
/// runs of spaces and hyphens into a single `-` and trims hyphens from both
/// ends. The result may be empty (e.g. for `"!!!"`); callers decide whether
/// that is acceptable.
pub fn create_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.to_lowercase().chars() {
        match c {
            'a'..='z' | '0'..='9' => {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c);
            }
            ' ' | '-' => pending_hyphen = true,
            _ => {}
        }
    }

    slug
}

/// True when `s` is non-empty and already in canonical slug form.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty() && create_slug(s) == s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_joins_words() {
        assert_eq!(create_slug("Spa & Pool Equipment!!"), "spa-pool-equipment");
    }

    #[test]
    fn collapses_and_trims_hyphens() {
        assert_eq!(create_slug("  --Heat   Pumps--  "), "heat-pumps");
        assert_eq!(create_slug("a - b"), "a-b");
    }

    #[test]
    fn drops_non_ascii_and_control_characters() {
        assert_eq!(create_slug("Café\tPompes"), "cafpompes");
        assert_eq!(create_slug("Über 2000"), "ber-2000");
    }

    #[test]
    fn punctuation_only_yields_empty_slug() {
        assert_eq!(create_slug("!!!"), "");
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn valid_slug_detection() {
        assert!(is_valid_slug("filters-and-valves"));
        assert!(!is_valid_slug("Filters"));
        assert!(!is_valid_slug("-filters"));
        assert!(!is_valid_slug("filters--valves"));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: derived slugs only contain lowercase alphanumerics and
            /// single inner hyphens.
            #[test]
            fn slug_is_url_safe(name in any::<String>()) {
                let slug = create_slug(&name);
                prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                prop_assert!(!slug.starts_with('-'));
                prop_assert!(!slug.ends_with('-'));
                prop_assert!(!slug.contains("--"));
            }

            /// Property: slugging a slug changes nothing.
            #[test]
            fn slug_is_idempotent(name in "[ A-Za-z0-9&!_-]{0,64}") {
                let once = create_slug(&name);
                prop_assert_eq!(create_slug(&once), once.clone());
            }
        }
    }
}
