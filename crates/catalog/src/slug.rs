/// Characters dropped from a slug outright.
const REMOVED: &[char] = &['*', '+', '~', '(', ')', '\'', '"', '!', ':', '@'];

/// URL-friendly form of a name: lowercase, whitespace runs joined with `_`.
///
/// `"Devworks Bootcamp"` becomes `"devworks_bootcamp"`.
pub fn slugify(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !REMOVED.contains(c))
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '_' | '.' | '$' | '&'))
        .flat_map(char::to_lowercase)
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lowercases_and_joins_words() {
        assert_eq!(slugify("Devworks Bootcamp"), "devworks_bootcamp");
        assert_eq!(slugify("  ModernTech   Bootcamp "), "moderntech_bootcamp");
    }

    #[test]
    fn strips_removed_characters() {
        assert_eq!(slugify("Codemasters (Online)!"), "codemasters_online");
        assert_eq!(slugify("A*B+C~D:E@F'G\"H"), "abcdefgh");
    }

    #[test]
    fn keeps_hyphens_and_dots() {
        assert_eq!(slugify("Dev-Works 2.0"), "dev-works_2.0");
    }

    proptest! {
        #[test]
        fn slugs_are_stable_and_url_safe(name in "[ -~]{0,40}") {
            let slug = slugify(&name);
            prop_assert!(!slug.chars().any(|c| c.is_whitespace() || REMOVED.contains(&c)));
            prop_assert!(!slug.chars().any(|c| c.is_ascii_uppercase()));
            prop_assert_eq!(slugify(&slug), slug);
        }
    }
}
