use lazy_static::lazy_static;
use regex::Regex;

use crate::core::TalkId;

/// Base used when a title has no ASCII-representable characters.
pub const FALLBACK_SLUG: &str = "talk";

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new("[^a-z0-9]+").expect("valid slug pattern");
}

/// URL-safe, lowercase token derived from a talk title.
///
/// Diacritics are transliterated to ASCII and every run of other characters
/// becomes a single `-`.
pub fn slugify(title: &str) -> String {
    let ascii = deunicode::deunicode(title).to_lowercase();
    let slug = NON_ALNUM.replace_all(&ascii, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Second and last candidate, disambiguated by the talk's own id.
pub fn with_id_suffix(base: &str, talk_id: TalkId) -> String {
    format!("{}-{}", base, talk_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_title() {
        assert_eq!(slugify("Building Better APIs"), "building-better-apis");
    }

    #[test]
    fn test_diacritics_are_stripped() {
        assert_eq!(slugify("Café Société: Ünïcode"), "cafe-societe-unicode");
    }

    #[test]
    fn test_separators_collapse_and_trim() {
        assert_eq!(slugify("  --PHP 8.3 -- what's new?!  "), "php-8-3-what-s-new");
    }

    #[test]
    fn test_empty_title_falls_back() {
        assert_eq!(slugify("!!!"), FALLBACK_SLUG);
        assert_eq!(slugify(""), FALLBACK_SLUG);
    }

    #[test]
    fn test_suffix() {
        assert_eq!(with_id_suffix("intro-to-rust", 42), "intro-to-rust-42");
    }
}
