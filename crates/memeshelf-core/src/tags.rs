//! Tag text parsing and slug derivation

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::AppError;

pub const MAX_TAG_TEXT_LENGTH: usize = 200;
pub const MAX_TAG_NAME_LENGTH: usize = 50;
pub const MAX_SLUG_LENGTH: usize = 60;

static DELIMITERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,#;]").expect("static delimiter pattern"));
static SLUG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static slug pattern"));
static SLUG_DASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static slug pattern"));

/// Splits free text into distinct tag names, first-seen order and casing kept.
///
/// Blank input yields an empty list.
pub fn parse_tag_names(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    DELIMITERS
        .split(raw)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// [`parse_tag_names`] plus the length limits on the text and on each name.
pub fn parse_and_validate(raw: &str) -> Result<Vec<String>, AppError> {
    if raw.chars().count() > MAX_TAG_TEXT_LENGTH {
        return Err(AppError::InvalidInput(format!(
            "Tags must be at most {} characters",
            MAX_TAG_TEXT_LENGTH
        )));
    }
    let names = parse_tag_names(raw);
    if let Some(name) = names
        .iter()
        .find(|n| n.chars().count() > MAX_TAG_NAME_LENGTH)
    {
        return Err(AppError::InvalidInput(format!(
            "Tag '{}' is longer than {} characters",
            name, MAX_TAG_NAME_LENGTH
        )));
    }
    Ok(names)
}

/// ASCII slug of a tag name. Never empty.
pub fn slugify(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    let dashed = SLUG_DASHES.replace_all(stripped.trim(), "-");
    let mut slug: String = dashed
        .trim_matches(|c| c == '-' || c == '_')
        .chars()
        .take(MAX_SLUG_LENGTH)
        .collect();
    slug = slug.trim_end_matches(['-', '_']).to_string();
    if slug.is_empty() {
        "tag".to_string()
    } else {
        slug
    }
}

/// Slug for the `attempt`-th insert try: `cats`, `cats-2`, `cats-3`, ...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        return base.to_string();
    }
    let suffix = format!("-{}", attempt);
    let room = MAX_SLUG_LENGTH.saturating_sub(suffix.len());
    let head: String = base.chars().take(room).collect();
    format!("{}{}", head, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_all_delimiters() {
        assert_eq!(
            parse_tag_names("cats, dogs#birds;  fish "),
            vec!["cats", "dogs", "birds", "fish"]
        );
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(parse_tag_names("").is_empty());
        assert!(parse_tag_names("   ").is_empty());
        assert!(parse_tag_names(" ,;# ").is_empty());
    }

    #[test]
    fn dedupes_case_insensitively_keeping_first_casing() {
        assert_eq!(parse_tag_names("Cat, cat, CAT"), vec!["Cat"]);
        assert_eq!(parse_tag_names("#Dog #cat #dog"), vec!["Dog", "cat"]);
    }

    #[test]
    fn enforces_lengths() {
        assert!(parse_and_validate(&"a,".repeat(101)).is_err());
        assert!(parse_and_validate(&"x".repeat(51)).is_err());
        assert_eq!(parse_and_validate("ok").unwrap(), vec!["ok"]);
    }

    #[test]
    fn slugify_matches_expected_forms() {
        assert_eq!(slugify("Funny Cats"), "funny-cats");
        assert_eq!(slugify("  C++ & Rust!  "), "c-rust");
        assert_eq!(slugify("über cool"), "uber-cool");
        assert_eq!(slugify("Café"), "cafe");
        assert_eq!(slugify("ﬁle №5"), "file-no5");
        assert_eq!(slugify("_under_score_"), "under_score");
        assert_eq!(slugify("日本"), "tag");
        assert!(slugify(&"a".repeat(80)).len() <= MAX_SLUG_LENGTH);
    }

    #[test]
    fn slug_candidates_stay_within_limit() {
        assert_eq!(slug_candidate("cats", 1), "cats");
        assert_eq!(slug_candidate("cats", 3), "cats-3");
        let long = "a".repeat(MAX_SLUG_LENGTH);
        assert_eq!(slug_candidate(&long, 2).len(), MAX_SLUG_LENGTH);
    }
}
