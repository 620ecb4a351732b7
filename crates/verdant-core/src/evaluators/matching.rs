//! Shared text matching helpers for evaluators.
//!
//! Ingredient keyword checks are case-insensitive substring matches.
//! Descriptors such as packaging and origin are matched on whole words so
//! that short terms like `can` or `US` do not fire inside longer words.

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

lazy_static! {
    /// Characters not allowed in a social media handle
    static ref HANDLE_STRIP: Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();

    /// Runs of whitespace, collapsed when normalizing tokens
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Whether `haystack` contains `needle`, ignoring case.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Whether `haystack` contains `needle` as a whole word or phrase,
/// optionally pluralized with a trailing `s`, ignoring case.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return false;
    }

    let pattern = format!(r"(?:^|\W){}s?(?:\W|$)", regex::escape(needle));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(haystack),
        Err(_) => false,
    }
}

/// First ingredient containing `needle`, ignoring case.
pub fn find_ingredient<'a>(ingredients: &'a [String], needle: &str) -> Option<&'a str> {
    ingredients
        .iter()
        .find(|ingredient| contains_ignore_case(ingredient, needle))
        .map(String::as_str)
}

/// Whether any ingredient contains any of the keywords.
pub fn any_ingredient_matches(ingredients: &[String], keywords: &[String]) -> Option<String> {
    keywords
        .iter()
        .find(|keyword| find_ingredient(ingredients, keyword).is_some())
        .cloned()
}

/// Turn a brand name into a handle (`Evil Corp` -> `EvilCorp`).
pub fn to_handle(brand: &str) -> String {
    HANDLE_STRIP.replace_all(brand, "").into_owned()
}

/// Trim a token and collapse inner whitespace.
pub fn normalize_token(token: &str) -> String {
    WHITESPACE.replace_all(token.trim(), " ").into_owned()
}

/// Title-case a single keyword (`paraben` -> `Paraben`).
pub fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
