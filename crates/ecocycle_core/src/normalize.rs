use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

static NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Lowercase, strip diacritics and collapse anything that is not `a-z0-9`
/// into single spaces. Used to compare material and category names.
pub fn normalize_text(input: &str) -> String {
    let lower = input.trim().to_lowercase();

    let no_diacritics: String = lower.nfkd().filter(|c| !is_combining_mark(*c)).collect();

    NON_ALNUM
        .replace_all(&no_diacritics, " ")
        .trim()
        .to_string()
}
