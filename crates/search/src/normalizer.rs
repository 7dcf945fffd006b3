//! Keyword normalizer
//!
//! Maps raw keyword or query text to the canonical token used as a trie path:
//! - NFKC (compatibility composition)
//! - Lowercase (codepoint mapping, no locale)
//! - Keep only Unicode letters and the wildcard marker
//! - Keep a single `*` only when the text ends with one
//!
//! Normalization never fails. Text that normalizes to nothing yields an
//! empty token, which [`is_valid`] rejects.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Wildcard marker kept at the end of a token
pub const WILDCARD: char = '*';

static NON_TOKEN_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}*]").expect("static pattern compiles"));

/// Normalize raw text into a token
///
/// # Example
///
/// ```
/// use kbsearch_search::normalizer::normalize;
///
/// assert_eq!(normalize("Hello, World! 123"), "helloworld");
/// assert_eq!(normalize("a**b*"), "ab*");
/// assert_eq!(normalize("a*b"), "ab");
/// ```
pub fn normalize(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    // Lowercasing before the letter filter drops combining marks that some
    // case mappings emit, so a normalized token normalizes to itself.
    let lowered = raw.nfkc().collect::<String>().to_lowercase();
    let cleaned = NON_TOKEN_CHARS.replace_all(&lowered, "");

    let mut token: String = cleaned.chars().filter(|&c| c != WILDCARD).collect();
    if cleaned.ends_with(WILDCARD) {
        token.push(WILDCARD);
    }
    token
}

/// Normalize optional text; `None` yields an empty token
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize).unwrap_or_default()
}

/// Admission gate for trie operations
///
/// A token is valid iff it is not blank after trimming.
pub fn is_valid(token: &str) -> bool {
    !token.trim().is_empty()
}

/// Split a query on whitespace and normalize each term, dropping invalid ones
///
/// Duplicate terms are kept: each occurrence counts towards an entry's weight.
///
/// # Example
///
/// ```
/// use kbsearch_search::normalizer::tokenize_query;
///
/// assert_eq!(tokenize_query("  Reset PASSWORD !! "), vec!["reset", "password"]);
/// ```
pub fn tokenize_query(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(normalize)
        .filter(|t| is_valid(t))
        .collect()
}

/// Normalize an entry's keywords, dropping invalid ones
///
/// Whitespace inside a keyword is stripped, so a multi-word keyword becomes a
/// single token.
pub fn keyword_tokens<'a, I>(keywords: I) -> impl Iterator<Item = String> + 'a
where
    I: IntoIterator<Item = &'a String>,
    I::IntoIter: 'a,
{
    keywords
        .into_iter()
        .map(|k| normalize(k))
        .filter(|t| is_valid(t))
}
