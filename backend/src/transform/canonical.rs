//! Identifier canonicalization.
//!
//! Raw cell values become URI path segments by *removing* unsafe characters,
//! never by percent-encoding them. Exotic input loses information; two raw
//! values that clean to the same string denote the same resource.

use once_cell::sync::Lazy;
use regex::Regex;

/// Everything except ASCII word characters, whitespace, `-`, `_` and `.`.
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s\-.]").expect("valid unsafe-char pattern"));
static WHITESPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static UNDERSCORE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").expect("valid underscore pattern"));
static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid hyphen pattern"));

/// Canonical, lowercase, URI-safe form of `raw`.
///
/// Returns an empty string when nothing usable remains; callers treat that
/// as "skip this value".
///
/// ```ignore
/// assert_eq!(canonicalize("Hello, World! 2024"), "hello-world-2024");
/// ```
pub fn canonicalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let stripped = UNSAFE_CHARS.replace_all(trimmed, "");
    let hyphenated = WHITESPACE_RUNS.replace_all(&stripped, "-");
    let underscores = UNDERSCORE_RUNS.replace_all(&hyphenated, "_");
    let hyphens = HYPHEN_RUNS.replace_all(&underscores, "-");

    hyphens.to_lowercase()
}
