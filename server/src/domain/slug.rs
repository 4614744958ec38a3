//! Slug generation for URL path segments.
//!
//! Slugs are lowercase, ASCII-only, hyphen-separated tokens derived from a
//! display name exactly once, on first persist, and never recomputed.

use unicode_normalization::UnicodeNormalization;

/// Slugify a string, to make it URL friendly.
///
/// Accented forms collapse to their base characters via NFKD, remaining
/// non-ASCII characters are dropped, anything that is not alphanumeric,
/// whitespace, or a hyphen is removed, and separator runs collapse to a
/// single hyphen. Always produces a string; the result is empty when the
/// input has no retainable characters.
#[must_use]
pub fn slugify(value: &str) -> String {
    let folded: String = value
        .nfkd()
        .filter(char::is_ascii)
        .filter(|ch| ch.is_ascii_alphanumeric() || ch.is_whitespace() || *ch == '-')
        .collect();

    folded
        .trim()
        .to_ascii_lowercase()
        .split(|ch: char| ch.is_whitespace() || ch == '-')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Return `true` when `value` is a valid, already-derived slug.
#[must_use]
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}
