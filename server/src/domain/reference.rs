//! Commit-message reference tags.
//!
//! A reference tag is the literal marker `#snag` immediately followed by one
//! or more decimal digits. The match is case-sensitive and needs no word
//! boundary beyond the digit run terminating it, so `fixes #snag7.` and
//! `ref#snag007` both reference issue 7.

use std::sync::LazyLock;

use regex::Regex;

/// Literal marker token that starts a reference tag.
pub const MARKER: &str = "#snag";

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#snag([0-9]+)").expect("reference pattern compiles"));

/// Render an identifier as its commit-message tag, e.g. `#snag42`.
#[must_use]
pub fn tag(identifier: i64) -> String {
    format!("{MARKER}{identifier}")
}

/// Extract every referenced identifier from a commit message, in order.
///
/// Digit runs parse as base-10; leading zeros are accepted and denote the
/// integer they spell. Runs too long to fit an `i64` are skipped.
#[must_use]
pub fn scan(message: &str) -> Vec<i64> {
    REFERENCE
        .captures_iter(message)
        .filter_map(|captures| captures.get(1))
        .filter_map(|digits| digits.as_str().parse::<i64>().ok())
        .collect()
}
