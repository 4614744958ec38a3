//! Rendering of free-text descriptions to display markup.
//!
//! The rendered form is stored denormalised next to the source text and
//! recomputed on every write; reads never render. Output is fully escaped,
//! with blank-line-separated paragraphs and explicit line breaks.

/// Escape a string for safe inclusion in an HTML document.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Render free text to display markup.
///
/// Blank lines split paragraphs; single newlines inside a paragraph become
/// `<br>` elements. Empty input renders to an empty string.
#[must_use]
pub fn render(source: &str) -> String {
    let normalised = source.replace("\r\n", "\n");
    normalised
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| {
            let body = paragraph
                .lines()
                .map(escape)
                .collect::<Vec<_>>()
                .join("<br>");
            format!("<p>{body}</p>")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
