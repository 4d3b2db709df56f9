//! Matching a free-text game name against search result links.

/// Normalize a game name into the slug the site uses in review URLs.
///
/// Lower-cases, drops every character outside `[a-z0-9 ]` (non-ASCII letters
/// are dropped, not transliterated) and joins the remaining words with `-`.
pub fn slugify(name: &str) -> String {
    let kept: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Final path segment of a link: the text between its last two `/`.
///
/// Links that do not end with `/` have no such segment.
pub fn final_segment(href: &str) -> Option<&str> {
    let trimmed = href.strip_suffix('/')?;
    let (_, segment) = trimmed.rsplit_once('/')?;
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Whether a candidate link points at the review of `query`.
pub fn matches(query: &str, href: &str) -> bool {
    final_segment(href).is_some_and(|segment| segment == slugify(query))
}
