/// Derive a URL-safe slug from a game title.
///
/// ASCII letters, digits and CJK unified ideographs are kept; every other run
/// of characters collapses into a single `-`. The result is lowercased with
/// no leading or trailing dashes, and falls back to `game` when nothing is left.
pub fn slugify(title: &str) -> String {
    let slug = title
        .split(|c: char| !is_slug_char(c))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();

    if slug.is_empty() {
        "game".to_string()
    } else {
        slug
    }
}

const fn is_slug_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '\u{4e00}'..='\u{9fff}')
}
