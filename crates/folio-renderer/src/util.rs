//! Shared helpers for block rendering.

/// Anchor id for a block: its id without dashes.
pub(crate) fn anchor_id(block_id: &str) -> String {
    block_id.chars().filter(|c| *c != '-').collect()
}

/// URL schemes allowed in `href` and `src` attributes.
const SAFE_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// The trimmed URL if it is non-empty and either relative or uses a safe scheme.
///
/// Whitespace and control characters are ignored when reading the scheme, as
/// browsers do (`"java\tscript:"` is `javascript:`).
pub(crate) fn safe_url(url: &str) -> Option<&str> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let compact: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match compact.find([':', '/', '?', '#']) {
        Some(end) if compact[end..].starts_with(':') => {
            let scheme = compact[..end].to_ascii_lowercase();
            SAFE_SCHEMES.contains(&scheme.as_str()).then_some(url)
        }
        _ => Some(url),
    }
}

/// CSS class suffix for a code language (`"C++"` → `"c++"`, `"plain text"` → `None`).
pub(crate) fn language_class(language: Option<&str>) -> Option<String> {
    let language = language?.trim();
    if language.is_empty() || language.eq_ignore_ascii_case("plain text") {
        return None;
    }
    Some(language.to_lowercase().replace(' ', "-"))
}

/// Convert a `YouTube` watch/short/embed URL to its embed URL.
///
/// Returns `None` for anything that is not a `YouTube` video link.
pub(crate) fn youtube_embed_url(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let rest = rest
        .strip_prefix("www.")
        .or_else(|| rest.strip_prefix("m."))
        .unwrap_or(rest);

    let id = if let Some(path) = rest.strip_prefix("youtu.be/") {
        path.split(['?', '&', '#', '/']).next()
    } else if let Some(path) = rest.strip_prefix("youtube.com/") {
        if let Some(embed) = path.strip_prefix("embed/") {
            embed.split(['?', '&', '#', '/']).next()
        } else if let Some(query) = path.strip_prefix("watch?") {
            query
                .split(['&', '#'])
                .find_map(|param| param.strip_prefix("v="))
        } else {
            None
        }
    } else {
        None
    };

    let id = id.filter(|id| !id.is_empty())?;
    Some(format!("https://www.youtube.com/embed/{id}"))
}
