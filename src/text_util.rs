/// Number of lines in a snippet when the query does not occur verbatim.
pub const DEFAULT_SNIPPET_LINES: usize = 3;

/// Maximum number of characters in a snippet before truncation.
pub const DEFAULT_SNIPPET_MAX_CHARS: usize = 200;

/// Lowercase `text` and collapse every whitespace run into one space.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Extract a short excerpt of `text` around the first case-insensitive
/// occurrence of `query`.
///
/// Falls back to the first few lines when the query does not occur
/// verbatim (fuzzy hits). Returns `None` for empty text.
pub fn extract_snippet(text: &str, query: &str) -> Option<String> {
    let lines: Vec<&str> =
        text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return None;
    }

    let query = normalize(query);
    let hit = (!query.is_empty())
        .then(|| lines.iter().position(|line| normalize(line).contains(&query)))
        .flatten();

    let (start, end) = match hit {
        Some(idx) => (idx.saturating_sub(1), (idx + 2).min(lines.len())),
        None => (0, DEFAULT_SNIPPET_LINES.min(lines.len())),
    };

    let snippet = lines[start..end].join("\n");
    Some(truncate_chars(&snippet, DEFAULT_SNIPPET_MAX_CHARS))
}

/// Cut `text` to at most `max_chars` characters, never inside a
/// multi-byte character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
