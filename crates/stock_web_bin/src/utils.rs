/// Prepares raw form input for use as a ticker symbol.
///
/// Symbols are opaque and case-sensitive, so nothing is rewritten beyond
/// trimming surrounding whitespace. Returns `None` when nothing usable
/// remains; the provider response decides whether a symbol actually exists.
pub fn clean_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
