//! Slug derivation for category names.

use deunicode::deunicode;

/// Converts a name into a URL-safe slug.
///
/// Folds to ASCII, drops punctuation, lowercases, and joins words with single
/// hyphens: `"Men's Wear"` becomes `"mens-wear"`, `"Café Crème"` becomes
/// `"cafe-creme"`.
pub fn slugify(name: &str) -> String {
    let folded = deunicode(name).replace('_', "-").replace('@', "-at-");

    let mut slug = String::with_capacity(folded.len());
    let mut pending_hyphen = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
        // anything else is dropped without splitting the word
    }
    slug
}
