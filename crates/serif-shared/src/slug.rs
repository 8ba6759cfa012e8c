//! Slug derivation for post URLs.

/// Derive a URL-safe slug from a title.
///
/// Lowercases, drops everything outside ASCII word characters, whitespace
/// and hyphens, collapses whitespace runs and repeated hyphens into single
/// hyphens, and trims hyphens from both ends. May return an empty string
/// when the title has no usable characters.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
            last_was_hyphen = false;
        } else if (c.is_whitespace() || c == '-') && !last_was_hyphen && !slug.is_empty() {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn title_becomes_hyphenated_lowercase() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slugify("Rust 2024: What's New?"), "rust-2024-whats-new");
        assert_eq!(slugify("Rock & Roll"), "rock-roll");
    }

    #[test]
    fn whitespace_and_hyphen_runs_collapse() {
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("--Already--Slugged--"), "already-slugged");
    }

    #[test]
    fn unusable_titles_yield_empty_slugs() {
        assert_eq!(slugify("!!!"), "");
        assert_eq!(slugify(""), "");
    }
}
