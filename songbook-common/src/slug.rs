//! Slug generation for song identifiers and filenames
//!
//! One rule set backs filename derivation on create, identifier lookups for
//! flags and reviewed toggles, and the ids written by the index builder.
//! The frontend derives ids with the same rule, so these must not diverge.

/// Filename stem used when a title slugifies to nothing
pub const UNTITLED_STEM: &str = "untitled";

/// Song file extension (including the dot)
pub const SONG_EXTENSION: &str = ".pro";

/// Convert a title into a slug.
///
/// Lowercases the input, replaces every run of characters outside
/// `[a-z0-9]` with a single hyphen and strips leading/trailing hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Derive the song filename for a title (`<slug>.pro`).
pub fn song_filename(title: &str) -> String {
    let stem = slugify(title);
    if stem.is_empty() {
        format!("{}{}", UNTITLED_STEM, SONG_EXTENSION)
    } else {
        format!("{}{}", stem, SONG_EXTENSION)
    }
}

/// Filename for the `n`th collision of `base` (`my-song.pro` → `my-song-1.pro`).
pub fn suffixed_filename(base: &str, n: usize) -> String {
    let stem = base.strip_suffix(SONG_EXTENSION).unwrap_or(base);
    format!("{}-{}{}", stem, n, SONG_EXTENSION)
}
