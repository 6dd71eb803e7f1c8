//! Slug normalization shared by user and report records.
//!
//! Normalization lowercases the input, collapses whitespace runs into a
//! single hyphen, and strips everything outside `[a-z0-9-]`. Uniqueness
//! probing (`base`, `base-1`, `base-2`, ...) lives in the repositories,
//! which own the existence queries.

/// Normalize free text into a slug base.
///
/// Returns an empty string when nothing survives normalization; callers
/// fall back to the record id in that case so every row still gets a
/// non-empty, unique slug.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            pending_hyphen = !slug.is_empty();
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '-' {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }

    slug
}

/// Candidate slug for the nth probe: the base itself for 0, `base-n` after.
#[must_use]
pub fn candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
