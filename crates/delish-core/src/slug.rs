//! Slug derivation and collision handling.

/// Slug used when a name contains no usable characters.
pub const FALLBACK_SLUG: &str = "store";

/// Lower-case `name`, keep ASCII alphanumerics and collapse every other
/// run of characters into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// True when `candidate` is `base` or `base-<digits>`.
pub fn is_variant_of(base: &str, candidate: &str) -> bool {
    match candidate.strip_prefix(base) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix('-')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

/// Pick a slug for `base` that does not collide with `existing`.
///
/// With `n` existing variants of `base` the result is `base-{n+1}`.
pub fn disambiguate<'a>(base: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = existing
        .into_iter()
        .filter(|s| is_variant_of(base, s))
        .collect();

    if taken.is_empty() {
        return base.to_string();
    }

    let mut n = taken.len() + 1;
    // Gaps can leave `base-{n}` occupied, walk forward to the next free one.
    while taken.contains(&format!("{base}-{n}").as_str()) {
        n += 1;
    }
    format!("{base}-{n}")
}
