//! Phone identity normalization
//!
//! Produces the canonical lookup key for a raw phone string. Deliberately
//! does not validate international format: over-rejecting would silently
//! lose recognition of a returning caller, which is worse than the
//! occasional duplicate record from an oddly formatted number.

/// Normalize a raw phone string into a canonical lookup key.
///
/// Strips whitespace, hyphens, parentheses and dots. Returns `None` when
/// nothing survives, which callers must treat as "cannot resolve identity"
/// and skip the memory lookup entirely.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let key: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')' | '.'))
        .collect();

    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}
