//! Case-insensitive substring matching used by store and catalog search.

/// Returns true if `needle` occurs in any of `haystacks`, ignoring case.
///
/// Only an empty needle matches everything. Whitespace is part of the query,
/// so `" reader"` does not match `"reader"`.
pub fn matches_any<'a>(needle: &str, haystacks: impl IntoIterator<Item = &'a str>) -> bool {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystacks
        .into_iter()
        .any(|h| h.to_lowercase().contains(&needle))
}
